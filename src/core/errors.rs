//! Errors raised while building sessions, parsing sources and loading config.
//!
//! Coverage data itself never produces errors: untracked paths and
//! out-of-range lines are skipped and logged by the store.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A source, tracefile or config file could not be read
    #[error("File system error: {message}")]
    FileSystem {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Source parsing errors reported by a parser collaborator
    #[error("Parse error in {file}:{line}: {message}")]
    Parse {
        file: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    /// Invalid include, exclude or synthetic-path glob
    #[error(transparent)]
    Pattern(#[from] glob::PatternError),

    /// Directory walk errors while scanning tracked files
    #[error(transparent)]
    Walk(#[from] ignore::Error),
}

impl Error {
    pub fn file_system(
        message: impl Into<String>,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::FileSystem {
            message: message.into(),
            path: Some(path.into()),
            source: Some(source),
        }
    }

    pub fn parse(file: impl Into<PathBuf>, line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            file: file.into(),
            line,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
