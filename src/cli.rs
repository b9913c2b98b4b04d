use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "covstack")]
#[command(about = "Line coverage reconciled against source structure", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export coverable lines with their hit counts as JSON
    Export {
        #[command(flatten)]
        input: InputArgs,

        /// Export a single file instead of every tracked file
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Compute per-function, class and namespace metrics as JSON
    Metrics {
        #[command(flatten)]
        input: InputArgs,

        /// Only print the subtree under this qualified name (e.g. `app\Lexer`)
        #[arg(long)]
        qualified: Option<String>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Files or directories to track (defaults to `scan.paths` from config)
    pub paths: Vec<PathBuf>,

    /// LCOV tracefile or directory of tracefiles; may be repeated
    #[arg(long = "lcov", required = true)]
    pub lcov: Vec<PathBuf>,

    /// Configuration file (defaults to the nearest .covstack.toml)
    #[arg(short, long, env = "COVSTACK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory that exported paths are made relative to
    #[arg(long)]
    pub base: Option<PathBuf>,

    /// Instrumentation-cache root to strip from reported paths
    #[arg(long)]
    pub prefix: Option<PathBuf>,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
