use std::path::{Path, PathBuf, MAIN_SEPARATOR_STR};

/// Maps driver-reported paths back onto tracked source paths.
///
/// Instrumentation layers often execute a mirrored copy of the sources from a
/// cache directory (`<prefix>/home/me/project/src/lib.rs`). When a prefix is
/// configured, it is removed component-wise and the remainder is re-anchored
/// at the filesystem root. Paths that do not sit under the prefix pass
/// through untouched and only resolve if they are tracked as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathResolver {
    prefix: Option<PathBuf>,
}

impl PathResolver {
    pub fn new(prefix: Option<PathBuf>) -> Self {
        Self {
            prefix: prefix.filter(|p| !p.as_os_str().is_empty()),
        }
    }

    pub fn prefix(&self) -> Option<&Path> {
        self.prefix.as_deref()
    }

    pub fn resolve(&self, reported: &Path) -> PathBuf {
        let Some(prefix) = &self.prefix else {
            return reported.to_path_buf();
        };

        match reported.strip_prefix(prefix) {
            Ok(rest) => {
                let mut resolved = PathBuf::from(MAIN_SEPARATOR_STR);
                resolved.push(rest);
                resolved
            }
            Err(_) => reported.to_path_buf(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_without_prefix_is_identity() {
        let resolver = PathResolver::new(None);
        assert_eq!(
            resolver.resolve(Path::new("/src/lib.rs")),
            PathBuf::from("/src/lib.rs")
        );
    }

    #[test]
    fn test_strips_cache_prefix() {
        let resolver = PathResolver::new(Some(PathBuf::from("/tmp/cache")));
        assert_eq!(
            resolver.resolve(Path::new("/tmp/cache/home/me/src/lib.rs")),
            PathBuf::from("/home/me/src/lib.rs")
        );
    }

    #[test]
    fn test_partial_component_is_not_a_prefix() {
        let resolver = PathResolver::new(Some(PathBuf::from("/tmp/cache")));
        assert_eq!(
            resolver.resolve(Path::new("/tmp/cache2/home/me/src/lib.rs")),
            PathBuf::from("/tmp/cache2/home/me/src/lib.rs")
        );
    }

    #[test]
    fn test_empty_prefix_is_ignored() {
        let resolver = PathResolver::new(Some(PathBuf::new()));
        assert!(resolver.prefix().is_none());
    }
}
