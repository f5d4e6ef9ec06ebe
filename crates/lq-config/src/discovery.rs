//! Configuration file discovery.
//!
//! Finds `.lq.toml` files by walking up from a directory, then adds the global
//! `~/.lq.toml` unless a file on the way marked itself as the root.

use std::path::{Path, PathBuf};

use directories::BaseDirs;

use crate::parse::is_root_config;

/// The configuration filename.
pub const CONFIG_FILENAME: &str = ".lq.toml";

/// Discovers the configuration files that apply to `cwd`.
///
/// Paths are returned nearest first, so earlier files take precedence when
/// merged. Discovery stops at the first file with `root = true`; otherwise the
/// global file is appended last.
pub fn discover_config_files(cwd: &Path) -> Vec<PathBuf> {
    let mut configs = Vec::new();

    for dir in cwd.ancestors() {
        let candidate = dir.join(CONFIG_FILENAME);
        if !candidate.is_file() {
            continue;
        }
        let is_root = is_root_config(&candidate);
        configs.push(candidate);
        if is_root {
            return configs;
        }
    }

    if let Some(global) = global_config_path()
        && global.is_file()
        && !configs.contains(&global)
    {
        configs.push(global);
    }
    configs
}

/// Returns the path of the global configuration file, if a home directory exists.
pub fn global_config_path() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| dirs.home_dir().join(CONFIG_FILENAME))
}

/// Checks if a path is the global configuration file.
pub fn is_global_config(path: &Path) -> bool {
    global_config_path().is_some_and(|global| path == global)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    /// Temporary directory tree for discovery tests.
    struct TestDir {
        root: tempfile::TempDir,
    }

    impl TestDir {
        fn new() -> Self {
            Self {
                root: tempfile::tempdir().unwrap(),
            }
        }

        fn create_dir(&self, rel_path: &str) -> PathBuf {
            let path = self.root.path().join(rel_path);
            fs::create_dir_all(&path).unwrap();
            path
        }

        fn create_config(&self, rel_path: &str, content: &str) -> PathBuf {
            let dir = self.create_dir(rel_path);
            let config = dir.join(CONFIG_FILENAME);
            fs::write(&config, content).unwrap();
            config
        }
    }

    fn local(configs: &[PathBuf]) -> Vec<&PathBuf> {
        configs.iter().filter(|p| !is_global_config(p)).collect()
    }

    #[test]
    fn no_configs() {
        let dir = TestDir::new();
        let cwd = dir.create_dir("a/b");
        assert!(local(&discover_config_files(&cwd)).is_empty());
    }

    #[test]
    fn nearest_first() {
        let dir = TestDir::new();
        let outer = dir.create_config("", "# outer\n");
        let inner = dir.create_config("a/b", "# inner\n");
        let cwd = dir.create_dir("a/b/c");

        let configs = discover_config_files(&cwd);
        assert_eq!(local(&configs), vec![&inner, &outer]);
    }

    #[test]
    fn root_config_stops_discovery() {
        let dir = TestDir::new();
        let _outer = dir.create_config("", "# outer\n");
        let root = dir.create_config("project", "root = true\n");
        let cwd = dir.create_dir("project/src");

        assert_eq!(discover_config_files(&cwd), vec![root]);
    }

    #[test]
    fn root_false_keeps_walking() {
        let dir = TestDir::new();
        let outer = dir.create_config("", "# outer\n");
        let mid = dir.create_config("project", "root = false\n");
        let cwd = dir.create_dir("project/src");

        let configs = discover_config_files(&cwd);
        assert_eq!(local(&configs), vec![&mid, &outer]);
    }

    #[test]
    fn directories_named_like_config_are_skipped() {
        let dir = TestDir::new();
        dir.create_dir(CONFIG_FILENAME);
        let cwd = dir.create_dir("sub");
        assert!(local(&discover_config_files(&cwd)).is_empty());
    }

    #[test]
    fn global_path_uses_config_filename() {
        let path = global_config_path().unwrap();
        assert!(path.ends_with(CONFIG_FILENAME));
        assert!(is_global_config(&path));
        assert!(!is_global_config(Path::new("/elsewhere/.lq.toml")));
    }
}
