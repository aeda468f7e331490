use std::path::{Path, PathBuf};

/// Default data directory (relative to current working directory)
pub const DEFAULT_DATA_DIR: &str = "./data";

/// Subdirectory paths relative to the data directory
pub const PORTFOLIO_DIR: &str = "portfolio";
pub const EXPORTS_DIR: &str = "exports";
pub const LOGS_DIR: &str = "logs";

/// Helper struct to manage data paths
#[derive(Clone, Debug)]
pub struct DataPaths {
    root: PathBuf,
}

impl DataPaths {
    /// Create a new DataPaths instance with the given root directory
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Get the root data directory
    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    /// Get the portfolio directory (current holdings file)
    pub fn portfolio(&self) -> PathBuf {
        self.root.join(PORTFOLIO_DIR)
    }

    /// Get the exports directory (CSV output)
    pub fn exports(&self) -> PathBuf {
        self.root.join(EXPORTS_DIR)
    }

    /// Get the logs directory
    pub fn logs(&self) -> PathBuf {
        self.root.join(LOGS_DIR)
    }

    /// Path of the current portfolio file
    pub fn portfolio_file(&self) -> PathBuf {
        self.portfolio().join("current.json")
    }

    /// Ensure all directories exist
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.root)?;
        std::fs::create_dir_all(self.portfolio())?;
        std::fs::create_dir_all(self.exports())?;
        std::fs::create_dir_all(self.logs())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_layout() {
        let paths = DataPaths::new("/tmp/stockbot-test");
        assert_eq!(paths.portfolio(), PathBuf::from("/tmp/stockbot-test/portfolio"));
        assert_eq!(paths.exports(), PathBuf::from("/tmp/stockbot-test/exports"));
        assert!(paths.portfolio_file().ends_with("portfolio/current.json"));
    }
}
