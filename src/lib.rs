pub mod commands;
pub mod config;
pub mod manager;
pub mod package;
pub mod runtime;
pub mod storage;

/// Test utilities for cross-platform path handling.
#[cfg(test)]
pub mod test_utils {
    use std::path::PathBuf;

    /// Returns a test home directory path based on the platform.
    /// - Unix: `/home/user`
    /// - Windows: `C:\Users\user`
    pub fn test_home() -> PathBuf {
        #[cfg(not(windows))]
        {
            PathBuf::from("/home/user")
        }
        #[cfg(windows)]
        {
            PathBuf::from(r"C:\Users\user")
        }
    }

    /// Returns a test project root based on the platform.
    /// - Unix: `/home/user/project`
    /// - Windows: `C:\Users\user\project`
    pub fn test_project() -> PathBuf {
        test_home().join("project")
    }
}
