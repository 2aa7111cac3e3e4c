use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// Record files live under $HOME/.local/state/plink/results when HOME is
    /// set, otherwise under the platform's local data directory.
    pub fn results_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            let state_dir = PathBuf::from(home)
                .join(".local")
                .join("state")
                .join("plink");
            Some(state_dir.join("results"))
        } else {
            ProjectDirs::from("", "", "plink")
                .map(|proj_dirs| proj_dirs.data_local_dir().join("results"))
        }
    }

    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "plink").map(|proj_dirs| proj_dirs.config_dir().join("config.json"))
    }
}
