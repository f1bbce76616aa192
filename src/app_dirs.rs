use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    pub fn db_path() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            let state_dir = PathBuf::from(home)
                .join(".local")
                .join("state")
                .join("growlog");
            Some(state_dir.join("progress.db"))
        } else {
            ProjectDirs::from("", "", "growlog")
                .map(|proj_dirs| proj_dirs.data_local_dir().join("progress.db"))
        }
    }

    pub fn config_path() -> PathBuf {
        ProjectDirs::from("", "", "growlog")
            .map(|pd| pd.config_dir().join("config.json"))
            .unwrap_or_else(|| PathBuf::from("growlog_config.json"))
    }
}
