use std::path::PathBuf;

use oh_core::app_dirs::AppDirs;
use oh_core::ports::{errors::AppDirsError, AppDirsPort};

const APP_DIR_NAME: &str = "onehealth";

/// `ONEHEALTH_PROFILE` keeps parallel installs (staging, a second test
/// account) in separate data directories.
fn resolved_app_dir_name() -> String {
    match std::env::var("ONEHEALTH_PROFILE") {
        Ok(profile) if !profile.is_empty() => format!("{APP_DIR_NAME}-{profile}"),
        _ => APP_DIR_NAME.to_string(),
    }
}

#[derive(Default)]
pub struct DirsAppDirsAdapter {
    base_data_local_dir_override: Option<PathBuf>,
}

impl DirsAppDirsAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `base` instead of the platform data directory.
    pub fn with_base_data_local_dir(base: PathBuf) -> Self {
        Self {
            base_data_local_dir_override: Some(base),
        }
    }

    fn base_data_local_dir(&self) -> Option<PathBuf> {
        if let Some(base) = &self.base_data_local_dir_override {
            return Some(base.clone());
        }
        dirs::data_local_dir()
    }
}

impl AppDirsPort for DirsAppDirsAdapter {
    fn get_app_dirs(&self) -> Result<AppDirs, AppDirsError> {
        let base = self
            .base_data_local_dir()
            .ok_or(AppDirsError::DataLocalDirUnavailable)?;

        Ok(AppDirs {
            app_data_root: base.join(resolved_app_dir_name()),
        })
    }
}
