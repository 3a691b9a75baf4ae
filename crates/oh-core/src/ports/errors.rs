#[derive(Debug, thiserror::Error)]
pub enum AppDirsError {
    #[error("platform data directory is unavailable")]
    DataLocalDirUnavailable,
}
