mod app_dirs;
mod state_store;

pub use app_dirs::DirsAppDirsAdapter;
pub use state_store::{FileAppStateStore, DEFAULT_STATE_FILE};
