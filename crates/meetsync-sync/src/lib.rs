pub mod error;
pub mod formats;
pub mod payload;
pub mod runner;
pub mod state;
pub mod transforms;

pub use error::SyncError;
pub use runner::{run_sync, run_sync_with_clients, RunReport, SyncOptions, USER_AGENT};
pub use state::RunState;
