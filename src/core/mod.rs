pub mod config;
pub mod error;
pub mod scheduler;
pub mod types;

pub use config::ForgeConfig;
pub use error::{ForgeError, Result};
pub use scheduler::Scheduler;
