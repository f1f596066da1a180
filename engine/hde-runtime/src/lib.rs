//! Runtime plumbing shared by the hde services
//!
//! Logging setup, shutdown signal handling, the cancellable periodic
//! scheduler both poll loops run on, and the flags they have in common.

pub mod config;
pub mod logging;
pub mod scheduler;
pub mod signals;

pub use config::{load_dotenv, require_positive, LoggingArgs};
pub use logging::{initialize_logging_with_config, LogFormat};
pub use scheduler::{ErrorPolicy, PeriodicScheduler};
pub use signals::{setup_shutdown_token, wait_for_shutdown_signal};
pub use tokio_util::sync::CancellationToken;
