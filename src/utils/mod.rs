//! Small shared helpers: logging setup, best-effort error handling, locks

pub mod error;
pub mod lock;
pub mod logging;

pub use error::log_error;
pub use lock::{with_read_lock, with_write_lock};
pub use logging::{init_logging, init_logging_from_config};
#[cfg(feature = "json-logging")]
pub use logging::init_json_logging;
