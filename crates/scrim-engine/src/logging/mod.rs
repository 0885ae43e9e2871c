//! Logging utilities.
//!
//! Library code only talks to the `log` facade. Binaries (and the odd test
//! that wants output) call [`init_logging`] once to install `env_logger`.

mod init;

pub use init::{init_logging, LoggingConfig};
