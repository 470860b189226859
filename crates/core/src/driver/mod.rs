//! Process driver: runs a session's command and feeds its output back.
//!
//! # Example
//!
//! ```ignore
//! use ffconvert_core::{CancelHandle, DriverConfig, ProcessDriver, Session};
//!
//! let driver = ProcessDriver::new(DriverConfig::default().with_timeout(600));
//! let cancel = CancelHandle::new();
//!
//! let summary = driver.run_with_cancel(&mut session, &cancel).await?;
//! println!("{} records in {} ms", summary.lines, summary.elapsed_ms);
//! ```

mod cancel;
mod config;
mod error;
mod process;
mod types;

pub use cancel::CancelHandle;
pub use config::DriverConfig;
pub use error::DriverError;
pub use process::ProcessDriver;
pub use types::RunSummary;
