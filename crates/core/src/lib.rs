pub mod config;
pub mod driver;
pub mod estimator;
pub mod options;
pub mod session;

pub use config::{
    load_config, load_config_from_str, load_config_or_default, validate_config, Config,
    ConfigError, LoggingConfig, ProgressConfig,
};
pub use driver::{CancelHandle, DriverConfig, DriverError, ProcessDriver, RunSummary};
pub use estimator::{
    FfmpegOutputClassifier, LineKind, OutputClassifier, ProgressEstimator, ProgressSnapshot,
};
pub use options::{check_reserved, MainOption, OptionError, OutputTarget};
pub use session::{CommandAssembler, LogEntry, ProgressCallback, Session, TimestampLog};
