// lib.rs - 暴露本地配置存储给上层工具使用

pub mod core; // 日志等基础设施
pub mod data; // 配置存储
pub mod models;

pub use data::{ConfigStore, DataError, Document, StoreOptions, CONFIG_FILE_NAME, DIR_ERR};

pub use crate::core::{init_logger, update_log_level};
pub use models::config::{LogConfig, LogFormat, LogLevel, LogOutput};
