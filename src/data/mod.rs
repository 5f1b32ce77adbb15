//! 本地配置数据层
//!
//! 提供按目录存放的 JSON 配置文件读写，带进程内缓存。
//!
//! # 模块组织
//!
//! - `error`: 统一错误类型定义
//! - `document`: 配置文档值模型（JSON + 二进制）
//! - `store`: 配置存储 `ConfigStore`（读取 / 写入 / 清除）
//!
//! # 使用示例
//!
//! ```rust
//! use local_config::data::ConfigStore;
//!
//! let mut store = ConfigStore::from_dir("/home/user/.ops")?;
//!
//! // 读取配置（失败时返回 {}）
//! let config = store.read().await;
//!
//! // 整体写入
//! store.write(config).await?;
//! ```

pub mod document;
pub mod error;
pub mod store;

pub use document::Document;
pub use error::{DataError, Result, DIR_ERR};
pub use store::{ConfigStore, StoreOptions, CONFIG_FILE_NAME};
