//! 按目录存放的 JSON 配置存储
//!
//! 每个 `ConfigStore` 绑定一个绝对路径目录，读写其中固定的 `config.json`：
//! - `read`：优先返回进程内缓存；缓存为空时读取文件，任何失败都返回 `{}`
//! - `write`：整体覆盖写入，成功后更新缓存
//! - `clear`：删除文件（文件不存在不视为错误），并清空缓存
//!
//! 缓存只属于单个实例，多个实例绑定同一目录时互不共享。
//!
//! # 使用示例
//!
//! ```rust
//! use local_config::{ConfigStore, Document};
//!
//! let mut store = ConfigStore::from_dir("/home/user/.ops")?;
//! let config = store.read().await;
//! store.write(Document::from_json(serde_json::json!({"user": {"id": "123"}}))).await?;
//! store.clear().await?;
//! ```

use crate::data::document::Document;
use crate::data::{DataError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

/// 配置文件名
pub const CONFIG_FILE_NAME: &str = "config.json";

/// 构造选项
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreOptions {
    /// 配置目录，必须为绝对路径
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

/// 本地配置存储
#[derive(Debug)]
pub struct ConfigStore {
    dir: PathBuf,
    /// `dir/config.json`，构造时确定
    path: PathBuf,
    cache: Option<Document>,
}

impl ConfigStore {
    /// 根据选项创建存储
    ///
    /// `dir` 缺失或不是绝对路径时返回 `DataError::InvalidDir`。
    /// 构造过程不访问文件系统。
    pub fn new(options: StoreOptions) -> Result<Self> {
        let dir = options
            .dir
            .filter(|dir| dir.is_absolute())
            .ok_or(DataError::InvalidDir)?;
        let path = dir.join(CONFIG_FILE_NAME);

        Ok(Self {
            dir,
            path,
            cache: None,
        })
    }

    /// 直接以目录创建存储
    pub fn from_dir(dir: impl Into<PathBuf>) -> Result<Self> {
        Self::new(StoreOptions {
            dir: Some(dir.into()),
        })
    }

    /// 从任意 JSON 选项值创建存储
    ///
    /// 选项不是对象、`dir` 为 `null`/`false`/数字等任何解析失败，
    /// 都统一归为 `DataError::InvalidDir`。
    ///
    /// # 示例
    ///
    /// ```rust
    /// let store = ConfigStore::from_value(&serde_json::json!({"dir": "/foo/bar"}))?;
    /// ```
    pub fn from_value(options: &Value) -> Result<Self> {
        // 数组也能被派生的 Deserialize 按字段顺序接受，这里只认对象
        if !options.is_object() {
            return Err(DataError::InvalidDir);
        }

        let options = StoreOptions::deserialize(options).map_err(|_| DataError::InvalidDir)?;
        Self::new(options)
    }

    /// 绑定的配置目录
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 配置文件路径
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 当前是否持有缓存
    pub fn is_cached(&self) -> bool {
        self.cache.is_some()
    }

    /// 读取配置
    ///
    /// 缓存命中时不访问文件系统。加载失败（文件不存在、无权限、JSON 损坏等）
    /// 时返回 `{}`，失败结果不缓存，下次读取会重新尝试。
    pub async fn read(&mut self) -> Document {
        tracing::debug!(path = %self.path.display(), "读取配置");

        if let Some(cached) = &self.cache {
            return cached.clone();
        }

        match self.load().await {
            Ok(document) => {
                self.cache = Some(document.clone());
                document
            }
            Err(e) if e.is_not_found() => {
                tracing::debug!(path = %self.path.display(), "未找到配置文件");
                Document::empty()
            }
            Err(e) => {
                tracing::debug!(error = ?e, "读取配置失败，使用空配置");
                Document::empty()
            }
        }
    }

    /// 写入配置
    ///
    /// 整体覆盖 `config.json`，成功后缓存传入的文档并返回其引用。
    /// 失败时缓存保持不变。
    pub async fn write(&mut self, document: Document) -> Result<&Document> {
        tracing::debug!(path = %self.path.display(), "写入配置");

        let content = serde_json::to_vec(&document)?;
        fs::write(&self.path, content)
            .await
            .map_err(|e| DataError::io(&self.path, e))?;

        Ok(self.cache.insert(document))
    }

    /// 将任意可序列化的值写入配置
    ///
    /// 先转换为 `Document`（其中的 Buffer 形状对象会被还原为二进制），
    /// 转换失败返回 `DataError::Serialization`，不会触及文件和缓存。
    pub async fn write_as<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<&Document> {
        let document = Document::from_json(serde_json::to_value(value)?);
        self.write(document).await
    }

    /// 删除配置文件并清空缓存
    ///
    /// 文件不存在不视为错误；目标为目录时递归删除。
    pub async fn clear(&mut self) -> Result<()> {
        tracing::debug!(path = %self.path.display(), "清除配置");

        remove_path(&self.path).await?;
        self.cache = None;
        Ok(())
    }

    async fn load(&self) -> Result<Document> {
        let content = fs::read(&self.path)
            .await
            .map_err(|e| DataError::io(&self.path, e))?;
        let value: Value = serde_json::from_slice(&content)?;
        Ok(Document::from_json(value))
    }
}

/// 删除文件或目录，目标不存在时视为成功
async fn remove_path(path: &Path) -> Result<()> {
    let metadata = match fs::symlink_metadata(path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(DataError::io(path, e)),
    };

    let removed = if metadata.is_dir() {
        fs::remove_dir_all(path).await
    } else {
        fs::remove_file(path).await
    };

    match removed {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(DataError::io(path, e)),
    }
}
