//! 统一错误类型定义
//!
//! 使用 `thiserror` 定义本地配置存储的所有错误类型，并提供与 `anyhow` 的兼容层。

use std::path::PathBuf;
use thiserror::Error;

/// `dir` 选项校验失败时的固定错误信息
pub const DIR_ERR: &str = "local-config: `dir` 选项必须是绝对路径字符串";

/// 本地配置存储的统一错误类型
#[derive(Error, Debug)]
pub enum DataError {
    /// 构造参数无效（`dir` 缺失、为 null、非字符串或非绝对路径）
    #[error("{}", DIR_ERR)]
    InvalidDir,

    /// 文件 I/O 错误
    #[error("文件 I/O 错误: {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON 序列化错误
    #[error("JSON 序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// 便于与现有代码集成的类型别名
pub type Result<T> = std::result::Result<T, DataError>;

impl DataError {
    /// 从 `std::io::Error` 和路径创建 I/O 错误
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// 是否为"文件不存在"类错误
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_dir_display() {
        assert_eq!(DataError::InvalidDir.to_string(), DIR_ERR);
    }

    #[test]
    fn test_io_error_construction() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = DataError::io("/path/to/config.json", io_err);
        assert!(err.to_string().contains("/path/to/config.json"));
        assert!(err.is_not_found());
    }

    #[test]
    fn test_permission_error_is_not_not_found() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = DataError::io("/path/to/config.json", io_err);
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{invalid json").unwrap_err();
        let err: DataError = json_err.into();
        assert!(matches!(err, DataError::Serialization(_)));
    }

    #[test]
    fn test_anyhow_conversion() {
        // DataError 实现了 std::error::Error，可自动转换为 anyhow::Error
        let anyhow_err: anyhow::Error = DataError::InvalidDir.into();
        assert!(anyhow_err.to_string().contains("`dir`"));
    }
}
