use crate::models::config::{LogConfig, LogFormat, LogLevel, LogOutput};
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    reload::{self, Handle},
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

/// 全局日志级别 reload handle
static LOG_LEVEL_HANDLE: OnceLock<Handle<EnvFilter, Registry>> = OnceLock::new();

/// 日志文件名前缀
const LOG_FILE_PREFIX: &str = "local-config";

/// 初始化日志系统
///
/// 支持基于配置的日志输出，包括：
/// - 日志级别（trace/debug/info/warn/error）
/// - 输出格式（JSON/纯文本）
/// - 输出目标（控制台/文件/both）
/// - 文件路径（用于文件输出）
///
/// 配置存储本身只通过 `tracing` 发出事件，嵌入方可以选择调用本函数，
/// 也可以安装自己的 subscriber。
///
/// # 热重载支持
/// 日志级别可以通过 `update_log_level` 函数动态调整，无需重启应用。
///
/// # 示例
/// ```
/// use local_config::{init_logger, LogConfig};
///
/// init_logger(&LogConfig::default()).expect("初始化日志系统失败");
/// ```
pub fn init_logger(config: &LogConfig) -> anyhow::Result<()> {
    if LOG_LEVEL_HANDLE.get().is_some() {
        anyhow::bail!("日志系统已初始化，不能重复初始化");
    }

    let filter = create_env_filter(&config.level);
    let (filter_layer, reload_handle) = reload::Layer::new(filter);

    let console_layer = match config.output {
        LogOutput::Console | LogOutput::Both => Some(create_console_layer(config.format)),
        LogOutput::File => None,
    };
    let file_layer = match config.output {
        LogOutput::File | LogOutput::Both => Some(create_file_layer(
            config.format,
            config.file_path.as_deref(),
        )?),
        LogOutput::Console => None,
    };

    Registry::default()
        .with(filter_layer)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("安装全局日志订阅器失败: {}", e))?;

    // 订阅器安装成功后才记录 handle，失败的初始化可以重试
    if LOG_LEVEL_HANDLE.set(reload_handle).is_err() {
        anyhow::bail!("日志系统已初始化，不能重复初始化");
    }

    tracing::info!(
        level = config.level.as_str(),
        format = ?config.format,
        output = ?config.output,
        file_path = ?config.file_path,
        "日志系统初始化完成"
    );

    Ok(())
}

/// 创建环境过滤器
fn create_env_filter(level: &LogLevel) -> EnvFilter {
    // 优先从环境变量读取，格式：RUST_LOG=debug 或 RUST_LOG=local_config=trace
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(level)))
}

fn default_directive(level: &LogLevel) -> String {
    format!("local_config={},tokio=warn", level.as_str())
}

/// 创建控制台输出层
fn create_console_layer<S>(format: LogFormat) -> Box<dyn Layer<S> + Send + Sync + 'static>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    match format {
        LogFormat::Text => fmt::layer()
            .with_writer(std::io::stdout)
            .with_target(cfg!(debug_assertions))
            .with_thread_ids(false)
            .with_ansi(true)
            .with_span_events(if cfg!(debug_assertions) {
                FmtSpan::CLOSE
            } else {
                FmtSpan::NONE
            })
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(std::io::stdout)
            .with_target(cfg!(debug_assertions))
            .with_thread_ids(false)
            .boxed(),
    }
}

/// 创建文件输出层（按天滚动）
fn create_file_layer<S>(
    format: LogFormat,
    file_path: Option<&str>,
) -> anyhow::Result<Box<dyn Layer<S> + Send + Sync + 'static>>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    let log_dir = get_log_dir(file_path)?;
    let file_appender = rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = non_blocking(file_appender);

    // guard 需存活到进程结束，否则缓冲日志会丢失
    Box::leak(Box::new(guard));

    let layer = match format {
        LogFormat::Text => fmt::layer()
            .with_writer(non_blocking)
            .with_target(cfg!(debug_assertions))
            .with_thread_ids(false)
            .with_ansi(false)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(non_blocking)
            .with_target(true)
            .with_thread_ids(true)
            .with_ansi(false)
            .boxed(),
    };
    Ok(layer)
}

/// 获取日志目录（不存在则创建）
fn get_log_dir(file_path: Option<&str>) -> anyhow::Result<PathBuf> {
    let dir = match file_path {
        Some(path) => PathBuf::from(path),
        None => dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("无法获取用户主目录"))?
            .join(".local-config")
            .join("logs"),
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// 动态更新日志级别（热重载）
///
/// 仅限调整日志级别，格式和输出目标的变更仍需要重启应用。
pub fn update_log_level(new_level: LogLevel) -> anyhow::Result<()> {
    let handle = LOG_LEVEL_HANDLE
        .get()
        .ok_or_else(|| anyhow::anyhow!("日志系统未初始化"))?;

    handle
        .reload(create_env_filter(&new_level))
        .map_err(|e| anyhow::anyhow!("重载日志级别失败: {}", e))?;

    tracing::info!(new_level = new_level.as_str(), "日志级别已动态更新");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_directive_scopes_crate() {
        assert_eq!(
            default_directive(&LogLevel::Debug),
            "local_config=debug,tokio=warn"
        );
    }

    #[test]
    fn test_get_log_dir_creates_custom_dir() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("logs").join("nested");

        let dir = get_log_dir(target.to_str()).unwrap();
        assert_eq!(dir, target);
        assert!(target.is_dir());
    }

    #[test]
    fn test_update_level_before_init_fails() {
        // 单元测试二进制中从不初始化全局日志
        let err = update_log_level(LogLevel::Trace).unwrap_err();
        assert!(err.to_string().contains("未初始化"));
    }
}
