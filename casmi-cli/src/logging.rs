//! 内部 tracing 初始化
//!
//! 诊断（`casmi-log`）是面向用户的输出；这里配置的是开发者用的
//! `tracing` 事件，默认只显示 warn 以上，写到 stderr。

use std::io;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// 过滤指令，语法同 `RUST_LOG`
pub const FILTER_ENV: &str = "CASMI_LOG";
/// `compact` | `pretty` | `json`
pub const FORMAT_ENV: &str = "CASMI_LOG_FORMAT";

const DEFAULT_FILTER: &str = "warn";

/// 日志输出格式
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    /// 彩色格式化（开发使用）
    Pretty,
    /// 紧凑格式
    Compact,
    /// JSON 格式（工具集成）
    Json,
}

impl LogFormat {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "pretty" => Some(Self::Pretty),
            "compact" => Some(Self::Compact),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// 从环境变量初始化；重复调用时保留已安装的 subscriber
pub fn init() {
    let filter =
        EnvFilter::try_from_env(FILTER_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let format = std::env::var(FORMAT_ENV)
        .ok()
        .and_then(|name| LogFormat::from_name(&name))
        .unwrap_or(LogFormat::Compact);
    init_with(filter, format);
}

pub fn init_with(filter: EnvFilter, format: LogFormat) {
    let layer = create_format_layer(format, io::stderr).with_filter(filter);
    let _ = tracing_subscriber::registry().with(layer).try_init();
}

/// Create formatter layer based on format
fn create_format_layer<W, F>(
    format: LogFormat,
    make_writer: F,
) -> Box<dyn Layer<tracing_subscriber::Registry> + Send + Sync>
where
    W: io::Write + Send + Sync + 'static,
    F: Fn() -> W + Send + Sync + 'static,
{
    match format {
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_target(true)
            .with_timer(fmt::time::time())
            .with_writer(make_writer)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_target(false)
            .without_time()
            .with_writer(make_writer)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_timer(fmt::time::time())
            .with_writer(make_writer)
            .boxed(),
    }
}
