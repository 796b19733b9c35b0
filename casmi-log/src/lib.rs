//! casmi-log - 诊断日志
//!
//! 驱动程序的诊断缓冲区，特点：
//! - **显式传递**：无全局 logger，每次调用构造一个 `Logger`
//! - **先缓冲后刷新**：记录只追加，由调用方在退出点一次性 `flush` 到 sink
//! - **来源栈**：每条记录带有来源名（应用名或当前 pass 名）
//!
//! # 快速开始
//!
//! ```
//! use casmi_log::{ApplicationFormatter, LogConfig, MemorySink, error};
//!
//! let logger = LogConfig::new("casmi").init();
//! error!(logger, "no input file provided");
//!
//! let mut sink = MemorySink::new(ApplicationFormatter::new("casmi"));
//! logger.flush(&mut sink).unwrap();
//! assert_eq!(sink.contents(), "casmi: error: no input file provided\n");
//! ```

mod config;
mod logger;
mod macros;
mod record;
mod sink;

pub use config::LogConfig;
pub use logger::{Logger, SourceGuard};
pub use record::{Level, Record};
pub use sink::{ApplicationFormatter, ConsoleSink, Formatter, LogSink, MemorySink, StreamSink};

/// 日志结果类型
pub type Result<T> = std::result::Result<T, Error>;

/// 日志系统错误类型
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// 写入 sink 失败
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("IO error"));
        assert!(err.to_string().contains("pipe closed"));
    }
}
