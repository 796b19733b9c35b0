//! 日志配置
//!
//! 提供便捷的日志器初始化配置。

use crate::{Level, Logger};

/// 日志配置
///
/// # 示例
///
/// ```
/// use casmi_log::{LogConfig, Level};
///
/// let logger = LogConfig::new("casmi").with_level(Level::Debug).init();
/// assert_eq!(logger.source(), "casmi");
/// ```
#[derive(Clone, Debug)]
pub struct LogConfig {
    /// 应用名（来源栈底）
    pub app_name: String,
    /// 日志级别
    pub level: Level,
}

impl LogConfig {
    /// 创建默认配置（Info 级别）
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            level: Level::Info,
        }
    }

    /// 设置级别
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// 初始化日志器
    pub fn init(self) -> Logger {
        Logger::new(self.app_name).with_level(self.level)
    }
}
