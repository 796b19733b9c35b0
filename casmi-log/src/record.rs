//! 诊断记录定义

use std::fmt;

/// 记录级别
///
/// `Debug` 到 `Error` 是严重程度；`Output` 是原样输出通道（帮助、版本信息、
/// 程序打印），不参与级别过滤。
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Level {
    /// 调试信息
    Debug = 0,
    /// 一般信息
    Info = 1,
    /// 警告
    Warning = 2,
    /// 错误
    Error = 3,
    /// 原样输出
    Output = 4,
}

impl Level {
    /// 将级别转换为字符串
    pub const fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warning => "warning",
            Level::Error => "error",
            Level::Output => "output",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 单条诊断记录
///
/// 不含时间戳：同一输入的两次运行产生完全相同的记录序列。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    /// 级别
    pub level: Level,
    /// 来源名（应用名或 pass 名）
    pub source: String,
    /// 消息
    pub message: String,
}

impl Record {
    /// 创建新记录
    pub fn new(level: Level, source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            source: source.into(),
            message: message.into(),
        }
    }

    /// 是否为原样输出
    pub fn is_output(&self) -> bool {
        self.level == Level::Output
    }
}
