//! 日志器实现

use crate::record::{Level, Record};
use crate::sink::LogSink;
use std::cell::{Cell, RefCell};

/// 诊断日志器
///
/// 单线程使用：记录追加到内部缓冲区，直到 `flush` 把它们排空写入 sink。
/// 来源名维护为一个栈，栈底是应用名，pass 运行期间压入 pass 名。
#[derive(Debug)]
pub struct Logger {
    /// 当前日志级别
    level: Cell<Level>,
    /// 待刷新的记录
    records: RefCell<Vec<Record>>,
    /// 来源栈
    sources: RefCell<Vec<String>>,
}

impl Logger {
    /// 创建新的日志器（Info 级别）
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            level: Cell::new(Level::Info),
            records: RefCell::new(Vec::new()),
            sources: RefCell::new(vec![source.into()]),
        }
    }

    /// 设置级别（构建器风格）
    pub fn with_level(self, level: Level) -> Self {
        self.level.set(level);
        self
    }

    /// 动态设置日志级别
    pub fn set_level(&self, level: Level) {
        self.level.set(level);
    }

    /// 获取当前日志级别
    pub fn level(&self) -> Level {
        self.level.get()
    }

    /// 检查指定级别是否启用
    pub fn is_enabled(&self, level: Level) -> bool {
        level == Level::Output || level >= self.level()
    }

    /// 当前来源名
    pub fn source(&self) -> String {
        self.sources.borrow().last().cloned().unwrap_or_default()
    }

    /// 应用名（来源栈底）
    pub fn app_name(&self) -> String {
        self.sources.borrow().first().cloned().unwrap_or_default()
    }

    /// 记录一条日志
    pub fn log(&self, level: Level, message: impl Into<String>) {
        if !self.is_enabled(level) {
            return;
        }
        let record = Record::new(level, self.source(), message);
        self.records.borrow_mut().push(record);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.log(Level::Error, message);
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.log(Level::Warning, message);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.log(Level::Info, message);
    }

    pub fn debug(&self, message: impl Into<String>) {
        self.log(Level::Debug, message);
    }

    /// 原样输出（帮助、版本、程序打印）
    pub fn output(&self, text: impl Into<String>) {
        self.log(Level::Output, text);
    }

    /// 压入新的来源名，返回守卫对象
    pub fn enter_source(&self, name: impl Into<String>) -> SourceGuard<'_> {
        self.sources.borrow_mut().push(name.into());
        SourceGuard { logger: self }
    }

    /// 待刷新记录数
    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 当前缓冲记录的快照（不排空）
    pub fn records(&self) -> Vec<Record> {
        self.records.borrow().clone()
    }

    /// 排空缓冲区并按顺序写入 sink，返回写入条数
    ///
    /// 写入失败时，失败记录之后的记录仍被丢弃：一次调用只刷新一次。
    pub fn flush(&self, sink: &mut dyn LogSink) -> crate::Result<usize> {
        let drained: Vec<Record> = self.records.borrow_mut().drain(..).collect();
        for record in &drained {
            sink.write(record)?;
        }
        sink.finish()?;
        Ok(drained.len())
    }
}

/// 来源守卫，退出时自动弹出来源栈
pub struct SourceGuard<'a> {
    logger: &'a Logger,
}

impl Drop for SourceGuard<'_> {
    fn drop(&mut self) {
        let mut sources = self.logger.sources.borrow_mut();
        if sources.len() > 1 {
            sources.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{ApplicationFormatter, MemorySink};

    #[test]
    fn test_logger_creation() {
        let logger = Logger::new("casmi");
        assert_eq!(logger.level(), Level::Info);
        assert!(logger.is_enabled(Level::Info));
        assert!(!logger.is_enabled(Level::Debug));
        assert_eq!(logger.source(), "casmi");
    }

    #[test]
    fn test_level_change() {
        let logger = Logger::new("casmi");
        logger.debug("hidden");
        assert!(logger.is_empty());

        logger.set_level(Level::Debug);
        logger.debug("visible");
        assert_eq!(logger.len(), 1);
    }

    #[test]
    fn test_output_ignores_level() {
        let logger = Logger::new("casmi").with_level(Level::Error);
        logger.info("dropped");
        logger.output("usage text");
        let records = logger.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].level, Level::Output);
    }

    #[test]
    fn test_source_guard() {
        let logger = Logger::new("casmi");
        {
            let guard = logger.enter_source("type-check");
            assert_eq!(logger.source(), "type-check");
            logger.error("unknown rule 'foo'");
            drop(guard);
        }
        assert_eq!(logger.source(), "casmi");
        logger.error("pipeline failed");

        let records = logger.records();
        assert_eq!(records[0].source, "type-check");
        assert_eq!(records[1].source, "casmi");
        assert_eq!(logger.app_name(), "casmi");
    }

    #[test]
    fn test_flush_drains_in_order() {
        let logger = Logger::new("casmi");
        logger.error("first");
        logger.warning("second");
        assert_eq!(logger.len(), 2);

        let mut sink = MemorySink::new(ApplicationFormatter::new("casmi"));
        assert_eq!(logger.flush(&mut sink).unwrap(), 2);
        assert!(logger.is_empty());
        assert_eq!(
            sink.contents(),
            "casmi: error: first\ncasmi: warning: second\n"
        );

        // 第二次刷新没有新内容
        assert_eq!(logger.flush(&mut sink).unwrap(), 0);
        assert_eq!(sink.records().len(), 2);
    }
}
