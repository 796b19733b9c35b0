//! 输出目标与格式化器

use crate::record::Record;
use std::io::Write;

/// 记录格式化器
pub trait Formatter {
    /// 把一条记录渲染为一行或多行文本（含结尾换行）
    fn format(&self, record: &Record) -> String;
}

/// 应用格式化器
///
/// - 原样输出：消息本身，必要时补一个换行
/// - 其他级别：`<app>: <level>: <message>`；来源不是应用本身时
///   写作 `<app>: <level>: <source>: <message>`
#[derive(Clone, Debug)]
pub struct ApplicationFormatter {
    app_name: String,
}

impl ApplicationFormatter {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
        }
    }
}

impl Formatter for ApplicationFormatter {
    fn format(&self, record: &Record) -> String {
        if record.is_output() {
            let mut text = record.message.clone();
            if !text.ends_with('\n') {
                text.push('\n');
            }
            return text;
        }

        if record.source == self.app_name || record.source.is_empty() {
            format!("{}: {}: {}\n", self.app_name, record.level, record.message)
        } else {
            format!(
                "{}: {}: {}: {}\n",
                self.app_name, record.level, record.source, record.message
            )
        }
    }
}

/// 日志输出目标 trait
pub trait LogSink {
    /// 写入一条记录
    fn write(&mut self, record: &Record) -> crate::Result<()>;

    /// 一次刷新结束（默认什么都不做）
    fn finish(&mut self) -> crate::Result<()> {
        Ok(())
    }
}

/// 输出流 sink（stderr、文件等）
pub struct StreamSink<W: Write, F: Formatter> {
    writer: W,
    formatter: F,
}

impl<W: Write, F: Formatter> StreamSink<W, F> {
    pub fn new(writer: W, formatter: F) -> Self {
        Self { writer, formatter }
    }

    /// 取回底层 writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<F: Formatter> StreamSink<std::io::Stderr, F> {
    /// 标准错误 sink
    pub fn stderr(formatter: F) -> Self {
        Self::new(std::io::stderr(), formatter)
    }
}

impl<W: Write, F: Formatter> LogSink for StreamSink<W, F> {
    fn write(&mut self, record: &Record) -> crate::Result<()> {
        let text = self.formatter.format(record);
        self.writer.write_all(text.as_bytes())?;
        Ok(())
    }

    fn finish(&mut self) -> crate::Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// 控制台 sink：原样输出写 stdout，诊断写 stderr
pub struct ConsoleSink<O: Write, E: Write, F: Formatter> {
    out: O,
    err: E,
    formatter: F,
}

impl<O: Write, E: Write, F: Formatter> ConsoleSink<O, E, F> {
    pub fn new(out: O, err: E, formatter: F) -> Self {
        Self {
            out,
            err,
            formatter,
        }
    }

    /// 取回底层 writer
    pub fn into_inner(self) -> (O, E) {
        (self.out, self.err)
    }
}

impl<F: Formatter> ConsoleSink<std::io::Stdout, std::io::Stderr, F> {
    /// 进程标准输出 / 标准错误
    pub fn stdio(formatter: F) -> Self {
        Self::new(std::io::stdout(), std::io::stderr(), formatter)
    }
}

impl<O: Write, E: Write, F: Formatter> LogSink for ConsoleSink<O, E, F> {
    fn write(&mut self, record: &Record) -> crate::Result<()> {
        let text = self.formatter.format(record);
        if record.is_output() {
            self.out.write_all(text.as_bytes())?;
        } else {
            self.err.write_all(text.as_bytes())?;
        }
        Ok(())
    }

    fn finish(&mut self) -> crate::Result<()> {
        self.out.flush()?;
        self.err.flush()?;
        Ok(())
    }
}

/// 内存 sink（用于测试与确定性比较）
pub struct MemorySink<F: Formatter> {
    formatter: F,
    records: Vec<Record>,
    text: String,
}

impl<F: Formatter> MemorySink<F> {
    pub fn new(formatter: F) -> Self {
        Self {
            formatter,
            records: Vec::new(),
            text: String::new(),
        }
    }

    /// 已写入的记录
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// 已渲染的文本
    pub fn contents(&self) -> &str {
        &self.text
    }
}

impl<F: Formatter> LogSink for MemorySink<F> {
    fn write(&mut self, record: &Record) -> crate::Result<()> {
        self.text.push_str(&self.formatter.format(record));
        self.records.push(record.clone());
        Ok(())
    }
}
