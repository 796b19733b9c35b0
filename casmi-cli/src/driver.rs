//! 驱动：命令行 → 选项注册表 → pass 流水线 → 退出码
//!
//! 每次运行使用一个新的 `ResultStore`；诊断记录缓冲在 `Logger` 中，
//! 由 [`Driver::run_and_flush`] 在所有退出路径上刷新且只刷新一次。

use crate::bindings::parse_binding;
use crate::options::{Arity, Diagnostics, OptionRegistry, ParseStatus};
use casmi_config::{version, RunConfig, KEYBOARD, STDOUT};
use casmi_log::{Level, LogSink, Logger};
use casmi_orchestrator::{Orchestrator, PassId, PassRegistry, ResultStore};
use casmi_vfs::VirtualFileSystem;
use std::path::PathBuf;

/// 进程退出码
pub mod exit {
    /// 成功，或 `--help` 之类的提前成功退出
    pub const SUCCESS: i32 = 0;
    /// 参数错误
    pub const ARGUMENTS: i32 = 1;
    /// 没有输入文件
    pub const NO_INPUT: i32 = 2;
    /// 流水线失败（POSIX 父进程看到 255）
    pub const FAILURE: i32 = -1;
}

/// 选项动作修改的解析上下文
///
/// 动作产生的诊断先缓存在这里，解析结束后按原顺序写入 `Logger`。
pub struct ParseContext {
    app: String,
    files: Vec<String>,
    selection: Vec<PassId>,
    config: RunConfig,
    diagnostics: Vec<(Level, String)>,
}

impl ParseContext {
    fn new(app: &str, config: RunConfig) -> Self {
        Self {
            app: app.to_string(),
            files: Vec::new(),
            selection: Vec::new(),
            config,
            diagnostics: Vec::new(),
        }
    }

    fn output(&mut self, text: String) {
        self.diagnostics.push((Level::Output, text));
    }
}

impl Diagnostics for ParseContext {
    fn argument_error(&mut self, message: &str) {
        self.diagnostics.push((Level::Error, message.to_string()));
    }
}

pub struct Driver {
    app: String,
    registry: PassRegistry,
    default_pipeline: Vec<PassId>,
    module_paths: Vec<PathBuf>,
}

impl Driver {
    pub fn new(app: impl Into<String>, registry: PassRegistry, default_pipeline: &[PassId]) -> Self {
        Self {
            app: app.into(),
            registry,
            default_pipeline: default_pipeline.to_vec(),
            module_paths: Vec::new(),
        }
    }

    /// 额外的模块搜索目录（`CASMI_PATH`）
    pub fn with_module_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.module_paths = paths;
        self
    }

    /// 运行一次并刷新诊断缓冲，返回退出码
    pub fn run_and_flush<I, S>(
        &self,
        args: I,
        fs: &dyn VirtualFileSystem,
        log: &Logger,
        sink: &mut dyn LogSink,
    ) -> i32
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut store = ResultStore::new();
        let code = self.run(args, fs, log, &mut store);
        match log.flush(sink) {
            Ok(_) => code,
            Err(err) => {
                tracing::error!(%err, "failed to flush diagnostics");
                if code == exit::SUCCESS {
                    exit::FAILURE
                } else {
                    code
                }
            }
        }
    }

    /// 解析参数并运行流水线；不刷新诊断缓冲
    pub fn run<I, S>(
        &self,
        args: I,
        fs: &dyn VirtualFileSystem,
        log: &Logger,
        store: &mut ResultStore,
    ) -> i32
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let config = RunConfig {
            module_paths: self.module_paths.clone(),
            ..RunConfig::default()
        };
        let mut ctx = ParseContext::new(&self.app, config);
        let status = self.options().parse(&mut ctx, args);

        let ParseContext {
            files,
            selection,
            mut config,
            diagnostics,
            ..
        } = ctx;
        if config.ast_parse_debug && log.level() > Level::Debug {
            log.set_level(Level::Debug);
        }
        for (level, message) in diagnostics {
            log.log(level, message);
        }
        match status {
            ParseStatus::Continue => {}
            ParseStatus::ExitOk => return exit::SUCCESS,
            ParseStatus::ExitError => return exit::ARGUMENTS,
        }

        let Some(input) = files.into_iter().next() else {
            log.error("no input file provided");
            return exit::NO_INPUT;
        };
        config.input = Some(PathBuf::from(input));
        tracing::info!(input = ?config.input, ?selection, "running pipeline");

        let orchestrator = Orchestrator::new(&self.registry, &config, fs, log)
            .with_default_pipeline(self.default_pipeline.clone());
        match orchestrator.run(&selection, store) {
            Ok(report) => {
                tracing::debug!(
                    executed = report.executed.len(),
                    skipped = report.skipped.len(),
                    "pipeline succeeded"
                );
                exit::SUCCESS
            }
            Err(err) if err.is_internal() => {
                casmi_log::error!(log, "internal error: {err}");
                exit::FAILURE
            }
            Err(err) => {
                casmi_log::error!(log, "{err}");
                exit::FAILURE
            }
        }
    }

    /// 内置选项，然后是每个带 flag 的 pass（按注册顺序）
    fn options(&self) -> OptionRegistry<ParseContext> {
        let mut options = OptionRegistry::new(self.app.clone(), |ctx: &mut ParseContext, inv| {
            let file = inv.value.unwrap_or_default();
            if let Some(first) = ctx.files.first() {
                let message = format!(
                    "too many files, input file '{first}' cannot be combined with file '{file}'"
                );
                ctx.argument_error(&message);
                return ParseStatus::ExitError;
            }
            ctx.files.push(file.to_string());
            ParseStatus::Continue
        });

        options
            .register(
                Some('t'),
                Some("test-case-profile"),
                Arity::None,
                "display the unique test profile identifier",
                |ctx: &mut ParseContext, _| {
                    ctx.output(version::PROFILE.to_string());
                    ParseStatus::ExitOk
                },
            )
            .register(
                Some('h'),
                Some("help"),
                Arity::None,
                "display usage and synopsis",
                |ctx: &mut ParseContext, inv| {
                    let text = help_text(&ctx.app, &inv.options.usage());
                    ctx.output(text);
                    ParseStatus::ExitOk
                },
            )
            .register(
                Some('v'),
                Some("version"),
                Arity::None,
                "display version information",
                |ctx: &mut ParseContext, _| {
                    let text = version_text(&ctx.app);
                    ctx.output(text);
                    ParseStatus::ExitOk
                },
            )
            .register(
                Some('o'),
                Some("output"),
                Arity::Required,
                "write dumps to this file instead of stdout",
                |ctx: &mut ParseContext, inv| {
                    if ctx.config.output.is_some() {
                        ctx.argument_error("output path is already set");
                        return ParseStatus::ExitError;
                    }
                    ctx.config.output = inv.value.map(PathBuf::from);
                    ParseStatus::Continue
                },
            )
            .register(
                None,
                Some("in"),
                Arity::Required,
                "bind an input location, 'location[:=value]'",
                |ctx: &mut ParseContext, inv| {
                    match parse_binding(inv.value.unwrap_or_default(), KEYBOARD) {
                        Ok(binding) => {
                            ctx.config.inputs.push(binding);
                            ParseStatus::Continue
                        }
                        Err(err) => {
                            ctx.argument_error(&err.to_string());
                            ParseStatus::ExitError
                        }
                    }
                },
            )
            .register(
                None,
                Some("out"),
                Arity::Required,
                "bind an output location, 'location[:=target]'",
                |ctx: &mut ParseContext, inv| {
                    match parse_binding(inv.value.unwrap_or_default(), STDOUT) {
                        Ok(binding) => {
                            ctx.config.outputs.push(binding);
                            ParseStatus::Continue
                        }
                        Err(err) => {
                            ctx.argument_error(&err.to_string());
                            ParseStatus::ExitError
                        }
                    }
                },
            )
            .register(
                None,
                Some("ast-parse-debug"),
                Arity::None,
                "trace the parser while building the AST",
                |ctx: &mut ParseContext, _| {
                    ctx.config.ast_parse_debug = true;
                    ParseStatus::Continue
                },
            );

        for descriptor in self.registry.all().filter(|d| !d.is_internal()) {
            let id = descriptor.id;
            options.register(
                descriptor.short,
                descriptor.long,
                Arity::None,
                descriptor.description,
                move |ctx: &mut ParseContext, _| {
                    if !ctx.selection.contains(&id) {
                        ctx.selection.push(id);
                    }
                    ParseStatus::Continue
                },
            );
        }
        options
    }
}

fn help_text(app: &str, usage: &str) -> String {
    format!(
        "\n{}\n{app}: usage: [options] <file>\n\noptions: \n{usage}\n",
        version::DESCRIPTION
    )
}

fn version_text(app: &str) -> String {
    format!(
        "\n{}\n{app}: version: {} [ {} {} ]\n\n{}",
        version::DESCRIPTION,
        version::REVTAG,
        version::BUILD_DATE,
        version::BUILD_TIME,
        version::NOTICE
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use casmi_log::{ApplicationFormatter, MemorySink};
    use casmi_orchestrator::passes::{self, DEFAULT_PIPELINE, NUMERIC_EXECUTION};
    use casmi_vfs::MemoryFileSystem;
    use std::path::Path;

    const COUNTER: &str = "init main\nfunction n = 1\nrule main = { n := n + 1 print n }";

    struct Fixture {
        driver: Driver,
        fs: MemoryFileSystem,
        log: Logger,
        store: ResultStore,
    }

    impl Fixture {
        fn new() -> Self {
            Self::with_files([("main.casm", COUNTER)])
        }

        fn with_files<'s>(files: impl IntoIterator<Item = (&'s str, &'s str)>) -> Self {
            Self {
                driver: Driver::new("casmi", passes::builtin_registry().unwrap(), DEFAULT_PIPELINE),
                fs: MemoryFileSystem::with_files(files),
                log: Logger::new("casmi"),
                store: ResultStore::new(),
            }
        }

        fn run(&mut self, args: &[&str]) -> i32 {
            self.driver
                .run(args.iter().copied(), &self.fs, &self.log, &mut self.store)
        }

        fn rendered(&self) -> String {
            let mut sink = MemorySink::new(ApplicationFormatter::new("casmi"));
            self.log.flush(&mut sink).unwrap();
            sink.contents().to_string()
        }

        fn output(&self) -> Vec<String> {
            self.log
                .records()
                .into_iter()
                .filter(|r| r.is_output())
                .map(|r| r.message)
                .collect()
        }
    }

    #[test]
    fn test_default_pipeline() {
        let mut fx = Fixture::new();
        assert_eq!(fx.run(&["main.casm"]), exit::SUCCESS);
        assert_eq!(fx.output(), vec!["2"]);
        assert!(fx.store.has(NUMERIC_EXECUTION));
    }

    #[test]
    fn test_runs_are_deterministic() {
        let mut first = Fixture::new();
        let mut second = Fixture::new();
        first.run(&["main.casm", "--out", "n"]);
        second.run(&["main.casm", "--out", "n"]);
        assert_eq!(first.log.records(), second.log.records());
        assert_eq!(first.rendered(), "2\nn = 2\n");
    }

    #[test]
    fn test_too_many_files() {
        let mut fx = Fixture::new();
        assert_eq!(fx.run(&["main.casm", "other.casm"]), exit::ARGUMENTS);
        assert!(fx.store.is_empty());
        assert_eq!(
            fx.rendered(),
            "casmi: error: too many files, input file 'main.casm' cannot be combined with file 'other.casm'\n"
        );
    }

    #[test]
    fn test_no_input_file() {
        let mut fx = Fixture::new();
        assert_eq!(fx.run(&["-n"]), exit::NO_INPUT);
        assert!(fx.store.is_empty());
        assert_eq!(fx.rendered(), "casmi: error: no input file provided\n");
    }

    #[test]
    fn test_help_wins_over_other_flags() {
        let mut fx = Fixture::new();
        assert_eq!(fx.run(&["a.casm", "b.casm", "--help", "-n"]), exit::SUCCESS);
        assert!(fx.store.is_empty());
        let help = fx.output().pop().unwrap();
        assert!(help.contains("casmi: usage: [options] <file>"));
        assert!(help.contains("-n, --numeric-execution"));
        assert!(help.contains("--ir-dump"));
        assert!(help.find("--test-case-profile") < help.find("--ast-dump"));
    }

    #[test]
    fn test_version() {
        let mut fx = Fixture::new();
        assert_eq!(fx.run(&["-v", "main.casm"]), exit::SUCCESS);
        assert!(fx.store.is_empty());
        let text = fx.output().pop().unwrap();
        assert!(text.contains(&format!("casmi: version: {}", version::REVTAG)));
        assert!(text.ends_with(version::NOTICE));
    }

    #[test]
    fn test_profile() {
        let mut fx = Fixture::new();
        assert_eq!(fx.run(&["--test-case-profile"]), exit::SUCCESS);
        assert_eq!(fx.rendered(), "casmi\n");
    }

    #[test]
    fn test_output_twice() {
        let mut fx = Fixture::new();
        let code = fx.run(&["-o", "a.dot", "--output", "b.dot", "main.casm"]);
        assert_eq!(code, exit::ARGUMENTS);
        assert!(fx.rendered().contains("output path is already set"));
    }

    #[test]
    fn test_bad_binding() {
        let mut fx = Fixture::new();
        assert_eq!(fx.run(&["main.casm", "--in", "n:="]), exit::ARGUMENTS);
        assert!(fx.rendered().contains("binding 'n:=' has an empty value"));
    }

    #[test]
    fn test_unknown_flag() {
        let mut fx = Fixture::new();
        assert_eq!(fx.run(&["main.casm", "--bogus"]), exit::ARGUMENTS);
        assert!(fx.store.is_empty());
        assert!(fx.rendered().starts_with("casmi: error: "));
    }

    #[test]
    fn test_help_with_unknown_flag() {
        let mut fx = Fixture::new();
        assert_eq!(fx.run(&["--bogus", "main.casm", "--help"]), exit::SUCCESS);
        assert!(fx.store.is_empty());
        assert!(fx.output()[0].contains("usage: [options] <file>"));
    }

    #[test]
    fn test_failing_pass() {
        let mut fx = Fixture::with_files([("main.casm", "init main\nrule main = { print ghost }")]);
        let code = fx.run(&["main.casm"]);
        assert_eq!(code, exit::FAILURE);
        assert!(!fx.store.has(NUMERIC_EXECUTION));
        let text = fx.rendered();
        assert!(text.contains("casmi: error: pass 'type-check' failed"));
        assert!(!text.contains("internal error"));
    }

    #[test]
    fn test_long_expression_is_a_syntax_error() {
        let mut text = String::from("init main\nrule main = { print 1");
        for _ in 1..100_000 {
            text.push_str(" + 1");
        }
        text.push_str(" }\n");
        let mut fx = Fixture::with_files([("main.casm", text.as_str())]);

        assert_eq!(fx.run(&["main.casm"]), exit::FAILURE);
        assert!(!fx.store.has(passes::SOURCE_TO_AST));
        let text = fx.rendered();
        assert!(text.starts_with("casmi: error: pass 'source-to-ast' failed: main:2:"));
        assert!(text.contains("expression nesting exceeds 256 levels"));
    }

    struct Exploding;

    impl casmi_orchestrator::Pass for Exploding {
        fn run(
            &mut self,
            _store: &mut ResultStore,
            _ctx: &casmi_orchestrator::PassContext<'_>,
        ) -> Result<casmi_orchestrator::PassOutcome, casmi_orchestrator::PassError> {
            panic!("index out of range")
        }
    }

    #[test]
    fn test_panicking_pass() {
        let mut registry = passes::builtin_registry().unwrap();
        registry
            .register(
                casmi_orchestrator::PassDescriptor::new(
                    casmi_orchestrator::PassId::new("explode"),
                    "always panics",
                    |_| Box::new(Exploding),
                )
                .with_flag(None, "explode")
                .requires(&[passes::SOURCE_TO_AST]),
            )
            .unwrap();
        let mut fx = Fixture::new();
        fx.driver = Driver::new("casmi", registry, DEFAULT_PIPELINE);

        assert_eq!(fx.run(&["--explode", "main.casm"]), exit::FAILURE);
        assert!(fx.store.has(passes::SOURCE_TO_AST));
        let text = fx.rendered();
        assert!(text.contains("casmi: error: pass 'explode' panicked: index out of range\n"));
        assert!(!text.contains("internal error"));
    }

    #[test]
    fn test_missing_input_file() {
        let mut fx = Fixture::new();
        assert_eq!(fx.run(&["absent.casm"]), exit::FAILURE);
        assert!(fx.rendered().contains("pass 'load-file' failed"));
    }

    #[test]
    fn test_in_binding_and_dump_to_file() {
        let mut fx = Fixture::new();
        assert_eq!(fx.run(&["main.casm", "--in", "n:=9"]), exit::SUCCESS);
        assert_eq!(fx.output(), vec!["10"]);

        let mut fx = Fixture::new();
        assert_eq!(fx.run(&["-a", "-o", "main.dot", "main.casm"]), exit::SUCCESS);
        assert!(fx.output().is_empty());
        let dot = fx.fs.read_to_string(Path::new("main.dot")).unwrap();
        assert!(dot.starts_with("digraph"));
    }

    #[test]
    fn test_ast_parse_debug_enables_debug_records() {
        let mut fx = Fixture::new();
        fx.log.set_level(Level::Warning);
        assert_eq!(fx.run(&["--ast-parse-debug", "main.casm"]), exit::SUCCESS);
        assert!(fx
            .log
            .records()
            .iter()
            .any(|r| r.level == Level::Debug && r.source == "source-to-ast"));
    }

    #[test]
    fn test_module_paths() {
        let mut fx = Fixture::with_files([
            ("spec/main.casm", "import lib\ninit main\nrule main = { print answer }"),
            ("share/lib.casm", "function answer = 42"),
        ]);
        fx.driver = Driver::new("casmi", passes::builtin_registry().unwrap(), DEFAULT_PIPELINE)
            .with_module_paths(vec![PathBuf::from("share")]);
        assert_eq!(fx.run(&["spec/main.casm"]), exit::SUCCESS);
        assert_eq!(fx.output(), vec!["42"]);
    }

    #[test]
    fn test_flush_once() {
        let fx = Fixture::new();
        let mut sink = MemorySink::new(ApplicationFormatter::new("casmi"));
        let code = fx
            .driver
            .run_and_flush(["main.casm", "main.casm"], &fx.fs, &fx.log, &mut sink);
        assert_eq!(code, exit::ARGUMENTS);
        assert_eq!(sink.records().len(), 1);
        assert!(fx.log.is_empty());
    }
}
