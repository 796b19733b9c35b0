//! 命令行选项注册表
//!
//! 选项在运行时注册（内置选项之后是每个带 flag 的 pass），所以这里不用
//! clap 的 derive，而是用 builder 动态构造 `Command`。clap 只负责切分参数；
//! 动作由注册表按命令行顺序自己分发。

use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command};

/// 选项是否带值
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    None,
    Required,
}

/// 动作结果，也是整个解析的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStatus {
    /// 继续
    Continue,
    /// 已完成输出，成功退出
    ExitOk,
    /// 已报告错误，失败退出
    ExitError,
}

/// 解析上下文需要能接收参数错误
pub trait Diagnostics {
    fn argument_error(&mut self, message: &str);
}

/// 传给动作的调用信息
pub struct Invocation<'r, C> {
    /// 选项值（`Arity::Required` 与位置参数）
    pub value: Option<&'r str>,
    /// 注册表本身，用于渲染 usage
    pub options: &'r OptionRegistry<C>,
}

pub type Action<C> = Box<dyn Fn(&mut C, Invocation<'_, C>) -> ParseStatus>;

struct OptionSpec<C> {
    short: Option<char>,
    long: Option<String>,
    arity: Arity,
    description: String,
    action: Action<C>,
}

impl<C> OptionSpec<C> {
    /// `token` 是否正好是 `-x` 或 `--long`
    fn matches(&self, token: &str) -> bool {
        if let Some(long) = token.strip_prefix("--") {
            return self.long.as_deref() == Some(long);
        }
        let mut chars = token.chars();
        self.short.is_some()
            && chars.next() == Some('-')
            && chars.next() == self.short
            && chars.next().is_none()
    }
}

/// 选项注册表
pub struct OptionRegistry<C> {
    name: String,
    options: Vec<OptionSpec<C>>,
    positional: Action<C>,
}

const FILES: &str = "files";

impl<C: Diagnostics> OptionRegistry<C> {
    /// `positional` 处理每个位置参数
    pub fn new(
        name: impl Into<String>,
        positional: impl Fn(&mut C, Invocation<'_, C>) -> ParseStatus + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            options: Vec::new(),
            positional: Box::new(positional),
        }
    }

    pub fn register(
        &mut self,
        short: Option<char>,
        long: Option<&str>,
        arity: Arity,
        description: &str,
        action: impl Fn(&mut C, Invocation<'_, C>) -> ParseStatus + 'static,
    ) -> &mut Self {
        self.options.push(OptionSpec {
            short,
            long: long.map(str::to_string),
            arity,
            description: description.to_string(),
            action: Box::new(action),
        });
        self
    }

    /// 解析参数（不含程序名）并按命令行顺序执行动作
    ///
    /// 第一个 `ExitOk` 立即结束扫描并胜出；`ExitError` 被记住，扫描继续。
    pub fn parse<I, S>(&self, ctx: &mut C, args: I) -> ParseStatus
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        let matches = match self
            .command()
            .try_get_matches_from(std::iter::once(self.name.clone()).chain(args.iter().cloned()))
        {
            Ok(matches) => matches,
            Err(err) => {
                let rendered = err.to_string();
                let first = rendered.lines().next().unwrap_or_default();
                ctx.argument_error(first.strip_prefix("error: ").unwrap_or(first));
                return self.recover(ctx, &args);
            }
        };

        let mut failed = false;
        for event in self.events(&matches) {
            let invocation = Invocation {
                value: event.value.as_deref(),
                options: self,
            };
            let action = match event.option {
                Some(index) => &self.options[index].action,
                None => &self.positional,
            };
            match action(ctx, invocation) {
                ParseStatus::Continue => {}
                ParseStatus::ExitOk => return ParseStatus::ExitOk,
                ParseStatus::ExitError => failed = true,
            }
        }

        if failed {
            ParseStatus::ExitError
        } else {
            ParseStatus::Continue
        }
    }

    /// 切分失败后：逐个 token 能认出的无值 flag 按顺序执行，
    /// 没有 `ExitOk` 时结果为 `ExitError`
    fn recover(&self, ctx: &mut C, args: &[String]) -> ParseStatus {
        for token in args {
            let Some(option) = self.options.iter().find(|option| {
                option.arity == Arity::None && option.matches(token)
            }) else {
                continue;
            };
            let invocation = Invocation {
                value: None,
                options: self,
            };
            if (option.action)(ctx, invocation) == ParseStatus::ExitOk {
                return ParseStatus::ExitOk;
            }
        }
        ParseStatus::ExitError
    }

    /// 所有选项的说明，按注册顺序
    pub fn usage(&self) -> String {
        let heads: Vec<String> = self
            .options
            .iter()
            .map(|option| {
                let mut head = match option.short {
                    Some(short) if option.long.is_some() => format!("-{short}, "),
                    Some(short) => format!("-{short}"),
                    None => "    ".to_string(),
                };
                if let Some(long) = &option.long {
                    head.push_str("--");
                    head.push_str(long);
                }
                if option.arity == Arity::Required {
                    head.push_str(" <arg>");
                }
                head
            })
            .collect();
        let width = heads.iter().map(String::len).max().unwrap_or(0);

        let mut usage = String::new();
        for (head, option) in heads.iter().zip(&self.options) {
            usage.push_str(&format!(
                "  {head:<width$}   {}\n",
                option.description
            ));
        }
        usage
    }

    fn command(&self) -> Command {
        let mut command = Command::new(self.name.clone())
            .disable_help_flag(true)
            .disable_version_flag(true)
            .arg(
                Arg::new(FILES)
                    .action(ArgAction::Append)
                    .num_args(1..)
                    .value_parser(clap::value_parser!(String)),
            );

        for (index, option) in self.options.iter().enumerate() {
            let mut arg = Arg::new(arg_id(index));
            if let Some(short) = option.short {
                arg = arg.short(short);
            }
            if let Some(long) = &option.long {
                arg = arg.long(long.clone());
            }
            arg = match option.arity {
                Arity::None => arg.action(ArgAction::Count),
                Arity::Required => arg
                    .action(ArgAction::Append)
                    .num_args(1)
                    .allow_hyphen_values(true)
                    .value_parser(clap::value_parser!(String)),
            };
            command = command.arg(arg);
        }
        command
    }

    /// 命令行上出现的每个选项/值，按出现顺序
    fn events(&self, matches: &ArgMatches) -> Vec<Event> {
        let mut events = Vec::new();

        let explicit = |id: &str| matches.value_source(id) == Some(ValueSource::CommandLine);

        if explicit(FILES) {
            if let (Some(indices), Some(values)) =
                (matches.indices_of(FILES), matches.get_many::<String>(FILES))
            {
                for (index, value) in indices.zip(values) {
                    events.push(Event {
                        index,
                        option: None,
                        value: Some(value.clone()),
                    });
                }
            }
        }

        for (position, option) in self.options.iter().enumerate() {
            let id = arg_id(position);
            if !explicit(&id) {
                continue;
            }
            match option.arity {
                Arity::None => {
                    // a counted flag keeps only the index of its last occurrence
                    let index = matches
                        .indices_of(&id)
                        .and_then(|indices| indices.last())
                        .unwrap_or(0);
                    for _ in 0..matches.get_count(&id) {
                        events.push(Event {
                            index,
                            option: Some(position),
                            value: None,
                        });
                    }
                }
                Arity::Required => {
                    if let (Some(indices), Some(values)) =
                        (matches.indices_of(&id), matches.get_many::<String>(&id))
                    {
                        for (index, value) in indices.zip(values) {
                            events.push(Event {
                                index,
                                option: Some(position),
                                value: Some(value.clone()),
                            });
                        }
                    }
                }
            }
        }

        events.sort_by_key(|event| event.index);
        events
    }
}

struct Event {
    index: usize,
    /// `None` for positional arguments
    option: Option<usize>,
    value: Option<String>,
}

fn arg_id(index: usize) -> String {
    format!("opt{index}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Ctx {
        seen: Vec<String>,
        errors: Vec<String>,
    }

    impl Diagnostics for Ctx {
        fn argument_error(&mut self, message: &str) {
            self.errors.push(message.to_string());
        }
    }

    fn registry() -> OptionRegistry<Ctx> {
        let mut registry = OptionRegistry::new("casmi", |ctx: &mut Ctx, inv| {
            ctx.seen.push(format!("file {}", inv.value.unwrap_or_default()));
            ParseStatus::Continue
        });
        registry
            .register(Some('a'), Some("alpha"), Arity::None, "first flag", |ctx: &mut Ctx, _| {
                ctx.seen.push("alpha".into());
                ParseStatus::Continue
            })
            .register(None, Some("value"), Arity::Required, "takes a value", |ctx: &mut Ctx, inv| {
                ctx.seen.push(format!("value {}", inv.value.unwrap_or_default()));
                ParseStatus::Continue
            })
            .register(Some('h'), Some("help"), Arity::None, "show help", |ctx: &mut Ctx, inv| {
                ctx.seen.push(format!("help {} lines", inv.options.usage().lines().count()));
                ParseStatus::ExitOk
            })
            .register(Some('x'), None, Arity::None, "always fails", |ctx: &mut Ctx, _| {
                ctx.argument_error("x is not allowed");
                ParseStatus::ExitError
            });
        registry
    }

    #[test]
    fn test_actions_run_in_command_line_order() {
        let mut ctx = Ctx::default();
        let status = registry().parse(&mut ctx, ["--value", "-3", "spec.casm", "-a"]);
        assert_eq!(status, ParseStatus::Continue);
        assert_eq!(ctx.seen, vec!["value -3", "file spec.casm", "alpha"]);
    }

    #[test]
    fn test_repeated_values_are_separate_events() {
        let mut ctx = Ctx::default();
        registry().parse(&mut ctx, ["--value", "1", "--value=2"]);
        assert_eq!(ctx.seen, vec!["value 1", "value 2"]);
    }

    #[test]
    fn test_exit_ok_wins_over_earlier_error() {
        let mut ctx = Ctx::default();
        let status = registry().parse(&mut ctx, ["-x", "-h", "-a"]);
        assert_eq!(status, ParseStatus::ExitOk);
        assert_eq!(ctx.seen, vec!["help 4 lines"]);
        assert_eq!(ctx.errors, vec!["x is not allowed"]);
    }

    #[test]
    fn test_error_is_remembered() {
        let mut ctx = Ctx::default();
        let status = registry().parse(&mut ctx, ["-x", "-a"]);
        assert_eq!(status, ParseStatus::ExitError);
        assert_eq!(ctx.seen, vec!["alpha"]);
    }

    #[test]
    fn test_unknown_flag() {
        let mut ctx = Ctx::default();
        let status = registry().parse(&mut ctx, ["--value", "1", "--bogus", "-a"]);
        assert_eq!(status, ParseStatus::ExitError);
        assert_eq!(ctx.seen, vec!["alpha"]);
        assert_eq!(ctx.errors.len(), 1);
        assert!(ctx.errors[0].contains("--bogus"));
        assert!(!ctx.errors[0].starts_with("error:"));
    }

    #[test]
    fn test_help_survives_unknown_flag() {
        let mut ctx = Ctx::default();
        let status = registry().parse(&mut ctx, ["--bogus", "-h", "-a"]);
        assert_eq!(status, ParseStatus::ExitOk);
        assert_eq!(ctx.seen, vec!["help 4 lines"]);
    }

    #[test]
    fn test_missing_value() {
        let mut ctx = Ctx::default();
        let status = registry().parse(&mut ctx, ["--value"]);
        assert_eq!(status, ParseStatus::ExitError);
        assert_eq!(ctx.errors.len(), 1);
    }

    #[test]
    fn test_usage_in_registration_order() {
        let usage = registry().usage();
        assert_eq!(
            usage,
            concat!(
                "  -a, --alpha         first flag\n",
                "      --value <arg>   takes a value\n",
                "  -h, --help          show help\n",
                "  -x                  always fails\n",
            )
        );
    }
}
