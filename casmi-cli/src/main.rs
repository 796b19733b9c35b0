//! casmi - CASM interpreter command line
//!
//! 解析参数，按所选 pass 运行流水线，把诊断写到 stdout/stderr，
//! 以确定的退出码结束。

use std::env;
use std::path::{Path, PathBuf};
use std::process;

mod bindings;
mod driver;
mod logging;
mod options;

use casmi_log::{ApplicationFormatter, ConsoleSink, LogConfig};
use casmi_orchestrator::passes::{self, DEFAULT_PIPELINE};
use casmi_vfs::NativeFileSystem;
use driver::{exit, Driver};

const DEFAULT_APP: &str = "casmi";

/// 导入模块的额外搜索目录
const MODULE_PATH_ENV: &str = "CASMI_PATH";

fn main() {
    logging::init();

    let mut args: Vec<String> = env::args_os()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();
    let app = app_name(args.first().map(String::as_str));
    if !args.is_empty() {
        args.remove(0);
    }

    let log = LogConfig::new(&app).init();
    let mut sink = ConsoleSink::stdio(ApplicationFormatter::new(&app));

    let code = match passes::builtin_registry() {
        Ok(registry) => Driver::new(&app, registry, DEFAULT_PIPELINE)
            .with_module_paths(module_paths())
            .run_and_flush(args, &NativeFileSystem::new(), &log, &mut sink),
        Err(err) => {
            casmi_log::error!(log, "internal error: {err}");
            let _ = log.flush(&mut sink);
            exit::FAILURE
        }
    };
    process::exit(code);
}

/// 程序名：argv[0] 的文件名
fn app_name(argv0: Option<&str>) -> String {
    argv0
        .and_then(|arg| Path::new(arg).file_stem())
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .unwrap_or(DEFAULT_APP)
        .to_string()
}

fn module_paths() -> Vec<PathBuf> {
    env::var_os(MODULE_PATH_ENV)
        .map(|value| {
            env::split_paths(&value)
                .filter(|path| !path.as_os_str().is_empty())
                .collect()
        })
        .unwrap_or_default()
}
