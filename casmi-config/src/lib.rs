//! casmi Config - Pure configuration data structures
//!
//! This crate contains only data structures and constants, no global state.
//! It is the shared configuration vocabulary between the CLI, the
//! orchestrator and the passes.

use std::path::PathBuf;

/// Version and identity strings shown by `--help`, `--version` and
/// `--test-case-profile`.
pub mod version {
    pub const DESCRIPTION: &str = "Corinthian Abstract State Machine (CASM) Interpreter\n";

    /// Unique test profile identifier.
    pub const PROFILE: &str = "casmi";

    pub const REVTAG: &str = match option_env!("CASMI_REVTAG") {
        Some(tag) => tag,
        None => concat!("v", env!("CARGO_PKG_VERSION")),
    };

    pub const LICENSE: &str = env!("CARGO_PKG_LICENSE");

    pub const NOTICE: &str = concat!(
        "Copyright (C) the casmi authors.\n",
        "This is free software, distributed under the terms of the ",
        env!("CARGO_PKG_LICENSE"),
        " license.\n",
        "There is NO WARRANTY, to the extent permitted by law.\n",
    );

    /// Build date (`Mmm dd yyyy`) and time (`hh:mm:ss`, UTC), stamped by `build.rs`.
    pub const BUILD_DATE: &str = env!("CASMI_BUILD_DATE");

    pub const BUILD_TIME: &str = env!("CASMI_BUILD_TIME");
}

/// Value of an `--in` binding without `:=value`: read from the keyboard.
pub const KEYBOARD: &str = "<keyboard>";

/// Value of an `--out` binding without `:=value`: write to standard output.
pub const STDOUT: &str = "stream://stdout";

/// A `location:=value` binding from `--in` / `--out`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub location: String,
    pub value: String,
}

impl Binding {
    pub fn new(location: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            value: value.into(),
        }
    }
}

/// Configuration for execution limits
#[derive(Debug, Clone)]
pub struct LimitConfig {
    /// Maximum nesting of `call` during execution
    pub max_call_depth: usize,
    /// Maximum depth of an expression tree: parentheses and operator chains
    pub max_expr_depth: usize,
}

impl Default for LimitConfig {
    fn default() -> Self {
        Self {
            max_call_depth: 256,
            max_expr_depth: 256,
        }
    }
}

/// Everything one driver invocation hands to the pass factories.
#[derive(Debug, Clone, Default)]
pub struct RunConfig {
    /// The single input file
    pub input: Option<PathBuf>,
    /// `-o, --output`
    pub output: Option<PathBuf>,
    /// `--in` bindings, in command-line order
    pub inputs: Vec<Binding>,
    /// `--out` bindings, in command-line order
    pub outputs: Vec<Binding>,
    /// `--ast-parse-debug`
    pub ast_parse_debug: bool,
    /// Extra module search directories (`CASMI_PATH`)
    pub module_paths: Vec<PathBuf>,
    pub limits: LimitConfig,
}

impl RunConfig {
    /// Directories searched for imported modules: the input file's
    /// directory first, then `module_paths`.
    pub fn module_search_path(&self) -> Vec<PathBuf> {
        let mut dirs = Vec::new();
        if let Some(input) = &self.input {
            let dir = input
                .parent()
                .map(PathBuf::from)
                .unwrap_or_default();
            dirs.push(dir);
        }
        dirs.extend(self.module_paths.iter().cloned());
        dirs
    }
}
