//! 解释器
//!
//! 在 `ir::Program` 上执行 init 规则。状态是位置名到值的映射，
//! 每条规则使用独立的操作数栈。

use crate::ast::Literal;
use crate::error::RuntimeError;
use crate::ir::{Instruction, Program};
use std::collections::BTreeMap;
use std::fmt;

/// 运行时值
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Integer(i64),
    String(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(value) => write!(f, "{value}"),
            Value::String(text) => f.write_str(text),
        }
    }
}

impl From<&Literal> for Value {
    fn from(literal: &Literal) -> Self {
        match literal {
            Literal::Integer(value) => Value::Integer(*value),
            Literal::String(text) => Value::String(text.clone()),
        }
    }
}

/// 执行机
pub struct Machine<'p> {
    program: &'p Program,
    /// 位置状态
    state: BTreeMap<String, Value>,
    /// 最大调用深度
    max_call_depth: usize,
    /// 当前调用深度
    depth: usize,
}

impl<'p> Machine<'p> {
    /// 创建执行机，所有位置取初始值
    pub fn new(program: &'p Program, max_call_depth: usize) -> Self {
        let state = program
            .locations
            .iter()
            .map(|location| (location.name.clone(), Value::from(&location.initial)))
            .collect();
        Self {
            program,
            state,
            max_call_depth,
            depth: 0,
        }
    }

    pub fn get(&self, location: &str) -> Option<&Value> {
        self.state.get(location)
    }

    /// 覆盖一个位置的值。文本按位置的类型解释。
    pub fn set_from_str(&mut self, location: &str, text: &str) -> Result<(), RuntimeError> {
        let slot = self
            .state
            .get_mut(location)
            .ok_or_else(|| RuntimeError::UnknownLocation(location.to_string()))?;
        *slot = match *slot {
            Value::Integer(_) => {
                let value = text.trim().parse::<i64>().map_err(|_| RuntimeError::Type {
                    rule: "<input>".to_string(),
                    message: format!("'{text}' is not an integer value for '{location}'"),
                })?;
                Value::Integer(value)
            }
            Value::String(_) => Value::String(text.to_string()),
        };
        Ok(())
    }

    /// 执行 init 规则，`print` 的输出交给 `print`
    pub fn run(&mut self, print: &mut dyn FnMut(&Value)) -> Result<(), RuntimeError> {
        let init = self.program.init.clone();
        self.call(&init, print)
    }

    fn call(&mut self, name: &str, print: &mut dyn FnMut(&Value)) -> Result<(), RuntimeError> {
        let program = self.program;
        let rule = program
            .rule(name)
            .ok_or_else(|| RuntimeError::UnknownRule(name.to_string()))?;

        self.depth += 1;
        if self.depth > self.max_call_depth {
            self.depth -= 1;
            return Err(RuntimeError::CallDepth {
                rule: name.to_string(),
                limit: self.max_call_depth,
            });
        }
        let result = self.execute(name, &rule.code, print);
        self.depth -= 1;
        result
    }

    fn execute(
        &mut self,
        rule: &str,
        code: &[Instruction],
        print: &mut dyn FnMut(&Value),
    ) -> Result<(), RuntimeError> {
        let mut stack: Vec<Value> = Vec::new();
        let underflow = || RuntimeError::StackUnderflow(rule.to_string());

        for instruction in code {
            match instruction {
                Instruction::PushInt(value) => stack.push(Value::Integer(*value)),
                Instruction::PushStr(text) => stack.push(Value::String(text.clone())),
                Instruction::Load(name) => {
                    let value = self
                        .state
                        .get(name)
                        .cloned()
                        .ok_or_else(|| RuntimeError::UnknownLocation(name.clone()))?;
                    stack.push(value);
                }
                Instruction::Store(name) => {
                    let value = stack.pop().ok_or_else(underflow)?;
                    let slot = self
                        .state
                        .get_mut(name)
                        .ok_or_else(|| RuntimeError::UnknownLocation(name.clone()))?;
                    *slot = value;
                }
                Instruction::Add | Instruction::Sub => {
                    let rhs = stack.pop().ok_or_else(underflow)?;
                    let lhs = stack.pop().ok_or_else(underflow)?;
                    let (Value::Integer(a), Value::Integer(b)) = (&lhs, &rhs) else {
                        return Err(RuntimeError::Type {
                            rule: rule.to_string(),
                            message: format!("arithmetic on '{lhs}' and '{rhs}'"),
                        });
                    };
                    let result = if *instruction == Instruction::Add {
                        a.checked_add(*b)
                    } else {
                        a.checked_sub(*b)
                    };
                    let result = result.ok_or_else(|| RuntimeError::Overflow {
                        rule: rule.to_string(),
                    })?;
                    stack.push(Value::Integer(result));
                }
                Instruction::Print => {
                    let value = stack.pop().ok_or_else(underflow)?;
                    print(&value);
                }
                Instruction::Call(target) => self.call(target, print)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{check, ir, parse};

    fn program(source: &str) -> Program {
        ir::lower(&check(&parse("test", source).unwrap()).unwrap())
    }

    fn run(program: &Program, depth: usize) -> (Result<(), RuntimeError>, Vec<String>) {
        let mut machine = Machine::new(program, depth);
        let mut printed = Vec::new();
        let result = machine.run(&mut |value| printed.push(value.to_string()));
        (result, printed)
    }

    #[test]
    fn test_run_prints_and_updates() {
        let program = program(
            "init main\nfunction n = 40\nfunction s = \"n is\"\nrule main = { n := n + 3 - 1 print s print n }",
        );
        let mut machine = Machine::new(&program, 8);
        let mut printed = Vec::new();
        machine
            .run(&mut |value| printed.push(value.to_string()))
            .unwrap();
        assert_eq!(printed, vec!["n is", "42"]);
        assert_eq!(machine.get("n"), Some(&Value::Integer(42)));
    }

    #[test]
    fn test_input_override() {
        let program = program("init main\nfunction n = 1\nrule main = { print n + 1 }");
        let mut machine = Machine::new(&program, 8);
        machine.set_from_str("n", "9").unwrap();
        let mut printed = Vec::new();
        machine
            .run(&mut |value| printed.push(value.to_string()))
            .unwrap();
        assert_eq!(printed, vec!["10"]);

        assert!(matches!(
            machine.set_from_str("n", "nine"),
            Err(RuntimeError::Type { .. })
        ));
        assert_eq!(
            machine.set_from_str("missing", "1"),
            Err(RuntimeError::UnknownLocation("missing".into()))
        );
    }

    #[test]
    fn test_call_depth_limit() {
        let program = program("init main\nrule main = { call main }");
        let (result, _) = run(&program, 16);
        assert_eq!(
            result,
            Err(RuntimeError::CallDepth {
                rule: "main".into(),
                limit: 16
            })
        );
    }

    #[test]
    fn test_overflow() {
        let program =
            program("init main\nfunction n = 9223372036854775807\nrule main = { n := n + 1 }");
        let (result, _) = run(&program, 8);
        assert_eq!(
            result,
            Err(RuntimeError::Overflow {
                rule: "main".into()
            })
        );
    }

    #[test]
    fn test_nested_calls() {
        let program = program(
            "init main\nrule main = { print 1 call inner print 3 }\nrule inner = { print 2 }",
        );
        let (result, printed) = run(&program, 2);
        assert!(result.is_ok());
        assert_eq!(printed, vec!["1", "2", "3"]);
    }
}
