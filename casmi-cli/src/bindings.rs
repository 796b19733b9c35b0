//! `--in` / `--out` binding syntax: `location[:=value]`

use casmi_config::Binding;
use thiserror::Error;

pub const SEPARATOR: &str = ":=";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    #[error("binding '{0}' contains more than one '{SEPARATOR}'")]
    TooManySeparators(String),

    #[error("binding '{0}' has an empty location")]
    EmptyLocation(String),

    #[error("binding '{0}' has an empty value")]
    EmptyValue(String),
}

/// Parse one binding; a bare location takes `default` as its value.
pub fn parse_binding(text: &str, default: &str) -> Result<Binding, BindingError> {
    let parts: Vec<&str> = text.split(SEPARATOR).collect();
    match parts.as_slice() {
        [location] if location.is_empty() => Err(BindingError::EmptyLocation(text.to_string())),
        [location] => Ok(Binding::new(*location, default)),
        [location, _] if location.is_empty() => {
            Err(BindingError::EmptyLocation(text.to_string()))
        }
        [_, value] if value.is_empty() => Err(BindingError::EmptyValue(text.to_string())),
        [location, value] => Ok(Binding::new(*location, *value)),
        _ => Err(BindingError::TooManySeparators(text.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use casmi_config::{KEYBOARD, STDOUT};

    #[test]
    fn test_explicit_value() {
        assert_eq!(
            parse_binding("n:=10", KEYBOARD).unwrap(),
            Binding::new("n", "10")
        );
        assert_eq!(
            parse_binding("n:=out/n.txt", STDOUT).unwrap(),
            Binding::new("n", "out/n.txt")
        );
    }

    #[test]
    fn test_bare_location_uses_default() {
        assert_eq!(parse_binding("n", KEYBOARD).unwrap().value, KEYBOARD);
        assert_eq!(parse_binding("n", STDOUT).unwrap().value, STDOUT);
    }

    #[test]
    fn test_malformed() {
        assert_eq!(
            parse_binding("a:=b:=c", STDOUT),
            Err(BindingError::TooManySeparators("a:=b:=c".into()))
        );
        assert_eq!(
            parse_binding(":=1", KEYBOARD),
            Err(BindingError::EmptyLocation(":=1".into()))
        );
        assert_eq!(
            parse_binding("", KEYBOARD),
            Err(BindingError::EmptyLocation(String::new()))
        );
        assert_eq!(
            parse_binding("x:=", KEYBOARD),
            Err(BindingError::EmptyValue("x:=".into()))
        );
    }

    #[test]
    fn test_error_message() {
        let err = parse_binding("a:=b:=c", STDOUT).unwrap_err();
        assert_eq!(err.to_string(), "binding 'a:=b:=c' contains more than one ':='");
    }
}
