//! Typed parameter values.

use std::fmt;

/// A value a [`Parameter`](crate::Parameter) can take.
///
/// `parse_param` turns the raw `--param` text into a value; defaults are
/// already typed and never go through it.
pub trait ParamValue: Clone + PartialEq + fmt::Debug + fmt::Display + 'static {
    fn parse_param(raw: &str) -> Result<Self, String>;
}

impl ParamValue for String {
    fn parse_param(raw: &str) -> Result<Self, String> {
        Ok(raw.to_string())
    }
}

impl ParamValue for bool {
    fn parse_param(raw: &str) -> Result<Self, String> {
        strtobool(raw)
    }
}

macro_rules! int_param_value {
    ($($ty:ty),*) => {
        $(
            impl ParamValue for $ty {
                fn parse_param(raw: &str) -> Result<Self, String> {
                    raw.trim().parse().map_err(|e: std::num::ParseIntError| e.to_string())
                }
            }
        )*
    };
}

int_param_value!(i32, i64, u32, u64, usize);

/// Loose boolean parsing for command-line values.
///
/// `y`, `yes`, `t`, `true`, `on`, `1` are true; `n`, `no`, `f`, `false`,
/// `off`, `0` are false (case-insensitive).
pub fn strtobool(raw: &str) -> Result<bool, String> {
    match raw.to_ascii_lowercase().as_str() {
        "y" | "yes" | "t" | "true" | "on" | "1" => Ok(true),
        "n" | "no" | "f" | "false" | "off" | "0" => Ok(false),
        _ => Err(format!("invalid truth value {raw:?}")),
    }
}
