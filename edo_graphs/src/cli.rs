// Argument helpers shared by the `generate` and `layout` binaries.
//
// Both take an optional leading positional path followed by `--flag value`
// pairs. A flag given twice uses its first value; an unparseable value is a
// `ConfigError` naming the flag.

use crate::error::ConfigError;
use std::str::FromStr;

/// The first argument after the program name, unless it is a flag.
pub fn positional(args: &[String]) -> Option<&str> {
    args.get(1)
        .filter(|s| !s.starts_with("--"))
        .map(String::as_str)
}

/// The raw value following `flag`, if the flag is present.
pub fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

pub fn parse_flag<T: FromStr>(
    args: &[String],
    flag: &'static str,
) -> Result<Option<T>, ConfigError> {
    flag_value(args, flag)
        .map(|value| {
            value.parse().map_err(|_| ConfigError::Parse {
                field: flag,
                value: value.to_string(),
            })
        })
        .transpose()
}
