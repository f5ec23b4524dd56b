//! Extra egress port list parsing

use crate::config::{ConfigError, ConfigResult};

/// Parse a port list such as `"8080, 9090  22"`
///
/// Tokens are separated by any run of commas and/or ASCII whitespace (space,
/// tab, newline, vertical tab, form feed, carriage return). Other Unicode
/// spaces such as U+00A0 are part of a token and make it invalid. Absent or
/// blank input is an empty list. A token that is not a base-10 integer fails
/// the whole parse; malformed ports are never dropped silently.
pub fn parse_ports(value: Option<&str>) -> ConfigResult<Vec<i32>> {
    let Some(value) = value else {
        return Ok(Vec::new());
    };

    value
        .split(is_separator)
        .filter(|token| !token.is_empty())
        .map(|token| {
            token.parse::<i32>().map_err(|source| ConfigError::InvalidPort {
                token: token.to_string(),
                source,
            })
        })
        .collect()
}

fn is_separator(c: char) -> bool {
    matches!(c, ',' | ' ' | '\t' | '\n' | '\x0B' | '\x0C' | '\r')
}
