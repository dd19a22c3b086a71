//! Command grammar: `<prefix><path>[?field][$v=value][$bo=offset][$extra=token]`.

use regex::Regex;
use std::sync::LazyLock;

pub const CMD_PREFIX: &str = "/";
pub const CMD_EXIT: &str = "/exit";
/// Cancel token; the rest of the command is the path to return to, e.g. `/cancel/items#0`.
pub const CMD_CANCEL: &str = "/cancel";

pub const OFFSET_MARK: &str = "$bo=";
pub const EXTRA_MARK: &str = "$extra=";
pub const VALUE_MARK: &str = "$v=";
pub const ADD_SUFFIX: &str = "$add";
pub const DELETE_SUFFIX: &str = "$delete";
pub const EXTRA_REFRESH: &str = "refresh";

static OFFSET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<path>.+?)\$bo=(?P<offset>\d+)$").unwrap());

/// A raw command split into its routable path and modifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub path: String,
    pub offset: Option<usize>,
    pub extra: Option<String>,
}

impl ParsedCommand {
    pub fn parse(raw: &str) -> Self {
        let (rest, extra) = match raw.split_once(EXTRA_MARK) {
            Some((rest, extra)) => (rest, Some(extra.to_string())),
            None => (raw, None),
        };
        match OFFSET_RE.captures(rest) {
            Some(caps) => Self {
                path: caps["path"].to_string(),
                offset: caps["offset"].parse().ok(),
                extra,
            },
            None => Self {
                path: rest.to_string(),
                offset: None,
                extra,
            },
        }
    }

    pub fn is_refresh(&self) -> bool {
        self.extra.as_deref() == Some(EXTRA_REFRESH)
    }
}

pub fn offset_command(command: &str, offset: usize) -> String {
    format!("{}{}{}", command, OFFSET_MARK, offset)
}

pub fn extra_command(command: &str, token: &str) -> String {
    format!("{}{}{}", command, EXTRA_MARK, token)
}

pub fn cancel_command(return_to: &str) -> String {
    format!("{}{}", CMD_CANCEL, return_to)
}

pub(crate) fn section_command(key: &str) -> String {
    format!("{}{}", CMD_PREFIX, key)
}

pub(crate) fn item_command(section: &str, index: usize) -> String {
    format!("{}#{}", section, index)
}

pub(crate) fn field_command(holder: &str, key: &str) -> String {
    format!("{}?{}", holder, key)
}

pub(crate) fn choice_command(field: &str, value: &str) -> String {
    format!("{}{}{}", field, VALUE_MARK, value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_command() {
        let parsed = ParsedCommand::parse("/items#0?label");
        assert_eq!(parsed.path, "/items#0?label");
        assert_eq!(parsed.offset, None);
        assert_eq!(parsed.extra, None);
    }

    #[test]
    fn test_parse_offset_and_extra() {
        let parsed = ParsedCommand::parse("/items$bo=20");
        assert_eq!(parsed.path, "/items");
        assert_eq!(parsed.offset, Some(20));

        let parsed = ParsedCommand::parse("/configuration?language$extra=refresh");
        assert_eq!(parsed.path, "/configuration?language");
        assert!(parsed.is_refresh());

        let parsed = ParsedCommand::parse("/items$bo=10$extra=refresh");
        assert_eq!(parsed.path, "/items");
        assert_eq!(parsed.offset, Some(10));
        assert!(parsed.is_refresh());
    }

    #[test]
    fn test_value_modifier_stays_in_path() {
        let parsed = ParsedCommand::parse("/items#1?type$v=bot");
        assert_eq!(parsed.path, "/items#1?type$v=bot");
    }

    #[test]
    fn test_offset_command() {
        assert_eq!(offset_command("/items", 0), "/items$bo=0");
        assert_eq!(offset_command("/items", 24), "/items$bo=24");
    }
}
