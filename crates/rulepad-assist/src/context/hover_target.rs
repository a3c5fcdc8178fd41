use super::utils::{comment_start, slice};
use regex::Regex;
use std::sync::OnceLock;

fn protocol_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"^([^\s:]+)://").expect("Invalid regex"))
}

/// Rule name found under the cursor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoverTarget {
    /// `@name`, `%name...`, or the protocol name before `://`
    pub name: String,
    /// The whole word, for tooltip titles
    pub word: String,
    pub start: usize,
    pub end: usize,
}

/// Find the help name for the word surrounding `cursor`
///
/// Comments and trailing whitespace are ignored. Only `@`/`%` words and
/// words shaped like `name://...` produce a target.
pub fn hover_target(line: &str, cursor: usize) -> Option<HoverTarget> {
    let mut chars: Vec<char> = line.chars().collect();
    match comment_start(&chars) {
        Some(index) => chars.truncate(index),
        None => {
            while chars.last().is_some_and(|ch| ch.is_whitespace()) {
                chars.pop();
            }
        }
    }

    if cursor > chars.len() {
        return None;
    }

    let mut start = cursor;
    while start > 0 && !chars[start - 1].is_whitespace() {
        start -= 1;
    }
    let mut end = cursor;
    while end < chars.len() && !chars[end].is_whitespace() {
        end += 1;
    }
    if start == end {
        return None;
    }

    let word = slice(&chars, start, end);
    let name = if word.starts_with('@') || word.starts_with('%') {
        word.clone()
    } else {
        protocol_regex().captures(&word)?[1].to_string()
    };

    Some(HoverTarget {
        name,
        word,
        start,
        end,
    })
}
