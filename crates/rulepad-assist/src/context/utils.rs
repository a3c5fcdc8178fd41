// Column helpers; all offsets are char columns, not byte offsets

/// Column of the first `#` on the line
pub fn comment_start(chars: &[char]) -> Option<usize> {
    chars.iter().position(|&ch| ch == '#')
}

/// Start of the non-whitespace run ending at `cursor`
pub fn word_start(chars: &[char], cursor: usize) -> usize {
    let mut start = cursor.min(chars.len());
    while start > 0 && !chars[start - 1].is_whitespace() {
        start -= 1;
    }
    start
}

/// End of the word starting at `start`, stopping at whitespace or a comment
pub fn word_end(chars: &[char], start: usize) -> usize {
    let limit = comment_start(chars).unwrap_or(chars.len()).max(start);
    let mut end = start;
    while end < limit && !chars[end].is_whitespace() {
        end += 1;
    }
    end
}

pub(crate) fn slice(chars: &[char], start: usize, end: usize) -> String {
    chars[start..end].iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_word_start() {
        let line = chars("host example.com");
        assert_eq!(word_start(&line, 16), 5);
        assert_eq!(word_start(&line, 5), 5);
        assert_eq!(word_start(&line, 3), 0);
        assert_eq!(word_start(&line, 99), 5);
    }

    #[test]
    fn test_word_end_stops_at_comment() {
        let line = chars("a proxy://x#note");
        assert_eq!(word_end(&line, 2), 11);
        let line = chars("a bb cc");
        assert_eq!(word_end(&line, 2), 4);
    }

    #[test]
    fn test_comment_start() {
        assert_eq!(comment_start(&chars("ab # c")), Some(3));
        assert_eq!(comment_start(&chars("abc")), None);
    }
}
