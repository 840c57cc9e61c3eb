//! Parsing of `{$key}` placeholders inside config values.
//!
//! A placeholder is the literal `{$`, a key name, and a closing `}`. Text that
//! only looks like the start of a placeholder (`{$` with no closing brace, or
//! `{$}` with an empty name) is kept verbatim.
//!
//! ```
//! use pkgmeta::config::placeholder::{parse, Segment};
//!
//! let segments = parse("{$dir}/cache");
//! assert_eq!(segments, vec![Segment::Placeholder("dir"), Segment::Literal("/cache")]);
//! ```

const OPEN: &str = "{$";
const CLOSE: char = '}';

/// A piece of a parsed config value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Text copied through unchanged
    Literal(&'a str),
    /// Name of the key referenced by a `{$name}` token
    Placeholder(&'a str),
}

/// Split a raw value into literal and placeholder segments.
pub fn parse(input: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut rest = input;
    let mut literal_start = 0;
    let mut offset = 0;

    while let Some(open) = rest.find(OPEN) {
        let name_start = open + OPEN.len();
        let Some(close) = rest[name_start..].find(CLOSE) else {
            break;
        };
        let name = &rest[name_start..name_start + close];
        let token_end = name_start + close + 1;

        if name.is_empty() {
            // `{$}` is not a placeholder; continue scanning after it
            offset += token_end;
            rest = &rest[token_end..];
            continue;
        }

        let literal = &input[literal_start..offset + open];
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        segments.push(Segment::Placeholder(name));

        offset += token_end;
        literal_start = offset;
        rest = &rest[token_end..];
    }

    let tail = &input[literal_start..];
    if !tail.is_empty() {
        segments.push(Segment::Literal(tail));
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_text() {
        assert_eq!(parse("vendor/cache"), vec![Segment::Literal("vendor/cache")]);
    }

    #[test]
    fn test_parse_empty_input() {
        assert!(parse("").is_empty());
    }

    #[test]
    fn test_parse_placeholder_with_suffix() {
        assert_eq!(
            parse("{$dir}/packages.json"),
            vec![
                Segment::Placeholder("dir"),
                Segment::Literal("/packages.json")
            ]
        );
    }

    #[test]
    fn test_parse_multiple_placeholders() {
        assert_eq!(
            parse("a/{$dir}-{$cache}/b"),
            vec![
                Segment::Literal("a/"),
                Segment::Placeholder("dir"),
                Segment::Literal("-"),
                Segment::Placeholder("cache"),
                Segment::Literal("/b"),
            ]
        );
    }

    #[test]
    fn test_parse_adjacent_placeholders() {
        assert_eq!(
            parse("{$dir}{$cache}"),
            vec![Segment::Placeholder("dir"), Segment::Placeholder("cache")]
        );
    }

    #[test]
    fn test_parse_unclosed_is_literal() {
        assert_eq!(parse("{$dir/cache"), vec![Segment::Literal("{$dir/cache")]);
    }

    #[test]
    fn test_parse_empty_name_is_literal() {
        assert_eq!(
            parse("x{$}y{$dir}"),
            vec![Segment::Literal("x{$}y"), Segment::Placeholder("dir")]
        );
    }

    #[test]
    fn test_parse_plain_braces_untouched() {
        assert_eq!(parse("{dir}/$x"), vec![Segment::Literal("{dir}/$x")]);
    }
}
