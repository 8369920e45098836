//! Escape decoding for string literal tokens.
//!
//! Decoding happens once, when the parser builds a string `Literal` node.
//! The marker is `:`. Recognized forms:
//!
//! - `:(` hex `)` — the character at that hex code point
//! - `:)` — newline
//! - `:>` — tab
//! - `:"`, `:'`, `::` — that literal character
//!
//! Any other combination passes through unchanged, including interpolation
//! markers such as `:{name}` (interpolation is not a runtime feature; a
//! dynamically built string must never be re-decoded).

/// Marker character introducing an escape.
pub const ESCAPE_MARKER: char = ':';

/// Decode the escapes of an already-unquoted literal body.
pub fn decode_escapes(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    loop {
        let Some(pos) = rest.find(ESCAPE_MARKER) else {
            out.push_str(rest);
            return out;
        };
        out.push_str(&rest[..pos]);
        rest = &rest[pos + 1..];
        let Some(next) = rest.chars().next() else {
            // trailing marker, nothing to decode
            out.push(ESCAPE_MARKER);
            return out;
        };
        match next {
            '(' => {
                if let Some(close) = rest.find(')') {
                    let digits = &rest[1..close];
                    if let Some(decoded) = u32::from_str_radix(digits, 16)
                        .ok()
                        .and_then(char::from_u32)
                    {
                        out.push(decoded);
                        rest = &rest[close + 1..];
                        continue;
                    }
                }
                // unterminated or malformed code point: pass through
                out.push(ESCAPE_MARKER);
                out.push('(');
                rest = &rest[1..];
            }
            ')' => {
                out.push('\n');
                rest = &rest[1..];
            }
            '>' => {
                out.push('\t');
                rest = &rest[1..];
            }
            '"' | '\'' | ESCAPE_MARKER => {
                out.push(next);
                rest = &rest[next.len_utf8()..];
            }
            other => {
                out.push(ESCAPE_MARKER);
                out.push(other);
                rest = &rest[other.len_utf8()..];
            }
        }
    }
}

/// Strip the quote delimiters of a raw string token and decode its escapes.
pub fn decode_string_literal(token: &str) -> String {
    let mut body = token.chars();
    body.next();
    body.next_back();
    decode_escapes(body.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn plain_text_is_unchanged() {
        assert_eq!(decode_escapes("HELLO"), "HELLO");
    }

    #[test]
    fn quote_escapes() {
        assert_eq!(
            decode_escapes("I said :\"hello:\" to him"),
            "I said \"hello\" to him"
        );
        assert_eq!(decode_escapes(":'single:'"), "'single'");
    }

    #[test]
    fn code_point_escape() {
        assert_eq!(decode_escapes("I like :(03C0)"), "I like \u{03C0}");
        assert_eq!(decode_escapes(":(41):(42)"), "AB");
    }

    #[test]
    fn newline_tab_and_marker() {
        assert_eq!(decode_escapes("a:)b"), "a\nb");
        assert_eq!(decode_escapes("a:>b"), "a\tb");
        assert_eq!(decode_escapes("a::b"), "a:b");
    }

    #[test]
    fn unknown_escape_passes_through() {
        assert_eq!(decode_escapes("var is :{var}"), "var is :{var}");
        assert_eq!(decode_escapes(":x"), ":x");
    }

    #[test]
    fn malformed_code_point_passes_through() {
        assert_eq!(decode_escapes(":(zz)"), ":(zz)");
        assert_eq!(decode_escapes(":()"), ":()");
        assert_eq!(decode_escapes(":(12"), ":(12");
    }

    #[test]
    fn trailing_marker_is_kept() {
        assert_eq!(decode_escapes("abc:"), "abc:");
    }

    #[test]
    fn string_literal_strips_delimiters() {
        assert_eq!(decode_string_literal("\"HELLO\""), "HELLO");
        assert_eq!(decode_string_literal("'a:)b'"), "a\nb");
        assert_eq!(decode_string_literal("\"\""), "");
    }
}
