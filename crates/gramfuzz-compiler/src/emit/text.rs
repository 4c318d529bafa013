//! Character-literal decoding shared by the atom handlers.
//!
//! ANTLR string literals and lexer character sets use their own small
//! escape grammar (`\n`, `\t`, `\\`, `\]`, `\-`, `\uXXXX`, ...). Two
//! different things need it decoded two different ways:
//!
//! - A `'...'` terminal's *source text* is pasted, quotes stripped but
//!   escapes untouched, straight into a single-quoted literal in the
//!   emitted source — ANTLR's escape syntax happens to be a subset of the
//!   target language's, so no re-escaping is needed.
//! - A character range or set's *bounds* need the actual code point, so
//!   those go through [`decode_one`].

/// Strips a leading/trailing `'` from a quoted literal's raw token text.
pub fn strip_quotes(raw: &str) -> &str {
    raw.strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .unwrap_or(raw)
}

/// Re-indents every line of a multi-line action/member body to `pad`,
/// leaving the first line bare since the caller already writes `pad`
/// immediately before the `{placeholder}` marker this text is substituted
/// into. Placeholder substitution is a verbatim string replace, not a
/// per-line operation, so a stored value that doesn't carry its own
/// indentation on lines after the first lands at column 0 once substituted.
pub fn reindent(content: &str, pad: &str) -> String {
    let mut out = String::with_capacity(content.len());
    for (i, line) in content.lines().enumerate() {
        if i > 0 {
            out.push('\n');
            out.push_str(pad);
        }
        out.push_str(line);
    }
    out
}

/// Decodes one character starting at `chars[i]`, returning the decoded
/// char and how many source chars it consumed.
fn decode_one(chars: &[char], i: usize) -> (char, usize) {
    if chars[i] == '\\' && i + 1 < chars.len() {
        match chars[i + 1] {
            'n' => ('\n', 2),
            't' => ('\t', 2),
            'r' => ('\r', 2),
            'b' => ('\u{8}', 2),
            'f' => ('\u{c}', 2),
            'u' if i + 6 <= chars.len() => {
                let hex: String = chars[i + 2..i + 6].iter().collect();
                match u32::from_str_radix(&hex, 16) {
                    Ok(cp) => (char::from_u32(cp).unwrap_or('\u{fffd}'), 6),
                    Err(_) => (chars[i + 1], 2),
                }
            }
            other => (other, 2),
        }
    } else {
        (chars[i], 1)
    }
}

/// The code point a bare char literal's bound denotes, e.g. `'a'` or
/// `'A'`. Mirrors the reference tool's narrower rule for range
/// bounds: only `\u` escapes are special-cased, everything else is taken
/// as a single already-literal character.
pub fn char_literal_codepoint(raw: &str) -> u32 {
    let inner = strip_quotes(raw);
    if let Some(hex) = inner.strip_prefix("\\u") {
        if let Ok(cp) = u32::from_str_radix(hex, 16) {
            return cp;
        }
    }
    inner.chars().next().map(|c| c as u32).unwrap_or(0)
}

/// The code point of the character immediately following the opening
/// quote, without resolving escapes — used for `current_start_range`
/// bookkeeping and negated single-literal sets, matching the reference
/// tool's raw (non-unescaping) first-character rule.
pub fn first_raw_char_codepoint(raw: &str) -> u32 {
    raw.chars().nth(1).map(|c| c as u32).unwrap_or(0)
}

/// Expands a lexer char-set body (the text between `[` and `]`, e.g.
/// `a-zA-Z_\-\]`) into half-open `(lo, hi)` code point intervals,
/// resolving `X-Y` runs into ranges and escapes into single characters.
pub fn lexer_charset_intervals(raw: &str) -> Vec<(u32, u32)> {
    let chars: Vec<char> = raw.chars().collect();
    let mut out = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let (c1, consumed1) = decode_one(&chars, i);
        i += consumed1;
        if i < chars.len() && chars[i] == '-' && i + 1 < chars.len() {
            let (c2, consumed2) = decode_one(&chars, i + 1);
            out.push((c1 as u32, c2 as u32 + 1));
            i += 1 + consumed2;
        } else {
            out.push((c1 as u32, c1 as u32 + 1));
        }
    }
    out
}

/// Rewrites `$name` references in an inline action block's raw text to
/// `local_ctx['name']`, matching the reference tool's rule for bare
/// (non-`::`-qualified) label references inside embedded actions. `$$` and
/// `$text`/`$start`/etc. aren't handled here — only the plain label form
/// the grammar's own `LabeledElement`s can produce.
pub fn rewrite_dollar_vars(raw: &str) -> String {
    let chars: Vec<char> = raw.chars().collect();
    let mut out = String::with_capacity(raw.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '$' && i + 1 < chars.len() && (chars[i + 1].is_alphabetic() || chars[i + 1] == '_') {
            let start = i + 1;
            let mut end = start;
            while end < chars.len() && (chars[end].is_alphanumeric() || chars[end] == '_') {
                end += 1;
            }
            let name: String = chars[start..end].iter().collect();
            out.push_str("local_ctx['");
            out.push_str(&name);
            out.push_str("']");
            i = end;
        } else {
            out.push(chars[i]);
            i += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_quotes() {
        assert_eq!(strip_quotes("'a'"), "a");
    }

    #[test]
    fn reindent_leaves_single_line_untouched() {
        assert_eq!(reindent("self.x = 1", "    "), "self.x = 1");
    }

    #[test]
    fn reindent_prefixes_every_line_after_the_first() {
        assert_eq!(
            reindent("if True:\n    self.x = 1\n    self.y = 2", "    "),
            "if True:\n        self.x = 1\n        self.y = 2"
        );
    }

    #[test]
    fn codepoint_of_plain_char() {
        assert_eq!(char_literal_codepoint("'a'"), b'a' as u32);
    }

    #[test]
    fn codepoint_of_unicode_escape() {
        assert_eq!(char_literal_codepoint("'\\u0041'"), 0x41);
    }

    #[test]
    fn charset_expands_plain_range() {
        assert_eq!(
            lexer_charset_intervals("a-zA-Z_"),
            vec![(b'a' as u32, b'z' as u32 + 1), (b'A' as u32, b'Z' as u32 + 1), (b'_' as u32, b'_' as u32 + 1)]
        );
    }

    #[test]
    fn charset_expands_single_chars_and_escapes() {
        assert_eq!(
            lexer_charset_intervals("\\n\\t "),
            vec![(b'\n' as u32, b'\n' as u32 + 1), (b'\t' as u32, b'\t' as u32 + 1), (b' ' as u32, b' ' as u32 + 1)]
        );
    }

    #[test]
    fn rewrites_bare_dollar_vars() {
        assert_eq!(rewrite_dollar_vars("$x.text"), "local_ctx['x'].text");
    }

    #[test]
    fn leaves_text_without_dollars_untouched() {
        assert_eq!(rewrite_dollar_vars("foo(1, 2)"), "foo(1, 2)");
    }

    #[test]
    fn rewrites_multiple_vars_in_one_block() {
        assert_eq!(
            rewrite_dollar_vars("a = $x + $y"),
            "a = local_ctx['x'] + local_ctx['y']"
        );
    }
}
