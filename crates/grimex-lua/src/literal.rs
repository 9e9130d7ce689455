use full_moon::tokenizer::{StringLiteralQuoteType, TokenReference, TokenType};

/// Value of a string literal token, or `None` for any other token.
///
/// Long-bracket strings are taken verbatim apart from a newline directly after
/// the opening bracket, which Lua drops.
pub(crate) fn string_value(token: &TokenReference) -> Option<String> {
    match token.token_type() {
        TokenType::StringLiteral {
            literal,
            quote_type,
            ..
        } => Some(match quote_type {
            StringLiteralQuoteType::Brackets => {
                strip_leading_newline(&literal.to_string()).to_string()
            }
            _ => unescape(&literal.to_string()),
        }),
        _ => None,
    }
}

/// Whether [`string_value`] dropped a newline from the start of `token`.
pub(crate) fn skips_leading_newline(token: &TokenReference) -> bool {
    match token.token_type() {
        TokenType::StringLiteral {
            literal,
            quote_type: StringLiteralQuoteType::Brackets,
            ..
        } => literal.to_string().starts_with(['\n', '\r']),
        _ => false,
    }
}

/// `\r\n` and `\n\r` count as one newline.
fn strip_leading_newline(body: &str) -> &str {
    ["\r\n", "\n\r", "\n", "\r"]
        .into_iter()
        .find_map(|newline| body.strip_prefix(newline))
        .unwrap_or(body)
}

/// Resolves Lua 5.1 escape sequences in the body of a quoted string.
///
/// Unknown escapes are kept as written.
pub(crate) fn unescape(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        i += 1;
        if b != b'\\' {
            out.push(b);
            continue;
        }

        let Some(&next) = bytes.get(i) else {
            out.push(b'\\');
            break;
        };
        i += 1;
        match next {
            b'n' => out.push(b'\n'),
            b't' => out.push(b'\t'),
            b'r' => out.push(b'\r'),
            b'a' => out.push(0x07),
            b'b' => out.push(0x08),
            b'f' => out.push(0x0C),
            b'v' => out.push(0x0B),
            b'\\' | b'"' | b'\'' => out.push(next),
            b'\n' => out.push(b'\n'),
            b'\r' => {
                out.push(b'\n');
                if bytes.get(i) == Some(&b'\n') {
                    i += 1;
                }
            }
            b'0'..=b'9' => {
                let mut value = u32::from(next - b'0');
                let mut digits = 1;
                while digits < 3 {
                    match bytes.get(i) {
                        Some(&d) if d.is_ascii_digit() => {
                            value = value * 10 + u32::from(d - b'0');
                            i += 1;
                            digits += 1;
                        }
                        _ => break,
                    }
                }
                match u8::try_from(value) {
                    Ok(byte) => out.push(byte),
                    Err(_) => out.extend_from_slice(&bytes[i - digits - 1..i]),
                }
            }
            other => out.extend_from_slice(&[b'\\', other]),
        }
    }

    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_leading_newline() {
        assert_eq!(strip_leading_newline("\nx = 1\n"), "x = 1\n");
        assert_eq!(strip_leading_newline("\r\nx"), "x");
        assert_eq!(strip_leading_newline("\n\rx"), "x");
        assert_eq!(strip_leading_newline("\n\nx"), "\nx");
        assert_eq!(strip_leading_newline("x\n"), "x\n");
    }

    #[test]
    fn test_plain() {
        assert_eq!(unescape("mod_assets/a.tga"), "mod_assets/a.tga");
    }

    #[test]
    fn test_simple_escapes() {
        assert_eq!(unescape(r#"a\\b\"c\'d\ne"#), "a\\b\"c'd\ne");
        assert_eq!(unescape(r"mod_assets\\textures\\x.tga"), r"mod_assets\textures\x.tga");
    }

    #[test]
    fn test_decimal_escapes() {
        assert_eq!(unescape(r"\65\066\0677"), "ABC7");
        assert_eq!(unescape(r"\195\169"), "é");
    }

    #[test]
    fn test_out_of_range_decimal_kept() {
        assert_eq!(unescape(r"\999"), r"\999");
    }

    #[test]
    fn test_unknown_escape_kept() {
        assert_eq!(unescape(r"\q"), r"\q");
        assert_eq!(unescape("trailing\\"), "trailing\\");
    }

    #[test]
    fn test_escaped_newline() {
        assert_eq!(unescape("a\\\r\nb"), "a\nb");
    }
}
