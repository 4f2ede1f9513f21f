//! Decoding of string escape sequences.

use std::borrow::Cow;
use std::iter::Enumerate;
use std::str::Chars;

use crate::error::ParseError;
use crate::lexer::Token;

/// Decodes the raw text of a string token.
///
/// Text without a backslash is borrowed as is. Errors are located at the
/// offending backslash, assuming the string does not span lines.
pub(crate) fn unescape<'a>(token: &Token<'a>) -> Result<Cow<'a, str>, ParseError> {
    let raw = token.text;
    if !raw.contains('\\') {
        return Ok(Cow::Borrowed(raw));
    }

    let fail = |offset: usize, message: String| {
        // +1 steps over the opening quote.
        ParseError::new(token.line, token.column + 1 + offset, message)
    };

    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().enumerate();
    while let Some((offset, c)) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some((_, escape)) = chars.next() else {
            return Err(fail(offset, "incomplete escape sequence".into()));
        };
        let decoded = match escape {
            '"' => '"',
            '\\' => '\\',
            '/' => '/',
            'b' => '\u{08}',
            'f' => '\u{0c}',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'u' => decode_unicode(&mut chars).map_err(|message| fail(offset, message))?,
            other => return Err(fail(offset, format!("invalid escape sequence '\\{other}'"))),
        };
        out.push(decoded);
    }
    Ok(Cow::Owned(out))
}

fn decode_unicode(chars: &mut Enumerate<Chars<'_>>) -> Result<char, String> {
    let high = read_hex4(chars)?;
    let code = match high {
        0xD800..=0xDBFF => {
            let follows = matches!(chars.next(), Some((_, '\\')))
                && matches!(chars.next(), Some((_, 'u')));
            if !follows {
                return Err("unpaired high surrogate".into());
            }
            let low = read_hex4(chars)?;
            if !(0xDC00..=0xDFFF).contains(&low) {
                return Err("invalid low surrogate".into());
            }
            0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
        }
        0xDC00..=0xDFFF => return Err("unpaired low surrogate".into()),
        code => code,
    };
    char::from_u32(code).ok_or_else(|| format!("invalid code point U+{code:04X}"))
}

fn read_hex4(chars: &mut Enumerate<Chars<'_>>) -> Result<u32, String> {
    let mut value = 0;
    for _ in 0..4 {
        let digit = chars
            .next()
            .and_then(|(_, c)| c.to_digit(16))
            .ok_or_else(|| "expected four hex digits after \\u".to_string())?;
        value = value * 16 + digit;
    }
    Ok(value)
}
