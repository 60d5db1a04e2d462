//! Argument normalization and shell quoting.
//!
//! Arguments are passed through verbatim unless the caller opts in to
//! escaping by wrapping the argument in single quotes: `'a b'` becomes a
//! token the shell reads back as exactly `a b`, whatever the inner text
//! contains.

use std::fmt;

#[cfg(not(windows))]
use shell_quote::{QuoteRefExt, Sh};

/// Reasons an argument cannot be quoted for `cmd.exe`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuoteError {
    ContainsLineBreak,
}

impl fmt::Display for QuoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ContainsLineBreak => f.write_str(
                "arguments containing carriage returns or line feeds cannot be safely quoted",
            ),
        }
    }
}

impl std::error::Error for QuoteError {}

/// Characters stripped from both ends of every argument.
const TRIMMED: &[char] = &['\n', '\t', ' '];

/// Normalize a raw argument into a command-line token.
///
/// Returns an empty string when nothing is left after trimming.
pub fn quote_argument(raw: &str) -> String {
    let trimmed = raw.trim_matches(TRIMMED);

    let Some(rest) = trimmed.strip_prefix('\'') else {
        return trimmed.to_string();
    };

    // Drop exactly one trailing character, whatever it is.
    let mut chars = rest.chars();
    chars.next_back();
    escape(chars.as_str())
}

/// Quote `text` so the shell passes it through as a single literal word.
#[cfg(not(windows))]
pub fn escape(text: &str) -> String {
    let bytes: Vec<u8> = text.quoted(Sh);
    // Quoting valid UTF-8 only ever adds ASCII.
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Quote `text` for `cmd.exe`.
///
/// `cmd.exe` has no way to carry a line break inside an argument, so line
/// breaks are replaced by spaces.
#[cfg(windows)]
pub fn escape(text: &str) -> String {
    match quote_cmd(text) {
        Ok(quoted) => quoted,
        Err(err) => {
            tracing::warn!("{}; replacing line breaks with spaces", err);
            let flattened: String = text
                .chars()
                .map(|ch| if matches!(ch, '\n' | '\r') { ' ' } else { ch })
                .collect();
            quote_cmd(&flattened).unwrap_or(flattened)
        }
    }
}

/// Quote `arg` as one `cmd.exe` word.
///
/// Arguments without metacharacters are returned unchanged. Everything else
/// is wrapped in double quotes with `^` escapes, and `%` is doubled so no
/// variable expansion happens.
pub fn quote_cmd(arg: &str) -> Result<String, QuoteError> {
    if arg.chars().any(|ch| matches!(ch, '\n' | '\r')) {
        return Err(QuoteError::ContainsLineBreak);
    }

    if arg.is_empty() {
        return Ok("\"\"".to_owned());
    }

    let needs_quotes = arg.chars().any(|ch| {
        matches!(
            ch,
            ' ' | '\t' | '"' | '^' | '&' | '|' | '<' | '>' | '%' | '!'
        )
    });
    if !needs_quotes {
        return Ok(arg.to_owned());
    }

    let mut buf = String::with_capacity(arg.len() + 2);
    buf.push('"');
    for ch in arg.chars() {
        match ch {
            '"' | '^' | '&' | '|' | '<' | '>' | '!' => {
                buf.push('^');
                buf.push(ch);
            }
            '%' => buf.push_str("%%"),
            _ => buf.push(ch),
        }
    }
    buf.push('"');
    Ok(buf)
}
