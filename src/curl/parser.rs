//! Best-effort translation of a pasted `curl` command into a [`RequestDescriptor`].
//!
//! Only the flags that shape a request are understood. Anything else is dropped so that
//! partially garbled input still yields a partial descriptor.

use crate::model::{Body, Header, HttpMethod, RequestDescriptor};
use thiserror::Error;

/// Conditions that make the whole command untranslatable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseFailure {
    #[error("unterminated {0} quote")]
    UnterminatedQuote(char),
}

/// Result of a lenient parse: always a descriptor, plus the failure if one occurred.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCurl {
    pub request: RequestDescriptor,
    pub failure: Option<ParseFailure>,
}

/// Flags whose argument is consumed and discarded.
const IGNORED_WITH_VALUE: &[&str] = &[
    "-u",
    "--user",
    "-o",
    "--output",
    "-m",
    "--max-time",
    "--connect-timeout",
];

/// Parses a curl command, falling back to the default descriptor on failure.
pub fn parse(command: &str) -> ParsedCurl {
    match try_parse(command) {
        Ok(request) => ParsedCurl {
            request,
            failure: None,
        },
        Err(failure) => {
            tracing::debug!(error = %failure, "Could not parse curl command");
            ParsedCurl {
                request: RequestDescriptor::default(),
                failure: Some(failure),
            }
        }
    }
}

/// Parses a curl command, reporting the first fatal problem.
pub fn try_parse(command: &str) -> Result<RequestDescriptor, ParseFailure> {
    let joined = command.replace("\\\r\n", " ").replace("\\\n", " ");
    let mut tokens = tokenize(joined.trim())?;

    if tokens
        .first()
        .is_some_and(|t| t.eq_ignore_ascii_case("curl"))
    {
        tokens.remove(0);
    }
    // A dangling continuation marker survives the join only at the very end.
    while tokens.last().is_some_and(|t| t.is_empty() || t == "\\") {
        tokens.pop();
    }

    let mut request = RequestDescriptor::default();
    let mut explicit_method = false;
    let mut url_seen = false;

    let mut iter = tokens.into_iter();
    while let Some(token) = iter.next() {
        match token.as_str() {
            "-X" | "--request" => {
                if let Some(value) = iter.next() {
                    explicit_method |= apply_method(&mut request, &value);
                }
            }
            "-H" | "--header" => {
                if let Some(value) = iter.next() {
                    if let Some((key, value)) = split_header(&value) {
                        request.headers.push(Header::new(key, value));
                    }
                }
            }
            "--url" => {
                if let Some(value) = iter.next() {
                    if !url_seen {
                        request.url = value;
                        url_seen = true;
                    }
                }
            }
            "-A" | "--user-agent" => {
                if let Some(value) = iter.next() {
                    request.headers.push(Header::new("User-Agent", value));
                }
            }
            "-e" | "--referer" => {
                if let Some(value) = iter.next() {
                    request.headers.push(Header::new("Referer", value));
                }
            }
            "-b" | "--cookie" => {
                if let Some(value) = iter.next() {
                    // A bare argument names a cookie jar file, not a cookie.
                    if value.contains('=') {
                        request.headers.push(Header::new("Cookie", value));
                    }
                }
            }
            "--oauth2-bearer" => {
                if let Some(value) = iter.next() {
                    request.auth_token = Some(value);
                }
            }
            "-L" => {}
            t if IGNORED_WITH_VALUE.contains(&t) => {
                iter.next();
            }
            t if t.starts_with("-X") && t.len() > 2 => {
                explicit_method |= apply_method(&mut request, &t[2..]);
            }
            t if t.starts_with("--location") => {}
            t if t.starts_with("--data") || t.starts_with("-d") => {
                if let Some(value) = iter.next() {
                    request.body = Some(Body::from_raw(&value));
                }
            }
            t if t.starts_with("http") => {
                if !url_seen {
                    request.url = t.to_string();
                    url_seen = true;
                }
            }
            _ => {}
        }
    }

    if request.body.is_some() && !explicit_method {
        request.method = HttpMethod::Post;
    }

    Ok(request)
}

/// Sets the method if `value` names a supported one. Unsupported methods are skipped and
/// the previous method is kept.
fn apply_method(request: &mut RequestDescriptor, value: &str) -> bool {
    match value.parse::<HttpMethod>() {
        Ok(method) => {
            request.method = method;
            true
        }
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring curl method");
            false
        }
    }
}

/// Splits `Key: value` on the first colon. Both sides must be non-empty.
fn split_header(raw: &str) -> Option<(String, String)> {
    let (key, value) = raw.split_once(':')?;
    let (key, value) = (key.trim(), value.trim());
    if key.is_empty() || value.is_empty() {
        return None;
    }
    Some((key.to_string(), value.to_string()))
}

/// Splits on unquoted whitespace, honouring shell quoting.
///
/// Quoted spans are atomic and lose their delimiters; adjacent segments join into one
/// token (`'a'\''b'` is `a'b`). Backslash escapes the next character outside single
/// quotes; inside double quotes it only escapes `"`, `\`, `$` and `` ` ``.
pub(crate) fn tokenize(input: &str) -> Result<Vec<String>, ParseFailure> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some('\''), '\'') => quote = None,
            (Some('\''), _) => current.push(c),
            (Some('"'), '"') => quote = None,
            (Some('"'), '\\') => match chars.peek() {
                Some(&next) if matches!(next, '"' | '\\' | '$' | '`') => {
                    current.push(next);
                    chars.next();
                }
                _ => current.push('\\'),
            },
            (Some(_), _) => current.push(c),
            (None, '\'' | '"') => {
                quote = Some(c);
                in_token = true;
            }
            (None, '\\') => {
                match chars.next() {
                    Some(next) => current.push(next),
                    None => current.push('\\'),
                }
                in_token = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            (None, _) => {
                current.push(c);
                in_token = true;
            }
        }
    }

    if let Some(q) = quote {
        return Err(ParseFailure::UnterminatedQuote(q));
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}
