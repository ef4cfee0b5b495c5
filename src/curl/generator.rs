//! Reconstructs a shell-ready curl command from a [`RequestDescriptor`].

use crate::model::RequestDescriptor;

/// Formats the descriptor as a single-line curl command.
///
/// The bearer token is emitted as an `Authorization` header so the command reproduces
/// exactly what the forwarder would send.
pub fn to_curl(request: &RequestDescriptor) -> String {
    let mut parts = vec![
        "curl".to_string(),
        format!("-X {}", request.method),
        single_quote(&request.url),
    ];

    for header in request.outbound_headers() {
        parts.push(format!(
            "-H {}",
            double_quote(&format!("{}: {}", header.key, header.value))
        ));
    }

    if let Some(body) = request.body.as_ref().filter(|b| !b.is_empty()) {
        parts.push(format!("-d {}", single_quote(&body.to_wire())));
    }

    parts.join(" ")
}

fn single_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r#"'\''"#))
}

fn double_quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        if matches!(c, '"' | '\\' | '$' | '`') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}
