//
// strings.rs
//
// Copyright (C) 2026 Posit Software, PBC. All rights reserved.
//
//

use std::path::Path;

/// Quote `value` as a double-quoted R string literal.
///
/// Escapes backslashes, quotes, and control characters, so the result always
/// parses as a single string token no matter what the value contains.
pub fn r_string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');

    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{{{:x}}}", c as u32)),
            c => out.push(c),
        }
    }

    out.push('"');
    out
}

/// Quote a path as an R string literal.
///
/// Backslashes become forward slashes first. R accepts `/` separators on
/// Windows, while `\` inside a double-quoted string would start an escape
/// sequence.
pub fn r_path_literal(path: &Path) -> String {
    let path = path.to_string_lossy().replace('\\', "/");
    r_string_literal(&path)
}
