//! Shell escaping for values interpolated into command strings.

/// Characters that never need quoting in a POSIX shell word.
fn is_posix_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ',' | ':' | '/' | '@' | '+' | '=')
}

/// Quote a value as a single POSIX shell word.
///
/// Values made only of safe characters are returned unchanged; anything
/// else is wrapped in single quotes, with embedded quotes written as `'\''`.
pub fn posix(value: &str) -> String {
    if !value.is_empty() && value.chars().all(is_posix_safe) {
        return value.to_string();
    }

    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for c in value.chars() {
        if c == '\'' {
            quoted.push_str("'\\''");
        } else {
            quoted.push(c);
        }
    }
    quoted.push('\'');
    quoted
}

/// Prepare a value for use inside a double-quoted `cmd.exe` string.
///
/// Inside quotes `cmd` treats `& | < > ^` literally, but a stray `"` would
/// end the quoted section and `%` triggers variable expansion, so both are
/// dropped along with control characters.
pub fn windows_quoted(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, '"' | '%' | '!') && !c.is_control())
        .collect()
}

/// Escape a value used as a bare `cmd.exe` argument.
///
/// Metacharacters are caret-escaped; `"` and `%` are dropped.
pub fn windows_bare(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in windows_quoted(value).chars() {
        if matches!(c, '^' | '&' | '|' | '<' | '>' | '(' | ')') {
            escaped.push('^');
        }
        escaped.push(c);
    }
    escaped
}
