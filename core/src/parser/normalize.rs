//! Field normalization applied to raw tool output.
//!
//! Each tool reports the same concepts differently (`LISTENING` vs
//! `LISTEN`, `1,024 K` vs `2.5`); these functions map them onto one form.

use crate::domain::OperatingSystem;

/// Longest command line kept on a port record.
pub const MAX_STORED_COMMAND_LINE: usize = 100;

pub fn protocol(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Normalize a connection state. lsof wraps it in parentheses.
pub fn state(raw: &str) -> String {
    let state = raw
        .trim()
        .trim_start_matches('(')
        .trim_end_matches(')')
        .to_uppercase();

    match state.as_str() {
        "LISTENING" => "LISTEN".to_string(),
        "ESTABLISHED" => "ESTAB".to_string(),
        "TIME_WAIT" => "TIME-WAIT".to_string(),
        "CLOSE_WAIT" => "CLOSE-WAIT".to_string(),
        "FIN_WAIT1" | "FIN_WAIT_1" => "FIN-WAIT-1".to_string(),
        "FIN_WAIT2" | "FIN_WAIT_2" => "FIN-WAIT-2".to_string(),
        "SYN_SENT" => "SYN-SENT".to_string(),
        "SYN_RECV" | "SYN_RECEIVED" => "SYN-RECV".to_string(),
        _ => state,
    }
}

/// Collapse the various spellings of "any address" to `*`.
pub fn address(raw: &str) -> String {
    let address = raw.trim();
    match address {
        "0.0.0.0:0" | "*:*" | "[::]:0" | "0.0.0.0" | "*" => "*".to_string(),
        _ => address.to_string(),
    }
}

/// Reduce a process name or path to its basename.
///
/// The `.exe` suffix is dropped on Windows only.
pub fn process_name(raw: &str, os: OperatingSystem) -> String {
    let trimmed = raw.trim();
    let base = trimmed.rsplit(['/', '\\']).next().unwrap_or(trimmed);

    if os.is_windows() {
        if let Some(stem) = strip_suffix_ignore_case(base, ".exe") {
            return stem.to_string();
        }
    }

    base.to_string()
}

fn strip_suffix_ignore_case<'a>(value: &'a str, suffix: &str) -> Option<&'a str> {
    let split = value.len().checked_sub(suffix.len())?;
    if !value.is_char_boundary(split) {
        return None;
    }
    let (stem, tail) = value.split_at(split);
    tail.eq_ignore_ascii_case(suffix).then_some(stem)
}

/// Normalize a CPU percentage ("1.5" → "1.5%", " 0.5 % " → "0.5%").
pub fn cpu(raw: &str) -> String {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() || compact.ends_with('%') || !is_number(&compact) {
        return compact;
    }
    format!("{}%", compact)
}

/// Normalize memory usage.
///
/// `"1,024 K"` becomes `"1024 KB"`, a bare number is a percentage, and
/// percentages lose their inner spaces.
pub fn memory(raw: &str) -> String {
    let trimmed = raw.trim();

    if let Some((number, unit)) = split_size(trimmed) {
        return format!("{} {}B", number.replace(',', ""), unit);
    }

    if is_number(trimmed) {
        return format!("{}%", trimmed);
    }

    if trimmed.contains('%') {
        return trimmed.chars().filter(|c| !c.is_whitespace()).collect();
    }

    trimmed.to_string()
}

/// Split "1,024 K" into ("1,024", 'K').
fn split_size(value: &str) -> Option<(&str, char)> {
    let unit = value.chars().last()?;
    if !matches!(unit, 'K' | 'M' | 'G' | 'T') {
        return None;
    }

    let number = value[..value.len() - 1].trim_end();
    let valid = !number.is_empty()
        && number.starts_with(|c: char| c.is_ascii_digit())
        && number.chars().all(|c| c.is_ascii_digit() || c == ',');

    valid.then_some((number, unit))
}

fn is_number(value: &str) -> bool {
    !value.is_empty() && value.parse::<f64>().is_ok()
}

/// Translate a `ps` STAT code into a readable status.
///
/// Unknown codes are returned unchanged.
pub fn status(raw: &str) -> String {
    let code = raw.trim();
    let base = match code.chars().next() {
        Some('R') => "Running",
        Some('S') => "Sleeping",
        Some('D') => "Waiting",
        Some('T') => "Stopped",
        Some('Z') => "Zombie",
        Some('I') => "Idle",
        _ => return code.to_string(),
    };

    let modifiers = &code[1..];
    if modifiers.contains('s') {
        format!("{} (session leader)", base)
    } else if modifiers.contains('+') {
        format!("{} (foreground)", base)
    } else {
        base.to_string()
    }
}

/// Trim a command line and cap it for storage on a port record.
pub fn command_line(raw: &str) -> String {
    truncate(raw.trim(), MAX_STORED_COMMAND_LINE)
}

/// Cut `value` to at most `width` characters, ending in `...` when cut.
pub fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }

    let keep = width.saturating_sub(3);
    let mut truncated: String = value.chars().take(keep).collect();
    truncated.push_str("...");
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol() {
        assert_eq!(protocol("tcp"), "TCP");
        assert_eq!(protocol(" udp "), "UDP");
    }

    #[test]
    fn test_state() {
        assert_eq!(state("LISTENING"), "LISTEN");
        assert_eq!(state("ESTABLISHED"), "ESTAB");
        assert_eq!(state("TIME_WAIT"), "TIME-WAIT");
        assert_eq!(state("(LISTEN)"), "LISTEN");
        assert_eq!(state("close_wait"), "CLOSE-WAIT");
        assert_eq!(state("syn_sent"), "SYN-SENT");
        assert_eq!(state(""), "");
    }

    #[test]
    fn test_address() {
        assert_eq!(address("0.0.0.0:0"), "*");
        assert_eq!(address("*:*"), "*");
        assert_eq!(address("[::]:0"), "*");
        assert_eq!(address("127.0.0.1:8080"), "127.0.0.1:8080");
        assert_eq!(address("[::1]:3000"), "[::1]:3000");
    }

    #[test]
    fn test_process_name() {
        assert_eq!(process_name("/usr/sbin/nginx", OperatingSystem::Linux), "nginx");
        assert_eq!(
            process_name("C:\\Windows\\System32\\svchost.exe", OperatingSystem::Windows),
            "svchost"
        );
        assert_eq!(process_name("NODE.EXE", OperatingSystem::Windows), "NODE");
        assert_eq!(process_name("wine.exe", OperatingSystem::Linux), "wine.exe");
        assert_eq!(process_name("  bash ", OperatingSystem::MacOs), "bash");
    }

    #[test]
    fn test_cpu() {
        assert_eq!(cpu("1.5"), "1.5%");
        assert_eq!(cpu("  0.5 %  "), "0.5%");
        assert_eq!(cpu("12%"), "12%");
        assert_eq!(cpu("N/A"), "N/A");
        assert_eq!(cpu(""), "");
    }

    #[test]
    fn test_memory() {
        assert_eq!(memory("1,024 K"), "1024 KB");
        assert_eq!(memory("45,000 K"), "45000 KB");
        assert_eq!(memory("2.5"), "2.5%");
        assert_eq!(memory("2.5 %"), "2.5%");
        assert_eq!(memory("100MB"), "100MB");
    }

    #[test]
    fn test_status() {
        assert_eq!(status("R"), "Running");
        assert_eq!(status("S"), "Sleeping");
        assert_eq!(status("Ss"), "Sleeping (session leader)");
        assert_eq!(status("R+"), "Running (foreground)");
        assert_eq!(status("S+"), "Sleeping (foreground)");
        assert_eq!(status("D"), "Waiting");
        assert_eq!(status("Z"), "Zombie");
        assert_eq!(status("Sl"), "Sleeping");
        assert_eq!(status("X"), "X");
        assert_eq!(status("unknown"), "unknown");
    }

    #[test]
    fn test_command_line_cap() {
        let long = "x".repeat(150);
        let stored = command_line(&long);
        assert_eq!(stored.chars().count(), 100);
        assert!(stored.ends_with("..."));
        assert_eq!(&stored[..97], &long[..97]);

        assert_eq!(command_line("  /usr/bin/node server.js "), "/usr/bin/node server.js");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 50), "short");
        assert_eq!(truncate(&"a".repeat(50), 50), "a".repeat(50));

        let cut = truncate(&"a".repeat(51), 50);
        assert_eq!(cut.len(), 50);
        assert!(cut.ends_with("..."));
    }
}
