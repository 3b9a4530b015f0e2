//! Operating system detection.

use serde::{Deserialize, Serialize};

/// The operating system family a command set targets.
///
/// Every platform that is neither Windows nor macOS is treated as Linux,
/// since the remaining Unix variants accept the same `lsof`/`ps`/`kill`
/// invocations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatingSystem {
    Windows,
    MacOs,
    Linux,
}

impl OperatingSystem {
    /// All supported operating systems.
    pub const ALL: [OperatingSystem; 3] = [
        OperatingSystem::Windows,
        OperatingSystem::MacOs,
        OperatingSystem::Linux,
    ];

    /// Detect the operating system this binary runs on.
    pub fn detect() -> Self {
        Self::from_platform(platform_name())
    }

    /// Classify a platform name by its first three characters.
    ///
    /// `"WIN..."` is Windows, `"DAR..."` is macOS, anything else is Linux.
    pub fn from_platform(name: &str) -> Self {
        let prefix: String = name
            .trim()
            .chars()
            .take(3)
            .flat_map(char::to_uppercase)
            .collect();

        match prefix.as_str() {
            "WIN" => OperatingSystem::Windows,
            "DAR" => OperatingSystem::MacOs,
            _ => OperatingSystem::Linux,
        }
    }

    /// Lowercase identifier (`windows`, `macos`, `linux`).
    pub fn as_str(&self) -> &'static str {
        match self {
            OperatingSystem::Windows => "windows",
            OperatingSystem::MacOs => "macos",
            OperatingSystem::Linux => "linux",
        }
    }

    pub fn is_windows(&self) -> bool {
        matches!(self, OperatingSystem::Windows)
    }
}

impl std::fmt::Display for OperatingSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kernel-style platform name for the compile target.
fn platform_name() -> &'static str {
    match std::env::consts::OS {
        "macos" | "ios" => "Darwin",
        "windows" => "WINNT",
        other => other,
    }
}
