//! Configuration read from environment variables.

use crate::diagnostics::DiagnosticLevel;

/// Interpret a string value such as "1" or "no" as a boolean.
///
/// Returns `None` if the value is not recognized.
pub fn str_as_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "t" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "f" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

/// Return whether a feature flag controlled by an environment variable is
/// enabled.
pub fn env_flag(name: &str, default: bool) -> bool {
    let Ok(value) = std::env::var(name) else {
        return default;
    };
    str_as_bool(&value).unwrap_or_else(|| {
        tracing::warn!(var = name, value = %value, "unrecognized boolean value");
        default
    })
}

/// Parse a diagnostic level name ("off", "warn" or "info").
pub fn parse_diagnostic_level(s: &str) -> Option<DiagnosticLevel> {
    match s.trim().to_ascii_lowercase().as_str() {
        "off" | "0" => Some(DiagnosticLevel::Off),
        "warn" => Some(DiagnosticLevel::Warn),
        "info" | "1" => Some(DiagnosticLevel::Info),
        _ => None,
    }
}

/// Return the diagnostic level configured by the `TESSERA_DIAGNOSTICS`
/// environment variable, defaulting to [`DiagnosticLevel::Off`].
pub fn diagnostic_level() -> DiagnosticLevel {
    let Ok(value) = std::env::var("TESSERA_DIAGNOSTICS") else {
        return DiagnosticLevel::Off;
    };
    parse_diagnostic_level(&value).unwrap_or_else(|| {
        tracing::warn!(value = %value, "unrecognized TESSERA_DIAGNOSTICS level");
        DiagnosticLevel::Off
    })
}
