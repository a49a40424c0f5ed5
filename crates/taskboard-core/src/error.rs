use std::fmt;

/// Machine-readable error codes surfaced by the CLI and in JSON output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    SeedNotFound,
    SeedMalformed,
    ConfigParseError,
    TaskNotFound,
    InvalidEnumValue,
    InvalidTimestamp,
    ValidationFailed,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::SeedNotFound => "E1001",
            Self::SeedMalformed => "E1002",
            Self::ConfigParseError => "E1003",
            Self::TaskNotFound => "E2001",
            Self::InvalidEnumValue => "E2002",
            Self::InvalidTimestamp => "E2003",
            Self::ValidationFailed => "E2004",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::SeedNotFound => "Seed file not found",
            Self::SeedMalformed => "Seed file is malformed",
            Self::ConfigParseError => "Config file parse error",
            Self::TaskNotFound => "Task not found",
            Self::InvalidEnumValue => "Invalid status/priority/rule value",
            Self::InvalidTimestamp => "Invalid timestamp",
            Self::ValidationFailed => "Task failed validation",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint for the person at the terminal.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::SeedNotFound => {
                Some("Pass --seed, set TASKBOARD_SEED, or set [seed] path in taskboard.toml.")
            }
            Self::SeedMalformed => {
                Some("Check that every record has exactly the documented fields and types.")
            }
            Self::ConfigParseError => Some("Fix syntax in taskboard.toml and retry."),
            Self::TaskNotFound => Some("Run `tb list` to see known task ids."),
            Self::InvalidEnumValue => {
                Some("Use one of the documented status, priority or rule names.")
            }
            Self::InvalidTimestamp => Some("Use ISO-8601, e.g. 2024-01-31T00:00:00."),
            Self::ValidationFailed => None,
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
