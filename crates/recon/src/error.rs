use std::fmt;

/// Which registry index a failed lookup went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKind {
    Code,
    Name,
}

impl fmt::Display for LookupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code => write!(f, "country code"),
            Self::Name => write!(f, "country name"),
        }
    }
}

#[derive(Debug)]
pub enum ReconError {
    /// Registry (or dataset) lookup by an unknown code or name.
    NotFound { kind: LookupKind, key: String },
    /// The matcher exhausted every truncation without a containment hit.
    NoMatch { name: String },
    /// The aggregate code expected in a sanitized join was not there.
    Sanitization { code: String },
    /// Edge-case overlay table missing or malformed.
    OverlayLoad(String),
    /// Two registry rows share a code.
    DuplicateCode(String),
    /// Two registry rows share a long name.
    DuplicateName(String),
    /// A registry row tried to claim the unresolved sentinel.
    ReservedCode(String),
    /// Missing required column in an input table.
    MissingColumn { table: String, column: String },
    /// A cell that is neither numeric nor a missing token.
    ValueParse { column: String, value: String },
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error.
    ConfigValidation(String),
    /// IO error (file read, etc.).
    Io(String),
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { kind, key } => {
                write!(f, "{key} is not recognized as an available {kind}")
            }
            Self::NoMatch { name } => {
                write!(f, "could not match '{name}' to any official country")
            }
            Self::Sanitization { code } => {
                write!(f, "aggregate code '{code}' expected in common codes but absent")
            }
            Self::OverlayLoad(msg) => write!(f, "edge-case overlay load error: {msg}"),
            Self::DuplicateCode(code) => write!(f, "duplicate country code '{code}'"),
            Self::DuplicateName(name) => write!(f, "duplicate country name '{name}'"),
            Self::ReservedCode(code) => {
                write!(f, "country code '{code}' is reserved for unresolved names")
            }
            Self::MissingColumn { table, column } => {
                write!(f, "table '{table}': missing column '{column}'")
            }
            Self::ValueParse { column, value } => {
                write!(f, "column '{column}': cannot parse value '{value}'")
            }
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}
