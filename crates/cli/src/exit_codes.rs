//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Scripts rely on them, so treat them as part of the shell contract.
//!
//! | Code | Description                                         |
//! |------|-----------------------------------------------------|
//! | 0    | Success                                             |
//! | 1    | General error (unspecified)                         |
//! | 2    | CLI usage error (bad args, unreadable config file)  |
//! | 3    | Config failed to parse or validate                  |
//! | 4    | A source file could not be loaded                   |
//! | 5    | Aggregate code missing from the common-code join    |

use worldmix_recon::ReconError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing config file.
pub const EXIT_USAGE: u8 = 2;

/// Config is not valid TOML or fails validation.
pub const EXIT_INVALID_CONFIG: u8 = 3;

/// Metadata, overlay or dataset could not be read or has the wrong shape.
pub const EXIT_LOAD: u8 = 4;

/// Sanitized join did not contain the aggregate code.
pub const EXIT_SANITIZATION: u8 = 5;

/// Map an engine error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_INVALID_CONFIG,
        ReconError::Sanitization { .. } => EXIT_SANITIZATION,
        ReconError::OverlayLoad(_)
        | ReconError::Io(_)
        | ReconError::MissingColumn { .. }
        | ReconError::ValueParse { .. }
        | ReconError::DuplicateCode(_)
        | ReconError::DuplicateName(_)
        | ReconError::ReservedCode(_) => EXIT_LOAD,
        ReconError::NotFound { .. } | ReconError::NoMatch { .. } => EXIT_ERROR,
    }
}
