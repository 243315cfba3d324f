//! CLI Exit Code Registry
//!
//! Single source of truth for every exit code. Scripts that run a check
//! after each visit rely on them.
//!
//! | Code | Meaning                                         |
//! |------|-------------------------------------------------|
//! | 0    | Success, every comparable check matched         |
//! | 1    | General error (unspecified)                     |
//! | 2    | Usage error (bad args, undetectable generation) |
//! | 3    | I/O error reading inputs or writing output      |
//! | 4    | Invalid inspection config or OCR file           |
//! | 5    | At least one check mismatched                   |
//! | 6    | The inspection form was not supplied            |

// =============================================================================
// Universal (0-3)
// =============================================================================

/// Success - command completed, nothing to report.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// Cannot read an input file or write the output.
pub const EXIT_IO: u8 = 3;

// =============================================================================
// Recon (4-6)
// =============================================================================

/// The inspection config, or a file it points to, failed to parse or validate.
pub const EXIT_INVALID_CONFIG: u8 = 4;

/// The run completed and found disagreeing sources.
pub const EXIT_RECON_MISMATCH: u8 = 5;

/// The run could not compare anything: no inspection form.
pub const EXIT_RECON_MISSING_SOURCE: u8 = 6;
