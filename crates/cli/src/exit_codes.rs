//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                              |
//! |---------|------------------|------------------------------------------|
//! | 0       | Universal        | Success                                  |
//! | 1       | Universal        | General error (unspecified)              |
//! | 2       | Universal        | CLI usage error (bad args, missing file) |
//! | 3-9     | enrich           | File and config codes                    |
//! | 50-59   | fetch            | ESPN player pool connector               |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Enrich (3-9)
// =============================================================================

/// Cannot read or write a projection CSV, snapshot, or report file.
pub const EXIT_IO: u8 = 3;

/// Config file failed to parse or validate.
pub const EXIT_INVALID_CONFIG: u8 = 4;

// =============================================================================
// Fetch / adapter (50-59): external data source connectors
// =============================================================================

// 50 is reserved for unusable local credentials; ESPN cookies are optional.

/// Auth rejected by upstream (401/403).
pub const EXIT_FETCH_AUTH: u8 = 51;

/// Bad request or unknown league/season (400/404).
pub const EXIT_FETCH_VALIDATION: u8 = 52;

/// Rate limited after retries (429).
pub const EXIT_FETCH_RATE_LIMIT: u8 = 53;

/// Upstream error (5xx), malformed response, or network failure after retries.
pub const EXIT_FETCH_UPSTREAM: u8 = 54;
