//! CLI Exit Code Registry
//!
//! Single source of truth for `sheetmerge` exit codes.
//! Exit codes are part of the shell contract: scripts rely on them.
//!
//! | Code | Meaning                                                      |
//! |------|--------------------------------------------------------------|
//! | 0    | Success (output written)                                     |
//! | 1    | General error (unexpected failure inside the merge)          |
//! | 2    | Usage error (bad arguments, output would clobber an input)   |
//! | 3    | Configuration error (bad TOML, no pairs, missing column)     |
//! | 4    | I/O error (cannot read an input or write the output)         |
//! | 5    | No rows matched and `--require-match` was given              |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
/// clap exits with this code on its own parse errors.
pub const EXIT_USAGE: u8 = 2;

/// Config file unparseable, no match pairs, or a pair names a column that
/// is not in its table. Nothing is written.
pub const EXIT_CONFIG: u8 = 3;

/// Input file unreadable or in an unsupported format, or the output could
/// not be written.
pub const EXIT_IO: u8 = 4;

/// Merge succeeded and was written, but no primary row found a reference
/// row and `--require-match` was set.
pub const EXIT_NO_MATCHES: u8 = 5;
