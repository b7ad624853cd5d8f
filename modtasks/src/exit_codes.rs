//! Stable exit codes for `modtasks` commands.

/// Command succeeded and every inspected task is valid.
pub const OK: i32 = 0;
/// A task, its metadata, or the configuration is invalid.
pub const INVALID: i32 = 1;
/// The requested module or task does not exist.
pub const NOT_FOUND: i32 = 2;
