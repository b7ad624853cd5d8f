//! Discovery, validation, and resolution of tasks bundled in modules.
//!
//! A task is a named automation unit living in a module's `tasks/` directory,
//! backed by one or more executables and optional JSON metadata. The crate
//! keeps a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (naming rules, implementation
//!   selection). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (config, module lookup, metadata
//!   reads, file mount resolution).
//!
//! [`discovery`] and [`task`] compose both layers; [`show`] and [`validate`]
//! back the CLI commands.

pub mod core;
pub mod discovery;
pub mod error;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod show;
pub mod task;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod validate;
