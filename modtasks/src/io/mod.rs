//! I/O helpers: configuration, module lookup, metadata, and file mounts.

pub mod config;
pub mod metadata;
pub mod modules;
pub mod mounts;
