//! CLI command handlers.

/// Rules file creation from the built-in set.
pub mod init;
/// File and directory scanning.
pub mod scan;

/// Convenience alias for command return types.
pub type Result<T = ()> = anyhow::Result<T>;
