//! Support library for the lineage CLI binary.
//!
//! Exposes the command and logging modules so doctests and integration tests
//! can exercise the commands without forking a subprocess.

pub mod cli;
pub mod logging;
