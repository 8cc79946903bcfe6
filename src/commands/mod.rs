//! Command handlers
//!
//! Each submodule exposes a `run` function that takes the parsed arguments,
//! prepares the project, and hands off to [`crate::operations`].

pub mod completions;
pub mod install;
pub mod lock;
pub mod uninstall;
pub mod update;
