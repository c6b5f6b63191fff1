//! Foundation types for cafe-swkbd.
//!
//! This crate holds the platform-agnostic vocabulary shared by every other
//! crate in the workspace: the software keyboard's enums and native argument
//! blocks, controller snapshots, window handles, emitted events,
//! configuration and error types.

pub mod config;
pub mod error;
pub mod event;
pub mod input;
pub mod swkbd;
pub mod window;
