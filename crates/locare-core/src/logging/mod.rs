//! Structured logging facility
//!
//! Single initialization point via `init(profile)` plus the canonical
//! operation macros (`log_op_start!`, `log_op_end!`, `log_op_error!`).
//! The engine layer owns boundary logging; lower layers use only
//! `tracing::debug!` for internal detail.

pub mod init;
pub mod macros;

pub use init::{init, Profile};
