//! Core types shared across locare facilities
//!
//! This crate provides foundational types used by both the error and the
//! logging facilities:
//!
//! - **Correlation types**: RequestId, TraceId, RequestContext
//! - **Schema constants**: canonical field keys and event names for
//!   structured logging

pub mod correlation;
pub mod schema;

pub use correlation::{RequestContext, RequestId, TraceId};
