//! Core types shared across bimdiff facilities
//!
//! This crate provides foundational types used by the error facility,
//! the logging facility and the comparison engine:
//!
//! - **Correlation types**: RequestId, TraceId, RequestContext
//! - **Schema constants**: Canonical field keys and event names

pub mod correlation;
pub mod schema;

pub use correlation::{RequestContext, RequestId, TraceId};
