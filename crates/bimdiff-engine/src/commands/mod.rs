//! Command orchestration layer.
//!
//! Coordinates snapshot fetching, core comparison and notification.

pub mod compare;
