//! Input model: elements and the snapshots that group them.
//!
//! Snapshots are supplied by an external provider and treated as read-only.

pub mod element;
pub mod snapshot;
pub mod value;

pub use element::{Element, Properties};
pub use snapshot::ElementSnapshot;
pub use value::PropertyValue;
