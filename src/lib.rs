//! Cascading failure simulation over a dependency Petri net.
//!
//! Records describing parent/child relationships are turned into a net with
//! [`build`]; [`cascade_remove`] then removes a set of failed components and
//! everything that can no longer be produced without them.

pub mod builder;
pub mod cascade;
pub mod config;
pub mod loader;
pub mod marking;
pub mod net;
pub mod options;
pub mod record;

pub use builder::{BuildError, build};
pub use cascade::{CascadeReport, cascade_remove};
pub use marking::{FireError, MarkingEngine};
pub use net::Net;
pub use record::{Record, RecordError, Relationship};
