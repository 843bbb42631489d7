//! Circular "balloon" markers placed around the center of a host container.
//!
//! A [`Controller`] measures its container, builds a few structural nodes through a
//! [`Host`], and places one balloon per [`BalloonSpec`] on a circle around the center.
//! Balloons can then be shown or hidden one after the other, rotated around the center,
//! and grow while the pointer is over them.

mod macros;

pub mod balloon;
pub mod config;
pub mod controller;
pub mod events;
pub mod geometry;
pub mod host;
pub mod hover;
pub mod lifecycle;
pub mod sequencer;
pub mod style;
pub mod sys;

pub use balloon::{Anchor, BalloonEntity, PlacementError};
pub use config::{BalloonSpec, ConfigError, ContentProvider, Expansible, Options, Prefix};
pub use controller::{Controller, InstanceCache, MemoryCache, create_controller};
pub use events::{Fade, Pointer};
pub use host::{Host, NodeId, RecordingHost, Size};
pub use lifecycle::LifecycleState;
pub use sequencer::{Sequence, SequenceError};
pub use style::{Style, StyleValue};
