//! Boundary to the rendering environment.
//!
//! The controller never draws anything itself: it creates nodes, styles them, subscribes to
//! pointer reactions and starts timed transitions through a [`Host`].

use crate::events::{Fade, Pointer};
use crate::style::Style;
use derive_more::{AsRef, Deref, Display, From, Into};
use std::sync::Arc;
use std::time::Duration;

pub mod recording;

pub use recording::{HostOp, RecordingHost};

/// Opaque handle to a node owned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Into)]
pub struct NodeId(u64);

impl NodeId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// Classification tag attached to every node the controller creates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Deref, From, Into, AsRef)]
pub struct ClassName(String);

crate::impl_string_newtype!(ClassName);

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_square(&self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width == self.height
    }
}

/// Callback the host invokes when a subscribed pointer event fires.
pub type Reaction = Arc<dyn Fn() + Send + Sync>;

/// Sender half of a [`Transition`], held by the host until the animation settles.
#[derive(Debug)]
pub struct Completion(async_channel::Sender<()>);

impl Completion {
    pub fn notify(self) {
        let _ = self.0.try_send(());
    }
}

/// Completion signal for a timed transition started on the host.
#[derive(Debug)]
pub struct Transition(async_channel::Receiver<()>);

impl Transition {
    pub fn pair() -> (Completion, Transition) {
        let (tx, rx) = async_channel::bounded(1);
        (Completion(tx), Transition(rx))
    }

    /// Resolves once the host reports completion. Returns `false` if the host dropped the
    /// transition without finishing it (e.g. it was stopped).
    pub async fn finished(self) -> bool {
        self.0.recv().await.is_ok()
    }
}

pub trait Host: Send + Sync {
    /// Creates a detached node tagged with `class`.
    fn create_node(&self, class: &ClassName) -> NodeId;

    /// Attaches `child` as the last child of `parent`.
    fn append(&self, parent: NodeId, child: NodeId);

    /// Current rendered size of a node.
    fn measure(&self, node: NodeId) -> Size;

    /// Sets properties on a node, keeping the ones not mentioned.
    fn apply_style(&self, node: NodeId, style: &Style);

    fn set_content(&self, node: NodeId, content: &str);

    fn subscribe(&self, node: NodeId, pointer: Pointer, reaction: Reaction);

    /// Animates the node towards `target` over `duration`.
    fn animate(&self, node: NodeId, target: &Style, duration: Duration) -> Transition;

    fn fade(&self, node: NodeId, fade: Fade, duration: Duration) -> Transition;

    /// Cancels any transition in flight on the node, leaving it where it currently is.
    fn stop(&self, node: NodeId);
}
