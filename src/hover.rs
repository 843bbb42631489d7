//! Hover-driven growth of a balloon's inner node.

use crate::config::Expansible;
use crate::host::{Host, NodeId};
use crate::style::Style;
use std::time::Duration;

/// Size-derived properties of a round node of diameter `balloon_radius`, centered on its
/// container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeStyle {
    pub corner_radius: f64,
    pub margin: f64,
    pub width: f64,
    pub height: f64,
}

impl SizeStyle {
    pub fn for_radius(balloon_radius: f64) -> Self {
        Self {
            corner_radius: balloon_radius / 2.0,
            margin: -balloon_radius / 2.0,
            width: balloon_radius,
            height: balloon_radius,
        }
    }

    /// Pulls the node 1px further back to keep a configured border centered.
    pub fn bordered(mut self, bordered: bool) -> Self {
        if bordered {
            self.margin -= 1.0;
        }
        self
    }

    pub fn to_style(&self) -> Style {
        Style::new()
            .with("border-radius", self.corner_radius)
            .with("margin-left", self.margin)
            .with("margin-top", self.margin)
            .with("width", self.width)
            .with("height", self.height)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Expander {
    expansible: Expansible,
    duration: Duration,
    bordered: bool,
}

impl Expander {
    pub fn new(expansible: Expansible, duration: Duration) -> Self {
        Self {
            expansible,
            duration,
            bordered: false,
        }
    }

    pub fn with_border(mut self, bordered: bool) -> Self {
        self.bordered = bordered;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.expansible.delta().is_some()
    }

    /// Grows the node to `base_radius + delta`. Returns `false` when expansion is off.
    pub fn expand(&self, host: &dyn Host, node: NodeId, base_radius: f64) -> bool {
        let Some(delta) = self.expansible.delta() else {
            return false;
        };
        self.resize(host, node, base_radius + delta);
        true
    }

    /// Shrinks the node back to `base_radius`. Returns `false` when expansion is off.
    pub fn contract(&self, host: &dyn Host, node: NodeId, base_radius: f64) -> bool {
        if !self.is_enabled() {
            return false;
        }
        self.resize(host, node, base_radius);
        true
    }

    fn resize(&self, host: &dyn Host, node: NodeId, balloon_radius: f64) {
        // a half-finished expand must not compound with the next one
        host.stop(node);
        host.animate(
            node,
            &SizeStyle::for_radius(balloon_radius)
                .bordered(self.bordered)
                .to_style(),
            self.duration,
        );
    }
}
