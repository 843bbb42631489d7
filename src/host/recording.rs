use super::{ClassName, Completion, Host, NodeId, Reaction, Size, Transition};
use crate::events::{Fade, Pointer};
use crate::style::Style;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum HostOp {
    Create { node: NodeId, class: ClassName },
    Append { parent: NodeId, child: NodeId },
    Style { node: NodeId, style: Style },
    Content { node: NodeId, content: String },
    Subscribe { node: NodeId, pointer: Pointer },
    Animate { node: NodeId, target: Style, duration: Duration },
    Fade { node: NodeId, fade: Fade, duration: Duration },
    Stop { node: NodeId },
}

#[derive(Default)]
struct Scene {
    next_id: u64,
    ops: Vec<HostOp>,
    classes: HashMap<NodeId, ClassName>,
    sizes: HashMap<NodeId, Size>,
    styles: HashMap<NodeId, Style>,
    contents: HashMap<NodeId, String>,
    children: HashMap<NodeId, Vec<NodeId>>,
    reactions: HashMap<(NodeId, Pointer), Vec<Reaction>>,
}

impl Scene {
    fn allocate(&mut self) -> NodeId {
        self.next_id += 1;
        NodeId::new(self.next_id)
    }
}

/// In-memory host: keeps the node tree and the final style of every node, completes
/// transitions immediately and logs every call in order.
#[derive(Default)]
pub struct RecordingHost {
    scene: Mutex<Scene>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a container node of the given size, not created through the controller.
    pub fn add_container(&self, size: Size) -> NodeId {
        let mut scene = self.scene.lock();
        let node = scene.allocate();
        scene.sizes.insert(node, size);
        node
    }

    pub fn ops(&self) -> Vec<HostOp> {
        self.scene.lock().ops.clone()
    }

    pub fn class(&self, node: NodeId) -> Option<ClassName> {
        self.scene.lock().classes.get(&node).cloned()
    }

    pub fn style(&self, node: NodeId) -> Style {
        self.scene.lock().styles.get(&node).cloned().unwrap_or_default()
    }

    pub fn content(&self, node: NodeId) -> Option<String> {
        self.scene.lock().contents.get(&node).cloned()
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.scene
            .lock()
            .children
            .get(&node)
            .cloned()
            .unwrap_or_default()
    }

    pub fn fades(&self) -> Vec<(NodeId, Fade)> {
        self.scene
            .lock()
            .ops
            .iter()
            .filter_map(|op| match op {
                HostOp::Fade { node, fade, .. } => Some((*node, *fade)),
                _ => None,
            })
            .collect()
    }

    /// Fires every reaction subscribed to `pointer` on `node`. Returns how many ran.
    pub fn dispatch(&self, node: NodeId, pointer: Pointer) -> usize {
        let reactions = self
            .scene
            .lock()
            .reactions
            .get(&(node, pointer))
            .cloned()
            .unwrap_or_default();

        reactions.iter().for_each(|reaction| reaction());
        reactions.len()
    }

    fn finish(&self) -> Transition {
        let (completion, transition): (Completion, Transition) = Transition::pair();
        completion.notify();
        transition
    }
}

impl Host for RecordingHost {
    fn create_node(&self, class: &ClassName) -> NodeId {
        let mut scene = self.scene.lock();
        let node = scene.allocate();
        scene.classes.insert(node, class.clone());
        scene.ops.push(HostOp::Create {
            node,
            class: class.clone(),
        });
        node
    }

    fn append(&self, parent: NodeId, child: NodeId) {
        let mut scene = self.scene.lock();
        scene.children.entry(parent).or_default().push(child);
        scene.ops.push(HostOp::Append { parent, child });
    }

    fn measure(&self, node: NodeId) -> Size {
        self.scene
            .lock()
            .sizes
            .get(&node)
            .copied()
            .unwrap_or_default()
    }

    fn apply_style(&self, node: NodeId, style: &Style) {
        let mut scene = self.scene.lock();
        scene.styles.entry(node).or_default().merge(style);
        scene.ops.push(HostOp::Style {
            node,
            style: style.clone(),
        });
    }

    fn set_content(&self, node: NodeId, content: &str) {
        let mut scene = self.scene.lock();
        scene.contents.insert(node, content.to_string());
        scene.ops.push(HostOp::Content {
            node,
            content: content.to_string(),
        });
    }

    fn subscribe(&self, node: NodeId, pointer: Pointer, reaction: Reaction) {
        let mut scene = self.scene.lock();
        scene
            .reactions
            .entry((node, pointer))
            .or_default()
            .push(reaction);
        scene.ops.push(HostOp::Subscribe { node, pointer });
    }

    fn animate(&self, node: NodeId, target: &Style, duration: Duration) -> Transition {
        {
            let mut scene = self.scene.lock();
            scene.styles.entry(node).or_default().merge(target);
            scene.ops.push(HostOp::Animate {
                node,
                target: target.clone(),
                duration,
            });
        }
        self.finish()
    }

    fn fade(&self, node: NodeId, fade: Fade, duration: Duration) -> Transition {
        {
            let mut scene = self.scene.lock();
            let display = match fade {
                Fade::In => "block",
                Fade::Out => "none",
            };
            scene.styles.entry(node).or_default().set("display", display);
            scene.ops.push(HostOp::Fade {
                node,
                fade,
                duration,
            });
        }
        self.finish()
    }

    fn stop(&self, node: NodeId) {
        self.scene.lock().ops.push(HostOp::Stop { node });
    }
}
