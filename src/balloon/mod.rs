use crate::config::{BalloonSpec, Options};
use crate::events::Pointer;
use crate::host::{Host, NodeId, Reaction};
use crate::lifecycle::Lifecycle;
use strum::IntoEnumIterator;

pub mod model;
pub mod view;

pub use model::{BalloonEntity, BalloonNodes, Defaults, Placement, PlacementError, Registry};
pub use view::Anchor;

pub const FULL_OPACITY: f64 = 1.0;

/// Everything placement needs besides the registry itself.
pub struct Scene<'a> {
    pub host: &'a dyn Host,
    pub root: NodeId,
    pub options: &'a Options,
    /// Controller radius after auto-fit.
    pub radius: f64,
    /// Builds the reaction subscribed for balloon `index`.
    pub hover: &'a dyn Fn(usize, Pointer) -> Reaction,
}

impl Registry {
    /// Validates, renders and registers one balloon. Returns its index.
    pub fn place(
        &mut self,
        spec: &BalloonSpec,
        scene: &Scene<'_>,
        lifecycle: &Lifecycle,
    ) -> Result<usize, PlacementError> {
        let defaults = Defaults {
            radius: scene.radius,
            balloon_radius: scene.options.balloon_radius,
            opacity: scene.options.opacity,
        };
        let placement = self.resolve(spec, &defaults, lifecycle)?;
        let style = view::inner_style(scene.options, &placement, &spec.css);
        let nodes = view::render(scene.host, scene.root, scene.options, &placement, &style);

        for pointer in Pointer::iter() {
            scene
                .host
                .subscribe(nodes.inner, pointer, (scene.hover)(placement.index, pointer));
        }

        Ok(self.push(placement, style, nodes).index)
    }
}
