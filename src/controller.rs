use crate::balloon::{Anchor, BalloonEntity, FULL_OPACITY, Registry, Scene, view};
use crate::config::Options;
use crate::events::{Fade, Pointer};
use crate::geometry;
use crate::host::{Host, NodeId, Reaction};
use crate::hover::Expander;
use crate::lifecycle::{Lifecycle, LifecycleState};
use crate::sequencer::{Liveness, Sequence, Sequencer};
use crate::style::Style;
use crate::sys::runtime;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;
use std::sync::Arc;

struct State {
    lifecycle: Lifecycle,
    registry: Registry,
    radius: f64,
    anchor: Option<Anchor>,
}

struct Inner {
    host: Arc<dyn Host>,
    parent: NodeId,
    options: Options,
    expander: Expander,
    sequencer: Sequencer,
    state: Mutex<State>,
}

impl Inner {
    fn hover(&self, index: usize, pointer: Pointer) {
        let (node, base_radius, rest_opacity) = {
            let mut state = self.state.lock();
            if !state.lifecycle.is_enabled() {
                return;
            }
            let Some(entity) = state.registry.get_mut(index) else {
                return;
            };
            if self.expander.is_enabled() {
                entity.expanded = pointer == Pointer::Enter;
            }
            (entity.nodes.inner, entity.balloon_radius, entity.rest_opacity)
        };

        if let Some(rest) = rest_opacity {
            let opacity = match pointer {
                Pointer::Enter => FULL_OPACITY,
                Pointer::Leave => rest,
            };
            self.host
                .apply_style(node, &Style::new().with("opacity", opacity));
        }

        let host = self.host.as_ref();
        match pointer {
            Pointer::Enter => self.expander.expand(host, node, base_radius),
            Pointer::Leave => self.expander.contract(host, node, base_radius),
        };
    }
}

/// Places balloons around the center of one host container and animates them.
///
/// Cloning is cheap and every clone drives the same balloons. Calls made in the wrong
/// lifecycle state are logged and ignored, so calls can always be chained.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<Inner>,
}

impl Controller {
    /// Builds an uninitialized controller for `parent`. Cascades run on the caller's Tokio
    /// runtime, or on a shared background one outside of any runtime.
    pub fn new(host: Arc<dyn Host>, parent: NodeId, options: Options) -> Self {
        let sequencer = Sequencer::new(
            runtime::handle(),
            host.clone(),
            options.timeout,
            options.fade,
        );
        let expander = Expander::new(options.expansible, options.timeout)
            .with_border(options.border.is_some());
        let state = State {
            lifecycle: Lifecycle::default(),
            registry: Registry::new(),
            radius: options.radius,
            anchor: None,
        };

        Self {
            inner: Arc::new(Inner {
                host,
                parent,
                options,
                expander,
                sequencer,
                state: Mutex::new(state),
            }),
        }
    }

    /// Builds the structural nodes, enables the controller and places every configured
    /// balloon. Does nothing the second time.
    pub fn init(&self) -> &Self {
        let autoshow = {
            let mut state = self.inner.state.lock();
            if state.lifecycle.is_initialized() {
                log::debug!("Controller on node {} already initialized", self.inner.parent);
                return self;
            }

            let host = self.inner.host.as_ref();
            let options = &self.inner.options;

            let size = host.measure(self.inner.parent);
            if size.is_square() {
                state.radius = size.width;
            }

            let mut anchor = view::build_anchor(host, self.inner.parent, &options.prefix, size);
            state.lifecycle.initialize();
            state.lifecycle.enable();

            if options.center {
                anchor.center = Some(view::build_center(
                    host,
                    anchor.root,
                    options,
                    state.radius,
                ));
            }
            state.anchor = Some(anchor);

            let hover = self.hover_reactions();
            let scene = Scene {
                host,
                root: anchor.root,
                options,
                radius: state.radius,
                hover: &hover,
            };
            let State {
                lifecycle,
                registry,
                ..
            } = &mut *state;

            for (position, spec) in options.balloons.iter().enumerate() {
                if let Err(e) = registry.place(spec, &scene, lifecycle) {
                    log::warn!("Skipping balloon #{}: {}", position, e);
                }
            }
            log::debug!(
                "Placed {} of {} balloon(s) on node {}",
                registry.len(),
                options.balloons.len(),
                self.inner.parent
            );

            options.autoshow
        };

        if autoshow {
            let _ = self.show();
        }
        self
    }

    pub fn enable(&self) -> &Self {
        let mut state = self.inner.state.lock();
        if !state.lifecycle.enable() {
            log::debug!("Enable ignored: controller is {}", state.lifecycle.state());
        }
        self
    }

    /// Refuses placement, cascades, rotation and hover reactions until enabled again.
    /// A running cascade stops at its next step.
    pub fn disable(&self) -> &Self {
        let mut state = self.inner.state.lock();
        if !state.lifecycle.disable() {
            log::debug!("Disable ignored: controller is {}", state.lifecycle.state());
        }
        self
    }

    pub fn state(&self) -> LifecycleState {
        self.inner.state.lock().lifecycle.state()
    }

    /// Orbit radius after the square-container auto-fit.
    pub fn radius(&self) -> f64 {
        self.inner.state.lock().radius
    }

    pub fn anchor(&self) -> Option<Anchor> {
        self.inner.state.lock().anchor
    }

    pub fn balloons(&self) -> Vec<BalloonEntity> {
        self.inner.state.lock().registry.iter().cloned().collect()
    }

    pub fn options(&self) -> &Options {
        &self.inner.options
    }

    /// Fades the balloons in one after the other, `timeout` apart.
    pub fn show(&self) -> Sequence {
        self.cascade(Fade::In)
    }

    /// Fades the balloons out one after the other, `timeout` apart.
    pub fn hide(&self) -> Sequence {
        self.cascade(Fade::Out)
    }

    pub fn show_now(&self) -> &Self {
        self.fire(Fade::In)
    }

    pub fn hide_now(&self) -> &Self {
        self.fire(Fade::Out)
    }

    /// Moves every balloon to its base angle plus `offset` degrees.
    ///
    /// Rotations do not accumulate: `rotate(30)` twice leaves the balloons 30 degrees from
    /// where they were placed.
    pub fn rotate(&self, offset: f64) -> &Self {
        if !offset.is_finite() {
            log::warn!("Rotation ignored: offset {} is not a finite number", offset);
            return self;
        }
        let offset = geometry::normalize_angle(offset);

        let targets: Vec<_> = {
            let state = self.inner.state.lock();
            if !state.lifecycle.is_enabled() {
                log::warn!("Rotation ignored: controller is {}", state.lifecycle.state());
                return self;
            }
            state
                .registry
                .iter()
                .map(|entity| {
                    let angle = entity.angle_degrees + offset;
                    (
                        entity.nodes,
                        angle,
                        geometry::polar_to_offset(entity.radius, angle),
                    )
                })
                .collect()
        };

        let options = &self.inner.options;
        for (nodes, angle, position) in targets {
            self.inner.host.animate(
                nodes.container,
                &view::position_style(position),
                options.timeout,
            );
            if options.rotate_content {
                self.inner
                    .host
                    .apply_style(nodes.inner, &view::rotation_style(angle));
            }
        }
        self
    }

    pub fn to_radians(&self, degrees: f64) -> f64 {
        geometry::to_radians(degrees)
    }

    pub fn to_degrees(&self, radians: f64) -> f64 {
        geometry::to_degrees(radians)
    }

    fn cascade(&self, fade: Fade) -> Sequence {
        let nodes = {
            let state = self.inner.state.lock();
            if !state.lifecycle.is_enabled() {
                log::warn!("Fade {} ignored: controller is {}", fade, state.lifecycle.state());
                return self.inner.sequencer.settled(Ok(()));
            }
            state.registry.inner_nodes()
        };
        self.inner.sequencer.cascade(nodes, fade, self.liveness())
    }

    fn fire(&self, fade: Fade) -> &Self {
        let nodes = {
            let state = self.inner.state.lock();
            if !state.lifecycle.is_enabled() {
                log::warn!("Fade {} ignored: controller is {}", fade, state.lifecycle.state());
                return self;
            }
            state.registry.inner_nodes()
        };
        self.inner.sequencer.fire(&nodes, fade);
        self
    }

    fn liveness(&self) -> Liveness {
        let weak = Arc::downgrade(&self.inner);
        Arc::new(move || {
            weak.upgrade()
                .is_some_and(|inner| inner.state.lock().lifecycle.is_enabled())
        })
    }

    fn hover_reactions(&self) -> impl Fn(usize, Pointer) -> Reaction {
        let weak = Arc::downgrade(&self.inner);
        move |index: usize, pointer: Pointer| -> Reaction {
            let weak = weak.clone();
            Arc::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.hover(index, pointer);
                }
            })
        }
    }
}

impl PartialEq for Controller {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Controller {}

impl fmt::Debug for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("parent", &self.inner.parent)
            .field("state", &self.state())
            .finish()
    }
}

/// Association between host containers and the controller attached to them.
pub trait InstanceCache: Send + Sync {
    fn lookup(&self, node: NodeId) -> Option<Controller>;

    /// Returns the controller attached to `node`, attaching the one built by `make` if there
    /// is none. Checking and inserting must happen atomically. The flag is `true` when `make`
    /// ran.
    fn get_or_insert_with(
        &self,
        node: NodeId,
        make: Box<dyn FnOnce() -> Controller + '_>,
    ) -> (Controller, bool);
}

#[derive(Default)]
pub struct MemoryCache {
    controllers: Mutex<HashMap<NodeId, Controller>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.controllers.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.lock().is_empty()
    }
}

impl InstanceCache for MemoryCache {
    fn lookup(&self, node: NodeId) -> Option<Controller> {
        self.controllers.lock().get(&node).cloned()
    }

    fn get_or_insert_with(
        &self,
        node: NodeId,
        make: Box<dyn FnOnce() -> Controller + '_>,
    ) -> (Controller, bool) {
        match self.controllers.lock().entry(node) {
            Entry::Occupied(entry) => (entry.get().clone(), false),
            Entry::Vacant(entry) => (entry.insert(make()).clone(), true),
        }
    }
}

/// Attaches an initialized controller to `parent`, or returns the one already attached.
///
/// The controller is initialized before the cache hands it out, so concurrent callers never
/// see a half-built one.
pub fn create_controller(
    cache: &dyn InstanceCache,
    host: Arc<dyn Host>,
    parent: NodeId,
    options: Options,
) -> Controller {
    let (controller, created) = cache.get_or_insert_with(
        parent,
        Box::new(move || {
            let controller = Controller::new(host, parent, options);
            controller.init();
            controller
        }),
    );

    if !created {
        log::info!(
            "Controller already attached to node {}, returning it",
            parent
        );
    }
    controller
}
