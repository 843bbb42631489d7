use crate::config::BalloonSpec;
use crate::geometry::{self, Position};
use crate::host::NodeId;
use crate::lifecycle::{Lifecycle, LifecycleState};
use crate::style::Style;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlacementError {
    #[error("controller is {state}, balloons are only placed while enabled")]
    NotReady { state: LifecycleState },
    #[error("angle is not a finite number")]
    InvalidAngle,
    #[error("radius is not a finite number")]
    InvalidRadius,
    #[error("balloon radius is not a finite number")]
    InvalidBalloonRadius,
}

/// Controller-wide values a [`BalloonSpec`] falls back to.
#[derive(Debug, Clone, Copy)]
pub struct Defaults {
    pub radius: f64,
    pub balloon_radius: f64,
    pub opacity: Option<f64>,
}

/// A validated balloon, positioned but not rendered yet.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub index: usize,
    pub angle_degrees: f64,
    pub angle_radians: f64,
    pub radius: f64,
    pub balloon_radius: f64,
    pub position: Position,
    pub rest_opacity: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalloonNodes {
    pub container: NodeId,
    pub inner: NodeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BalloonEntity {
    pub index: usize,
    pub angle_degrees: f64,
    pub angle_radians: f64,
    pub radius: f64,
    pub balloon_radius: f64,
    pub style: Style,
    pub position: Position,
    pub nodes: BalloonNodes,
    /// Opacity restored on pointer-leave, if the balloon toggles opacity at all.
    pub rest_opacity: Option<f64>,
    pub expanded: bool,
}

/// Placed balloons in creation order. Indices are dense: a rejected spec never takes one.
#[derive(Debug, Default)]
pub struct Registry {
    entities: Vec<BalloonEntity>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates `spec` and computes where the next balloon goes.
    pub fn resolve(
        &self,
        spec: &BalloonSpec,
        defaults: &Defaults,
        lifecycle: &Lifecycle,
    ) -> Result<Placement, PlacementError> {
        if !lifecycle.is_enabled() {
            return Err(PlacementError::NotReady {
                state: lifecycle.state(),
            });
        }

        let angle = finite(spec.angle).ok_or(PlacementError::InvalidAngle)?;
        let radius =
            finite(spec.radius.or(Some(defaults.radius))).ok_or(PlacementError::InvalidRadius)?;
        let balloon_radius = finite(spec.balloon_radius.or(Some(defaults.balloon_radius)))
            .ok_or(PlacementError::InvalidBalloonRadius)?;

        let angle_degrees = geometry::normalize_angle(angle);

        Ok(Placement {
            index: self.entities.len(),
            angle_degrees,
            angle_radians: geometry::to_radians(angle_degrees),
            radius,
            balloon_radius,
            position: geometry::polar_to_offset(radius, angle_degrees),
            rest_opacity: defaults.opacity.or_else(|| spec.css.number("opacity")),
        })
    }

    pub fn push(
        &mut self,
        placement: Placement,
        style: Style,
        nodes: BalloonNodes,
    ) -> &BalloonEntity {
        debug_assert_eq!(placement.index, self.entities.len());

        self.entities.push(BalloonEntity {
            index: self.entities.len(),
            angle_degrees: placement.angle_degrees,
            angle_radians: placement.angle_radians,
            radius: placement.radius,
            balloon_radius: placement.balloon_radius,
            style,
            position: placement.position,
            nodes,
            rest_opacity: placement.rest_opacity,
            expanded: false,
        });
        &self.entities[self.entities.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&BalloonEntity> {
        self.entities.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut BalloonEntity> {
        self.entities.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BalloonEntity> {
        self.entities.iter()
    }

    pub fn inner_nodes(&self) -> Vec<NodeId> {
        self.entities.iter().map(|e| e.nodes.inner).collect()
    }
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}
