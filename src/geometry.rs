//! Angle and placement math shared by placement, rotation and the center marker.
//!
//! Angles are degrees sweeping counter-clockwise from the positive x axis. Offsets are in a
//! top-left-origin space, so the vertical component is flipped.

use std::f64::consts::PI;

pub const FULL_TURN: f64 = 360.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Brings an angle into `[0, 360)`.
///
/// Angles above a full turn are reduced modulo 360. Anything below zero clamps to `0`
/// instead of wrapping, so `-5` lands on `0` and not on `355`.
pub fn normalize_angle(degrees: f64) -> f64 {
    let reduced = if degrees > FULL_TURN {
        degrees % FULL_TURN
    } else {
        degrees
    };
    let clamped = reduced.clamp(0.0, FULL_TURN);
    if clamped == FULL_TURN { 0.0 } else { clamped }
}

pub fn to_radians(degrees: f64) -> f64 {
    degrees * (PI / 180.0)
}

pub fn to_degrees(radians: f64) -> f64 {
    radians * (180.0 / PI)
}

/// Rounds to the nearest integer, ties towards positive infinity (`2.5 -> 3`, `-2.5 -> -2`).
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Offset of a point `radius` px away from the anchor at `angle_degrees`.
pub fn polar_to_offset(radius: f64, angle_degrees: f64) -> Position {
    let theta = to_radians(normalize_angle(angle_degrees));
    Position::new(
        round_half_up(radius * theta.cos()) as i32,
        round_half_up(radius * theta.sin() * -1.0) as i32,
    )
}

/// Counter-rotation that makes a balloon's content point at the anchor.
pub fn content_rotation(angle_degrees: f64) -> f64 {
    90.0 - normalize_angle(angle_degrees)
}

/// 2x2 rotation matrix `[m11, m12, m21, m22]` for a rotation of `degrees`.
pub fn rotation_matrix(degrees: f64) -> [f64; 4] {
    let theta = to_radians(degrees);
    let (m11, m12) = (theta.cos(), -theta.sin());
    [m11, m12, -m12, m11]
}
