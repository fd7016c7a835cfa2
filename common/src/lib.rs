//! Small geometric building blocks shared across the outline viewer crates.

mod aabb;
mod color;
mod ray;

pub use aabb::Aabb;
pub use color::{ColorParseError, RgbaColor};
pub use ray::Ray;

/// Tolerance used by intersection tests and float comparisons.
pub const EPSILON: f32 = 1e-6;
