//! Seam to the course-geometry collision provider.
//!
//! The kernel never loads or owns course meshes; editing tools only need a
//! downward raycast to snap a dragged point onto the track surface. The
//! viewport layer implements [`CollisionProvider`] against whatever
//! collision model it has loaded, and the kernel consumes it through this
//! trait.

use crate::math::Vec3;

/// One ray/surface intersection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Intersection point in world space.
    pub position: Vec3,
    /// Distance from the ray origin.
    pub distance: f32,
}

/// Course-geometry raycasting, implemented by the viewport/model layer.
pub trait CollisionProvider {
    /// Cast a ray; `direction` need not be normalized. Returns the nearest
    /// hit, or `None` when the ray leaves the course.
    fn raycast(&self, origin: Vec3, direction: Vec3) -> Option<RayHit>;
}

/// Snap a point onto the surface below (or above) it.
///
/// Casts straight down from slightly above the point; when the point sits
/// under the track, a second upward cast recovers it. Returns the original
/// position when both casts miss (the point is off the course mesh).
pub fn snap_to_ground<P: CollisionProvider + ?Sized>(provider: &P, position: Vec3) -> Vec3 {
    let lift = Vec3::new(0.0, 100.0, 0.0);
    let down = Vec3::new(0.0, -1.0, 0.0);
    if let Some(hit) = provider.raycast(position + lift, down) {
        return hit.position;
    }
    if let Some(hit) = provider.raycast(position, -down) {
        return hit.position;
    }
    position
}
