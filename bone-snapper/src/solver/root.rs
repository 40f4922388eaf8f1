//! Root motion handling
//!
//! Drift is measured at the configured root-snap bone but corrected at the
//! skeleton's structural root (bone 0) and its direct children. The two are
//! usually different bones.

use glam::Vec3;

use crate::pose::Pose;
use crate::skeleton::Skeleton;
use crate::transform::Transform;

/// Global translations closer than this to the origin count as no drift
pub const DRIFT_TOLERANCE: f32 = 1e-4;

/// Pin the root-snap bone to the vertical axis in local space.
///
/// Zeroes local X and Y translation, keeps Z, then rebuilds the whole global
/// pose.
pub fn snap_in_place(skeleton: &Skeleton, pose: &mut Pose, root_snap: usize) {
    let local = &mut pose.local[root_snap];
    local.translation = Vec3::new(0.0, 0.0, local.translation.z);
    pose.propagate_from(skeleton, 0);
}

/// Cancel horizontal drift measured at `root_snap`.
///
/// Writes the flattened drift into the structural root's global transform and
/// pulls the root's direct children back by its inverse. Globals below the
/// root are not refreshed here. Returns whether a correction was applied.
pub fn flatten_drift(skeleton: &Skeleton, pose: &mut Pose, root_snap: usize) -> bool {
    let translation = pose.global[root_snap].translation;
    if translation.length() <= DRIFT_TOLERANCE {
        return false;
    }

    let flatten = Transform::from_translation(Vec3::new(translation.x, translation.y, 0.0));
    pose.global[0] = flatten;

    let inverse = flatten.inverse();
    for (index, parent) in skeleton.parent_indices().iter().enumerate().skip(1) {
        if *parent == Some(0) {
            pose.local[index] = inverse.then(&pose.local[index]);
        }
    }

    true
}
