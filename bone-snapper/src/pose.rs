//! Local and global pose buffers

use crate::skeleton::Skeleton;
use crate::transform::Transform;

/// Per-bone transforms in parent space (`local`) and world space (`global`)
///
/// Both buffers are indexed by bone index and have one entry per bone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pose {
    pub local: Vec<Transform>,
    pub global: Vec<Transform>,
}

impl Pose {
    /// Build a pose from local transforms, deriving globals by forward kinematics
    ///
    /// `local` must hold one transform per bone of `skeleton`.
    pub fn from_local(skeleton: &Skeleton, local: Vec<Transform>) -> Self {
        debug_assert_eq!(local.len(), skeleton.len());
        let mut pose = Self {
            global: local.clone(),
            local,
        };
        pose.propagate_from(skeleton, 0);
        pose
    }

    /// Rest pose with every bone at identity
    pub fn identity(skeleton: &Skeleton) -> Self {
        Self::from_local(skeleton, vec![Transform::IDENTITY; skeleton.len()])
    }

    pub fn len(&self) -> usize {
        self.global.len()
    }

    pub fn is_empty(&self) -> bool {
        self.global.is_empty()
    }

    /// Recompute global transforms for bone indices `start..len`
    ///
    /// Relies on parents preceding children: every parent read has already
    /// been refreshed by the time its children are visited. Bones in the range
    /// that do not descend from `start` are recomputed to the value they
    /// already had.
    pub fn propagate_from(&mut self, skeleton: &Skeleton, start: usize) {
        let parents = skeleton.parent_indices();
        for index in start..self.global.len() {
            self.global[index] = match parents[index] {
                // Roots are already in global space
                None => self.local[index].normalized(),
                Some(parent) => self.local[index].then(&self.global[parent]).normalized(),
            };
        }
    }
}
