//! Bone snapper solver
//!
//! Each solve:
//! 1. Re-sorts the snap settings by source depth if they changed since the
//!    last solve.
//! 2. Applies root handling when a root-snap bone is configured, either
//!    pinning it in place or flattening horizontal drift.
//! 3. Snaps every source bone onto its destination on the enabled channels,
//!    re-propagating forward kinematics after each snap.
//!
//! Unresolvable bones and empty channel masks are skipped silently.

mod ordering;
mod root;


pub use ordering::reorder;
pub use root::{flatten_drift, snap_in_place, DRIFT_TOLERANCE};

use tracing::{debug, warn};

use crate::pose::Pose;
use crate::rig::{GoalContainer, RigSolver};
use crate::settings::{SettingEdit, SnapSetting};
use crate::skeleton::{compute_bone_depths, Skeleton};

/// Warning shown when the solver has nothing to do
pub const MISSING_DATA_WARNING: &str = "Missing Data";

/// Snaps source bones onto destination bones and removes root drift
#[derive(Debug, Clone)]
pub struct BoneSnapperSolver {
    root_snap_bone: Option<String>,
    in_place: bool,
    settings: Vec<SnapSetting>,
    bone_depths: Vec<usize>,
    /// Settings need re-sorting before the next solve
    dirty: bool,
}

impl Default for BoneSnapperSolver {
    fn default() -> Self {
        Self {
            root_snap_bone: None,
            in_place: false,
            settings: Vec::new(),
            bone_depths: Vec::new(),
            dirty: true,
        }
    }
}

impl BoneSnapperSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root_snap_bone(&self) -> Option<&str> {
        self.root_snap_bone.as_deref()
    }

    /// Set the bone used to measure root motion. `None` or an empty name
    /// disables root handling.
    pub fn set_root_snap_bone(&mut self, bone: Option<String>) {
        self.root_snap_bone = bone.filter(|name| !name.is_empty());
    }

    pub fn in_place(&self) -> bool {
        self.in_place
    }

    pub fn set_in_place(&mut self, in_place: bool) {
        self.in_place = in_place;
    }

    /// Settings in their current order (sorted by depth after a solve)
    pub fn settings(&self) -> &[SnapSetting] {
        &self.settings
    }

    /// Depth cache from the last [`RigSolver::initialize`]
    pub fn bone_depths(&self) -> &[usize] {
        &self.bone_depths
    }

    pub fn is_ordering_dirty(&self) -> bool {
        self.dirty
    }

    pub fn bone_setting(&self, source_bone: &str) -> Option<&SnapSetting> {
        self.settings.iter().find(|s| s.source_bone == source_bone)
    }

    /// Add a setting. Returns `false` if its source bone already has one.
    pub fn insert_setting(&mut self, setting: SnapSetting) -> bool {
        if self.bone_setting(&setting.source_bone).is_some() {
            return false;
        }
        self.settings.push(setting);
        self.dirty = true;
        true
    }

    /// Remove the setting for `source_bone`, if any
    pub fn remove_setting(&mut self, source_bone: &str) -> Option<SnapSetting> {
        let index = self
            .settings
            .iter()
            .position(|s| s.source_bone == source_bone)?;
        self.dirty = true;
        Some(self.settings.remove(index))
    }

    /// Apply an edit to the setting for `source_bone`.
    ///
    /// Changing the destination marks the ordering dirty. Returns `false` if
    /// no such setting exists.
    pub fn edit_setting(&mut self, source_bone: &str, edit: SettingEdit) -> bool {
        let Some(setting) = self
            .settings
            .iter_mut()
            .find(|s| s.source_bone == source_bone)
        else {
            return false;
        };

        match edit {
            SettingEdit::DestinationBone(bone) => {
                setting.destination_bone = bone;
                self.dirty = true;
            }
            SettingEdit::Channels(channels) => setting.channels = channels,
            SettingEdit::Offset(offset) => setting.offset = offset,
        }
        true
    }

    fn apply_root_motion(&self, skeleton: &Skeleton, pose: &mut Pose) {
        let Some(name) = self.root_snap_bone.as_deref() else {
            return;
        };
        let Some(root_snap) = skeleton.bone_index(name) else {
            debug!("Root snap bone '{}' not in skeleton, skipping root handling", name);
            return;
        };

        if self.in_place {
            snap_in_place(skeleton, pose, root_snap);
        } else {
            flatten_drift(skeleton, pose, root_snap);
        }
    }
}

/// Snap the source bone of `setting` onto its destination.
///
/// Returns `false` when the setting was skipped.
pub fn snap_bone(skeleton: &Skeleton, pose: &mut Pose, setting: &SnapSetting) -> bool {
    let (Some(source), Some(destination)) = (
        skeleton.bone_index(&setting.source_bone),
        skeleton.bone_index(&setting.destination_bone),
    ) else {
        return false;
    };

    if setting.channels.is_empty() {
        return false;
    }

    let delta = pose.global[destination].relative_to(&pose.global[source]);
    let delta = setting.offset.then(&setting.channels.mask(delta));

    pose.local[source] = delta.then(&pose.local[source]);
    pose.propagate_from(skeleton, source);
    true
}

impl RigSolver for BoneSnapperSolver {
    fn initialize(&mut self, skeleton: &Skeleton) {
        self.bone_depths = compute_bone_depths(skeleton.parent_indices());
        self.dirty = true;
    }

    fn solve(&mut self, skeleton: &Skeleton, pose: &mut Pose, _goals: &GoalContainer) {
        if pose.local.len() != skeleton.len() || pose.global.len() != skeleton.len() {
            warn!(
                "Bone snapper: pose has {}/{} local/global transforms for {} bones, skipping",
                pose.local.len(),
                pose.global.len(),
                skeleton.len()
            );
            return;
        }

        if self.dirty {
            reorder(&mut self.settings, skeleton, &self.bone_depths);
            self.dirty = false;
        }

        self.apply_root_motion(skeleton, pose);

        for setting in &self.settings {
            snap_bone(skeleton, pose, setting);
        }
    }

    fn nice_name(&self) -> &str {
        "Bone Snapper"
    }

    fn root_bone(&self) -> Option<&str> {
        self.root_snap_bone()
    }

    fn set_root_bone(&mut self, bone: &str) {
        self.set_root_snap_bone(Some(bone.to_string()));
    }

    fn requires_root_bone(&self) -> bool {
        true
    }

    fn is_bone_affected(&self, bone: &str, _skeleton: &Skeleton) -> bool {
        self.settings.iter().any(|s| s.source_bone == bone)
    }

    fn warning_message(&self) -> Option<&str> {
        (self.settings.is_empty() && self.root_snap_bone.is_none()).then_some(MISSING_DATA_WARNING)
    }

    fn uses_bone_settings(&self) -> bool {
        true
    }

    fn add_bone_setting(&mut self, bone: &str) {
        self.insert_setting(SnapSetting::new(bone));
    }

    fn remove_bone_setting(&mut self, bone: &str) {
        self.remove_setting(bone);
    }

    fn has_bone_setting(&self, bone: &str) -> bool {
        self.bone_setting(bone).is_some()
    }
}
