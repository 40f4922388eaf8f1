//! Rig description files (TOML)
//!
//! A rig file lists bones parent-first with their local rest transforms, plus
//! the bone snapper configuration:
//!
//! ```toml
//! [[bones]]
//! name = "root"
//!
//! [[bones]]
//! name = "hip"
//! parent = "root"
//! translation = [0.0, 0.0, 90.0]
//!
//! [solver]
//! root_snap_bone = "hip"
//! in_place = false
//!
//! [[solver.settings]]
//! source = "hip"
//! destination = "foot"
//! channels = ["translation"]
//! offset = { translation = [0.0, 0.0, 5.0] }
//! ```

use std::path::{Path, PathBuf};

use glam::{Quat, Vec3};
use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use crate::pose::Pose;
use crate::rig::RigSolver;
use crate::settings::{SnapChannel, SnapSetting};
use crate::skeleton::{Skeleton, SkeletonError};
use crate::solver::BoneSnapperSolver;
use crate::transform::Transform;

/// Errors raised while loading a rig description
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read rig file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse rig description: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Bone '{bone}' references unknown parent '{parent}'")]
    UnknownParent { bone: String, parent: String },

    #[error("Bone '{bone}' is declared before its parent '{parent}'")]
    ParentDeclaredAfterChild { bone: String, parent: String },

    #[error("More than one snap setting for source bone '{0}'")]
    DuplicateSetting(String),

    #[error(transparent)]
    Skeleton(#[from] SkeletonError),
}

/// Transform as plain arrays
///
/// Rotation is a quaternion `[x, y, z, w]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformDesc {
    #[serde(default)]
    pub translation: [f32; 3],
    #[serde(default = "default_rotation")]
    pub rotation: [f32; 4],
    #[serde(default = "default_scale")]
    pub scale: [f32; 3],
}

fn default_rotation() -> [f32; 4] {
    [0.0, 0.0, 0.0, 1.0]
}

fn default_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

fn default_channels() -> Vec<SnapChannel> {
    SnapChannel::ALL.to_vec()
}

impl Default for TransformDesc {
    fn default() -> Self {
        Self {
            translation: [0.0; 3],
            rotation: default_rotation(),
            scale: default_scale(),
        }
    }
}

impl From<TransformDesc> for Transform {
    fn from(desc: TransformDesc) -> Self {
        Transform::new(
            Vec3::from_array(desc.translation),
            Quat::from_array(desc.rotation),
            Vec3::from_array(desc.scale),
        )
        .normalized()
    }
}

impl From<Transform> for TransformDesc {
    fn from(transform: Transform) -> Self {
        Self {
            translation: transform.translation.to_array(),
            rotation: transform.rotation.to_array(),
            scale: transform.scale.to_array(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoneDesc {
    pub name: String,
    /// Omitted for root bones
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Local rest transform
    #[serde(flatten)]
    pub transform: TransformDesc,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingDesc {
    pub source: String,
    #[serde(default)]
    pub destination: String,
    #[serde(default = "default_channels")]
    pub channels: Vec<SnapChannel>,
    #[serde(default)]
    pub offset: TransformDesc,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SolverDesc {
    #[serde(default)]
    pub root_snap_bone: Option<String>,
    #[serde(default)]
    pub in_place: bool,
    #[serde(default)]
    pub settings: Vec<SettingDesc>,
}

/// Parsed rig description
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RigConfig {
    pub bones: Vec<BoneDesc>,
    #[serde(default)]
    pub solver: SolverDesc,
}

/// Skeleton, rest pose and an initialized solver built from a [`RigConfig`]
#[derive(Debug, Clone)]
pub struct Rig {
    pub skeleton: Skeleton,
    pub rest_pose: Pose,
    pub solver: BoneSnapperSolver,
}

impl RigConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Build the skeleton from the bone list, parents first
    pub fn skeleton(&self) -> Result<Skeleton, ConfigError> {
        let mut names = Vec::with_capacity(self.bones.len());
        let mut parents = Vec::with_capacity(self.bones.len());

        for bone in &self.bones {
            let parent = match bone.parent.as_deref() {
                None | Some("") => None,
                Some(parent) => Some(self.parent_index(&names, &bone.name, parent)?),
            };
            names.push(bone.name.clone());
            parents.push(parent);
        }

        Ok(Skeleton::new(names, parents)?)
    }

    fn parent_index(
        &self,
        declared: &[String],
        bone: &str,
        parent: &str,
    ) -> Result<usize, ConfigError> {
        if let Some(index) = declared.iter().position(|name| name == parent) {
            return Ok(index);
        }
        let err = if self.bones.iter().any(|b| b.name == parent) {
            ConfigError::ParentDeclaredAfterChild {
                bone: bone.to_string(),
                parent: parent.to_string(),
            }
        } else {
            ConfigError::UnknownParent {
                bone: bone.to_string(),
                parent: parent.to_string(),
            }
        };
        Err(err)
    }

    /// Snap settings in file order
    pub fn snap_settings(&self) -> Result<Vec<SnapSetting>, ConfigError> {
        let mut seen = HashSet::new();
        self.solver
            .settings
            .iter()
            .map(|desc| {
                if !seen.insert(desc.source.as_str()) {
                    return Err(ConfigError::DuplicateSetting(desc.source.clone()));
                }
                Ok(SnapSetting::new(desc.source.clone())
                    .with_destination(desc.destination.clone())
                    .with_channels(desc.channels.iter().copied().collect())
                    .with_offset(desc.offset.into()))
            })
            .collect()
    }

    /// Build skeleton, rest pose and a solver already bound to the skeleton
    pub fn build(&self) -> Result<Rig, ConfigError> {
        let skeleton = self.skeleton()?;
        let rest_pose = Pose::from_local(
            &skeleton,
            self.bones.iter().map(|b| b.transform.into()).collect(),
        );

        let mut solver = BoneSnapperSolver::new();
        solver.set_root_snap_bone(self.solver.root_snap_bone.clone());
        solver.set_in_place(self.solver.in_place);
        for setting in self.snap_settings()? {
            solver.insert_setting(setting);
        }
        solver.initialize(&skeleton);

        Ok(Rig {
            skeleton,
            rest_pose,
            solver,
        })
    }
}

/// Load a rig description from disk
pub fn load_rig(path: &Path) -> Result<RigConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    RigConfig::from_toml_str(&content)
}
