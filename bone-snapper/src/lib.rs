//! Bone snapper: closed-form pose correction for skeletal rigs.
//!
//! Snaps source bones onto destination bones on selected channels
//! (translation, rotation, scale), re-propagating forward kinematics after
//! every snap, and optionally removes horizontal root drift.
//!
//! Input contract: bones are ordered parents-first. [`Skeleton::new`] enforces
//! this; the solver relies on it without re-checking.

pub mod config;
pub mod pose;
pub mod rig;
pub mod settings;
pub mod skeleton;
pub mod solver;
pub mod transform;

pub use config::{load_rig, ConfigError, Rig, RigConfig, TransformDesc};
pub use pose::Pose;
pub use rig::{Goal, GoalContainer, RigSolver, SolverStack};
pub use settings::{SettingEdit, SnapChannel, SnapChannels, SnapSetting};
pub use skeleton::{compute_bone_depths, Skeleton, SkeletonError};
pub use solver::{snap_bone, BoneSnapperSolver, MISSING_DATA_WARNING};
pub use transform::Transform;
