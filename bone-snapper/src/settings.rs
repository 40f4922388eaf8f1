//! Per-bone snap settings

use serde::{Deserialize, Serialize};

use crate::transform::Transform;

/// One transform channel that a snap can copy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum SnapChannel {
    Translation = 0,
    Rotation = 1,
    Scale = 2,
}

impl SnapChannel {
    pub const ALL: [SnapChannel; 3] = [Self::Translation, Self::Rotation, Self::Scale];

    const fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// 3-bit channel mask (bit 0 translation, bit 1 rotation, bit 2 scale)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SnapChannels(u8);

impl Default for SnapChannels {
    fn default() -> Self {
        Self::ALL
    }
}

impl SnapChannels {
    pub const NONE: Self = Self(0);
    pub const ALL: Self = Self(0b111);

    /// Build from raw bits; bits above the scale channel are dropped
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & Self::ALL.0)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn is_set(self, channel: SnapChannel) -> bool {
        self.0 & channel.bit() != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn with(self, channel: SnapChannel) -> Self {
        Self(self.0 | channel.bit())
    }

    pub const fn without(self, channel: SnapChannel) -> Self {
        Self(self.0 & !channel.bit())
    }

    pub fn set(&mut self, channel: SnapChannel, enabled: bool) {
        *self = if enabled {
            self.with(channel)
        } else {
            self.without(channel)
        };
    }

    /// Enabled channels in bit order
    pub fn iter(self) -> impl Iterator<Item = SnapChannel> {
        SnapChannel::ALL.into_iter().filter(move |c| self.is_set(*c))
    }

    /// Keep only the enabled channels of `delta`, resetting the rest to identity
    pub fn mask(self, mut delta: Transform) -> Transform {
        if !self.is_set(SnapChannel::Translation) {
            delta.translation = Transform::IDENTITY.translation;
        }
        if !self.is_set(SnapChannel::Rotation) {
            delta.rotation = Transform::IDENTITY.rotation;
        }
        if !self.is_set(SnapChannel::Scale) {
            delta.scale = Transform::IDENTITY.scale;
        }
        delta
    }
}

impl FromIterator<SnapChannel> for SnapChannels {
    fn from_iter<I: IntoIterator<Item = SnapChannel>>(iter: I) -> Self {
        iter.into_iter().fold(Self::NONE, Self::with)
    }
}

/// Snap one bone onto another
///
/// At most one setting exists per source bone.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapSetting {
    /// Bone that gets moved
    pub source_bone: String,
    /// Bone whose transform is copied; empty until assigned
    pub destination_bone: String,
    pub channels: SnapChannels,
    /// Applied after the masked delta
    pub offset: Transform,
}

impl SnapSetting {
    /// Default setting for `source_bone`: no destination, all channels, no offset
    pub fn new(source_bone: impl Into<String>) -> Self {
        Self {
            source_bone: source_bone.into(),
            destination_bone: String::new(),
            channels: SnapChannels::ALL,
            offset: Transform::IDENTITY,
        }
    }

    pub fn with_destination(mut self, destination_bone: impl Into<String>) -> Self {
        self.destination_bone = destination_bone.into();
        self
    }

    pub fn with_channels(mut self, channels: SnapChannels) -> Self {
        self.channels = channels;
        self
    }

    pub fn with_offset(mut self, offset: Transform) -> Self {
        self.offset = offset;
        self
    }
}

/// Edit notification for an existing setting
#[derive(Debug, Clone, PartialEq)]
pub enum SettingEdit {
    DestinationBone(String),
    Channels(SnapChannels),
    Offset(Transform),
}
