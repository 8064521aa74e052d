//! Compact encodings for handing node state to a renderer or a file.
//!
//! The simulation itself always works on `f32` positions and plain
//! fields; these types only exist at the upload boundary.

use crate::{error::PackError, types::NodeId};
use glam::Vec2;

const USHORT_MAX: f32 = u16::MAX as f32;

/// A position in the unit square stored as two 16-bit fixed-point values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct QuantizedPos {
    pub x: u16,
    pub y: u16,
}

impl QuantizedPos {
    /// Quantizes `p`, clamping coordinates into `[0, 1]`.
    ///
    /// Rounds to nearest; truncating would drift repeated
    /// encode/decode cycles toward the origin.
    pub fn from_vec2(p: Vec2) -> Self {
        Self {
            x: quantize(p.x),
            y: quantize(p.y),
        }
    }

    pub fn to_vec2(self) -> Vec2 {
        Vec2::new(self.x as f32 / USHORT_MAX, self.y as f32 / USHORT_MAX)
    }
}

#[inline]
fn quantize(v: f32) -> u16 {
    // NaN clamps to NaN and then saturates to 0 in the cast.
    (v.clamp(0.0, 1.0) * USHORT_MAX + 0.5) as u16
}

/// Link state of one node packed into 16 bits.
///
/// Bit 0 is `has_parent`, bit 1 is `has_child`, bits 2..16 hold the target
/// id. The format has no "no target" value; unset targets pack as `0`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PackedAttribs(u16);

impl PackedAttribs {
    /// Largest target id the 14-bit field can hold.
    pub const MAX_TARGET: NodeId = (1 << 14) - 1;

    pub fn pack(has_parent: bool, has_child: bool, target: NodeId) -> Result<Self, PackError> {
        if target > Self::MAX_TARGET {
            return Err(PackError::TargetOutOfRange { target });
        }
        let bits = (has_parent as u16) | ((has_child as u16) << 1) | ((target as u16) << 2);
        Ok(Self(bits))
    }

    #[inline]
    pub fn has_parent(self) -> bool {
        self.0 & 0b01 != 0
    }

    #[inline]
    pub fn has_child(self) -> bool {
        self.0 & 0b10 != 0
    }

    #[inline]
    pub fn target(self) -> NodeId {
        (self.0 >> 2) as NodeId
    }

    #[inline]
    pub fn bits(self) -> u16 {
        self.0
    }
}
