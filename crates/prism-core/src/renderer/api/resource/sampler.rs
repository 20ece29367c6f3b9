// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Sampler descriptors.

use crate::math::LinearRgba;
use crate::renderer::api::pipeline::CompareFunction;
use crate::utils::float_bits::FloatBits;

/// Defines how texture coordinates are handled when sampling outside the `[0, 1]` range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AddressMode {
    /// Coordinates wrap around. `1.1` becomes `0.1`.
    Repeat,
    /// Coordinates wrap around, mirroring at each integer boundary.
    MirrorRepeat,
    /// Coordinates are clamped to the edge. `1.1` becomes `1.0`.
    #[default]
    ClampToEdge,
    /// Coordinates outside the range are given the border color.
    ClampToBorder,
}

/// Texel filtering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FilterMode {
    /// Nearest texel.
    Nearest,
    /// Weighted average of neighbouring texels.
    #[default]
    Linear,
}

/// A descriptor used to create a [`SamplerId`](super::SamplerId).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SamplerDescriptor {
    /// Filter used when the texture is minified.
    pub min_filter: FilterMode,
    /// Filter used when the texture is magnified.
    pub mag_filter: FilterMode,
    /// Filter used between mip levels.
    pub mip_filter: FilterMode,
    /// Addressing along U.
    pub address_u: AddressMode,
    /// Addressing along V.
    pub address_v: AddressMode,
    /// Addressing along W.
    pub address_w: AddressMode,
    /// Bias added to the computed mip level.
    pub mip_lod_bias: FloatBits,
    /// Maximum anisotropy; `1` disables anisotropic filtering.
    pub max_anisotropy: u32,
    /// Comparison function for comparison samplers.
    pub compare: Option<CompareFunction>,
    /// Color used by [`AddressMode::ClampToBorder`].
    pub border_color: LinearRgba,
    /// Lowest mip level that may be accessed.
    pub min_lod: FloatBits,
    /// Highest mip level that may be accessed.
    pub max_lod: FloatBits,
}

impl Default for SamplerDescriptor {
    fn default() -> Self {
        Self {
            min_filter: FilterMode::Linear,
            mag_filter: FilterMode::Linear,
            mip_filter: FilterMode::Linear,
            address_u: AddressMode::ClampToEdge,
            address_v: AddressMode::ClampToEdge,
            address_w: AddressMode::ClampToEdge,
            mip_lod_bias: FloatBits(0.0),
            max_anisotropy: 1,
            compare: None,
            border_color: LinearRgba::TRANSPARENT,
            min_lod: FloatBits(0.0),
            max_lod: FloatBits(f32::MAX),
        }
    }
}
