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

//! Defines data structures related to GPU texture resources.

use super::buffer::CpuAccess;
use crate::renderer::api::util::TextureFormat;
use crate::utils::bitflags::prism_bitflags;
use std::borrow::Cow;

/// The dimensionality of a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TextureDimension {
    /// A one-dimensional texture.
    D1,
    /// A two-dimensional texture.
    D2,
    /// A three-dimensional (volumetric) texture.
    D3,
}

prism_bitflags! {
    /// A set of flags describing how a texture may be bound.
    pub struct TextureUsage: u32 {
        /// The texture can be sampled or read in shaders.
        const SHADER_RESOURCE = 1 << 0;
        /// The texture can be bound for unordered (read-write) access.
        const UNORDERED_ACCESS = 1 << 1;
        /// The texture can be used as a color render target.
        const RENDER_TARGET = 1 << 2;
        /// The texture can be used as a depth/stencil target.
        const DEPTH_STENCIL = 1 << 3;
    }
}

/// A descriptor used to create a [`TextureId`](super::TextureId).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureDescriptor<'a> {
    /// An optional debug label for the texture.
    pub label: Option<Cow<'a, str>>,
    /// The dimensionality of the texture.
    pub dimension: TextureDimension,
    /// The texel format.
    pub format: TextureFormat,
    /// Width in texels.
    pub width: u32,
    /// Height in texels (`1` for 1D textures).
    pub height: u32,
    /// Depth for 3D textures, array layer count otherwise.
    pub depth_or_array_layers: u32,
    /// Number of mip levels.
    pub mip_levels: u32,
    /// Samples per texel; greater than one for multisampled textures.
    pub sample_count: u32,
    /// How the texture may be bound.
    pub usage: TextureUsage,
    /// CPU visibility of the texture.
    pub cpu_access: CpuAccess,
}

impl TextureDescriptor<'_> {
    /// A single-mip 2D render target of the given size and format.
    pub fn render_target(width: u32, height: u32, format: TextureFormat) -> Self {
        let usage = if format.is_depth_stencil() {
            TextureUsage::DEPTH_STENCIL
        } else {
            TextureUsage::RENDER_TARGET | TextureUsage::SHADER_RESOURCE
        };
        TextureDescriptor {
            label: None,
            dimension: TextureDimension::D2,
            format,
            width,
            height,
            depth_or_array_layers: 1,
            mip_levels: 1,
            sample_count: 1,
            usage,
            cpu_access: CpuAccess::None,
        }
    }

    /// Number of array layers (`1` for 3D textures).
    pub fn array_layers(&self) -> u32 {
        match self.dimension {
            TextureDimension::D3 => 1,
            _ => self.depth_or_array_layers.max(1),
        }
    }

    /// Number of addressable subresources (`mip_levels * array_layers`).
    pub fn subresource_count(&self) -> u32 {
        self.mip_levels.max(1) * self.array_layers()
    }

    /// Subresource index of a mip level within an array layer.
    pub fn subresource_index(&self, mip_level: u32, array_layer: u32) -> u32 {
        mip_level + array_layer * self.mip_levels.max(1)
    }

    /// Texel extent `(width, height, depth)` of the mip level addressed by `subresource`.
    pub fn subresource_extent(&self, subresource: u32) -> (u32, u32, u32) {
        let mip = subresource % self.mip_levels.max(1);
        let depth = match self.dimension {
            TextureDimension::D3 => (self.depth_or_array_layers >> mip).max(1),
            _ => 1,
        };
        (
            (self.width >> mip).max(1),
            (self.height >> mip).max(1),
            depth,
        )
    }

    /// Byte size of one row of the given subresource.
    pub fn row_pitch(&self, subresource: u32) -> u32 {
        let (width, _, _) = self.subresource_extent(subresource);
        width * self.format.bytes_per_texel()
    }

    /// Byte size of one depth slice of the given subresource.
    pub fn depth_pitch(&self, subresource: u32) -> u32 {
        let (_, height, _) = self.subresource_extent(subresource);
        self.row_pitch(subresource) * height
    }

    /// Byte size of the whole subresource, all samples included.
    pub fn subresource_size(&self, subresource: u32) -> u64 {
        let (_, _, depth) = self.subresource_extent(subresource);
        u64::from(self.depth_pitch(subresource))
            * u64::from(depth)
            * u64::from(self.sample_count.max(1))
    }
}

/// A descriptor used to create a swap chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SwapChainDescriptor {
    /// Back buffer width in pixels.
    pub width: u32,
    /// Back buffer height in pixels.
    pub height: u32,
    /// Back buffer format.
    pub format: TextureFormat,
    /// Number of buffers in the chain, at least two.
    pub buffer_count: u32,
}

impl SwapChainDescriptor {
    /// A double-buffered BGRA8 chain.
    pub const fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            format: TextureFormat::Bgra8Unorm,
            buffer_count: 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subresource_indexing() {
        let desc = TextureDescriptor {
            mip_levels: 3,
            depth_or_array_layers: 2,
            ..TextureDescriptor::render_target(64, 32, TextureFormat::Rgba8Unorm)
        };
        assert_eq!(desc.subresource_count(), 6);
        assert_eq!(desc.subresource_index(1, 1), 4);
        assert_eq!(desc.subresource_extent(4), (32, 16, 1));
        assert_eq!(desc.row_pitch(0), 256);
        assert_eq!(desc.subresource_size(2), 16 * 8 * 4);
    }

    #[test]
    fn test_multisampled_size_includes_samples() {
        let desc = TextureDescriptor {
            sample_count: 4,
            ..TextureDescriptor::render_target(4, 4, TextureFormat::Rgba8Unorm)
        };
        assert_eq!(desc.subresource_size(0), 4 * 4 * 4 * 4);
    }

    #[test]
    fn test_depth_target_usage() {
        let desc = TextureDescriptor::render_target(8, 8, TextureFormat::Depth32Float);
        assert_eq!(desc.usage, TextureUsage::DEPTH_STENCIL);
    }
}
