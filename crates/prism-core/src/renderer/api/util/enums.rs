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

//! Generic rendering enums.

/// Specifies the data type of indices in an index buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IndexFormat {
    /// Indices are 16-bit unsigned integers.
    Uint16,
    /// Indices are 32-bit unsigned integers.
    Uint32,
}

impl IndexFormat {
    /// Size of one index in bytes.
    pub const fn size(self) -> u32 {
        match self {
            IndexFormat::Uint16 => 2,
            IndexFormat::Uint32 => 4,
        }
    }
}

/// A backend-agnostic representation of a graphics API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GraphicsBackendType {
    /// Vulkan API.
    Vulkan,
    /// Apple's Metal API.
    Metal,
    /// Microsoft's DirectX 12 API.
    Dx12,
    /// Microsoft's DirectX 11 API.
    Dx11,
    /// A CPU implementation of the DirectX 11 execution model.
    Software,
    /// An unknown or unsupported backend.
    #[default]
    Unknown,
}

/// The programmable stages a shader can be written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ShaderStage {
    /// The vertex shader stage.
    Vertex,
    /// The hull (tessellation control) stage.
    Hull,
    /// The domain (tessellation evaluation) stage.
    Domain,
    /// The geometry shader stage.
    Geometry,
    /// The pixel (fragment) shader stage.
    Pixel,
    /// The compute shader stage.
    Compute,
}

impl ShaderStage {
    /// All stages, in pipeline order.
    pub const ALL: [ShaderStage; 6] = [
        ShaderStage::Vertex,
        ShaderStage::Hull,
        ShaderStage::Domain,
        ShaderStage::Geometry,
        ShaderStage::Pixel,
        ShaderStage::Compute,
    ];

    /// The stages of a graphics pipeline, in pipeline order.
    pub const GRAPHICS: [ShaderStage; 5] = [
        ShaderStage::Vertex,
        ShaderStage::Hull,
        ShaderStage::Domain,
        ShaderStage::Geometry,
        ShaderStage::Pixel,
    ];
}

/// How vertices are assembled into primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PrimitiveTopology {
    /// Each vertex is a point.
    PointList,
    /// Every two vertices form a line.
    LineList,
    /// Consecutive vertices form a connected line.
    LineStrip,
    /// Every three vertices form a triangle.
    #[default]
    TriangleList,
    /// Each vertex after the first two forms a triangle with the previous two.
    TriangleStrip,
    /// Tessellation patches with the given number of control points (1..=32).
    PatchList(u8),
}

/// The kind of primitive a topology produces, for draw statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    /// Points.
    Point,
    /// Lines.
    Line,
    /// Triangles.
    Triangle,
    /// Tessellation patches.
    Patch,
}

impl PrimitiveTopology {
    /// The kind of primitive this topology produces.
    pub const fn kind(self) -> PrimitiveKind {
        match self {
            PrimitiveTopology::PointList => PrimitiveKind::Point,
            PrimitiveTopology::LineList | PrimitiveTopology::LineStrip => PrimitiveKind::Line,
            PrimitiveTopology::TriangleList | PrimitiveTopology::TriangleStrip => {
                PrimitiveKind::Triangle
            }
            PrimitiveTopology::PatchList(_) => PrimitiveKind::Patch,
        }
    }

    /// Number of primitives produced by `vertex_count` vertices of this topology.
    pub fn primitive_count(self, vertex_count: u32) -> u32 {
        match self {
            PrimitiveTopology::PointList => vertex_count,
            PrimitiveTopology::LineList => vertex_count / 2,
            PrimitiveTopology::LineStrip => vertex_count.saturating_sub(1),
            PrimitiveTopology::TriangleList => vertex_count / 3,
            PrimitiveTopology::TriangleStrip => vertex_count.saturating_sub(2),
            PrimitiveTopology::PatchList(points) => vertex_count / u32::from(points.max(1)),
        }
    }
}

/// Defines the memory format of texels in a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TextureFormat {
    /// One 8-bit unsigned normalized component.
    R8Unorm,
    /// Four 8-bit unsigned normalized components (RGBA).
    Rgba8Unorm,
    /// Four 8-bit unsigned normalized components (RGBA) in the sRGB color space.
    Rgba8UnormSrgb,
    /// Four 8-bit unsigned normalized components (BGRA). The usual swap chain format.
    Bgra8Unorm,
    /// Four 16-bit float components.
    Rgba16Float,
    /// One 32-bit float component.
    R32Float,
    /// Four 32-bit float components.
    Rgba32Float,
    /// 32-bit float depth.
    Depth32Float,
    /// 24-bit depth with 8-bit stencil.
    Depth24PlusStencil8,
}

impl TextureFormat {
    /// Size of a single texel in bytes.
    pub const fn bytes_per_texel(self) -> u32 {
        match self {
            TextureFormat::R8Unorm => 1,
            TextureFormat::Rgba8Unorm
            | TextureFormat::Rgba8UnormSrgb
            | TextureFormat::Bgra8Unorm
            | TextureFormat::R32Float
            | TextureFormat::Depth32Float
            | TextureFormat::Depth24PlusStencil8 => 4,
            TextureFormat::Rgba16Float => 8,
            TextureFormat::Rgba32Float => 16,
        }
    }

    /// Returns `true` for depth and depth/stencil formats.
    pub const fn is_depth_stencil(self) -> bool {
        matches!(
            self,
            TextureFormat::Depth32Float | TextureFormat::Depth24PlusStencil8
        )
    }
}

/// The kind of work a command list or queue carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CommandListType {
    /// Draws, dispatches, copies and clears.
    Graphics,
    /// Dispatches and copies only.
    Compute,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_counts_per_topology() {
        assert_eq!(PrimitiveTopology::PointList.primitive_count(10), 10);
        assert_eq!(PrimitiveTopology::LineList.primitive_count(10), 5);
        assert_eq!(PrimitiveTopology::LineStrip.primitive_count(10), 9);
        assert_eq!(PrimitiveTopology::TriangleList.primitive_count(9), 3);
        assert_eq!(PrimitiveTopology::TriangleStrip.primitive_count(6), 4);
        assert_eq!(PrimitiveTopology::PatchList(4).primitive_count(16), 4);
    }

    #[test]
    fn test_degenerate_strips_do_not_underflow() {
        assert_eq!(PrimitiveTopology::TriangleStrip.primitive_count(1), 0);
        assert_eq!(PrimitiveTopology::LineStrip.primitive_count(0), 0);
        assert_eq!(PrimitiveTopology::PatchList(0).primitive_count(3), 3);
    }

    #[test]
    fn test_format_sizes() {
        assert_eq!(TextureFormat::Rgba8Unorm.bytes_per_texel(), 4);
        assert_eq!(TextureFormat::Rgba32Float.bytes_per_texel(), 16);
        assert!(TextureFormat::Depth32Float.is_depth_stencil());
        assert!(!TextureFormat::Bgra8Unorm.is_depth_stencil());
        assert_eq!(IndexFormat::Uint16.size(), 2);
    }
}
