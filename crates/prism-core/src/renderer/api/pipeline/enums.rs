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

//! Enums for pipeline configuration.

use crate::utils::bitflags::prism_bitflags;

/// Specifies the data format of a single vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VertexFormat {
    /// Four unsigned bytes normalized to `[0, 1]`.
    Unorm8x4,
    /// Two 16-bit floats.
    Float16x2,
    /// Four 16-bit floats.
    Float16x4,
    /// One 32-bit float.
    Float32,
    /// Two 32-bit floats.
    Float32x2,
    /// Three 32-bit floats.
    Float32x3,
    /// Four 32-bit floats.
    Float32x4,
    /// One 32-bit unsigned integer.
    Uint32,
    /// Four 32-bit unsigned integers.
    Uint32x4,
}

impl VertexFormat {
    /// Returns the size of the format in bytes.
    pub const fn size(&self) -> u32 {
        match self {
            VertexFormat::Unorm8x4 => 4,
            VertexFormat::Float16x2 => 4,
            VertexFormat::Float16x4 => 8,
            VertexFormat::Float32 => 4,
            VertexFormat::Float32x2 => 8,
            VertexFormat::Float32x3 => 12,
            VertexFormat::Float32x4 => 16,
            VertexFormat::Uint32 => 4,
            VertexFormat::Uint32x4 => 16,
        }
    }
}

/// Specifies how often a vertex buffer is advanced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VertexStepMode {
    /// Advanced once per vertex.
    #[default]
    Vertex,
    /// Advanced once every `step_rate` instances.
    Instance {
        /// Number of instances drawn with the same element.
        step_rate: u32,
    },
}

/// How triangles are rasterized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FillMode {
    /// Filled triangles.
    #[default]
    Solid,
    /// Triangle edges only.
    Wireframe,
}

/// Which triangle faces are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CullMode {
    /// No culling.
    None,
    /// Front faces are culled.
    Front,
    /// Back faces are culled.
    #[default]
    Back,
}

/// Winding order of a front-facing triangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FrontFace {
    /// Counter-clockwise.
    Ccw,
    /// Clockwise.
    #[default]
    Cw,
}

/// A comparison function used for depth, stencil and sampler comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CompareFunction {
    /// Never passes.
    Never,
    /// Passes if the new value is less than the existing one.
    Less,
    /// Passes if the values are equal.
    Equal,
    /// Passes if the new value is less than or equal to the existing one.
    LessEqual,
    /// Passes if the new value is greater than the existing one.
    Greater,
    /// Passes if the values differ.
    NotEqual,
    /// Passes if the new value is greater than or equal to the existing one.
    GreaterEqual,
    /// Always passes.
    #[default]
    Always,
}

/// An operation applied to the stencil buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StencilOperation {
    /// Keep the current value.
    #[default]
    Keep,
    /// Set the value to zero.
    Zero,
    /// Replace the value with the stencil reference.
    Replace,
    /// Bitwise invert the value.
    Invert,
    /// Increment and clamp.
    IncrementClamp,
    /// Decrement and clamp.
    DecrementClamp,
    /// Increment and wrap.
    IncrementWrap,
    /// Decrement and wrap.
    DecrementWrap,
}

/// A multiplier applied to a blend source or destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BlendFactor {
    /// `0`
    Zero,
    /// `1`
    One,
    /// Source color.
    SrcColor,
    /// `1 - source color`
    OneMinusSrcColor,
    /// Source alpha.
    SrcAlpha,
    /// `1 - source alpha`
    OneMinusSrcAlpha,
    /// Destination color.
    DstColor,
    /// `1 - destination color`
    OneMinusDstColor,
    /// Destination alpha.
    DstAlpha,
    /// `1 - destination alpha`
    OneMinusDstAlpha,
    /// The pipeline's blend constant.
    Constant,
    /// `1 - blend constant`
    OneMinusConstant,
}

impl BlendFactor {
    /// Returns `true` if the factor reads the pipeline blend constant.
    pub const fn uses_constant(self) -> bool {
        matches!(self, BlendFactor::Constant | BlendFactor::OneMinusConstant)
    }
}

/// How a blend source and destination are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BlendOperation {
    /// `src + dst`
    #[default]
    Add,
    /// `src - dst`
    Subtract,
    /// `dst - src`
    ReverseSubtract,
    /// `min(src, dst)`
    Min,
    /// `max(src, dst)`
    Max,
}

prism_bitflags! {
    /// A bitmask to enable or disable writes to individual color channels.
    pub struct ColorWrites: u8 {
        /// Enable writes to the Red channel.
        const R = 0b0001;
        /// Enable writes to the Green channel.
        const G = 0b0010;
        /// Enable writes to the Blue channel.
        const B = 0b0100;
        /// Enable writes to the Alpha channel.
        const A = 0b1000;
        /// Enable writes to all channels.
        const ALL = 0b1111;
    }
}
