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

//! Fixed-function state descriptors.
//!
//! These are the keys of the backend state caches: two equal descriptors always
//! resolve to the same native state object.

use super::enums::*;
use crate::utils::float_bits::FloatBits;

/// Maximum number of simultaneously bound color render targets.
pub const MAX_RENDER_TARGETS: usize = 8;

/// Describes the rasterizer stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RasterizerDescriptor {
    /// How triangles are filled.
    pub fill_mode: FillMode,
    /// Which faces are culled.
    pub cull_mode: CullMode,
    /// Which winding is front-facing.
    pub front_face: FrontFace,
    /// Constant depth bias added to each fragment.
    pub depth_bias: i32,
    /// Maximum depth bias.
    pub depth_bias_clamp: FloatBits,
    /// Depth bias scaled by the fragment's slope.
    pub slope_scaled_depth_bias: FloatBits,
    /// Enables clipping against the near and far planes.
    pub depth_clip_enabled: bool,
    /// Enables the scissor test.
    pub scissor_enabled: bool,
    /// Enables multisample rasterization.
    pub multisample_enabled: bool,
    /// Enables line anti-aliasing.
    pub antialiased_line_enabled: bool,
}

impl Default for RasterizerDescriptor {
    fn default() -> Self {
        Self {
            fill_mode: FillMode::Solid,
            cull_mode: CullMode::Back,
            front_face: FrontFace::Cw,
            depth_bias: 0,
            depth_bias_clamp: FloatBits(0.0),
            slope_scaled_depth_bias: FloatBits(0.0),
            depth_clip_enabled: true,
            scissor_enabled: false,
            multisample_enabled: false,
            antialiased_line_enabled: false,
        }
    }
}

/// The blend equation of one color target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RenderTargetBlend {
    /// Enables blending for this target.
    pub blend_enabled: bool,
    /// Source factor for the color components.
    pub src_color: BlendFactor,
    /// Destination factor for the color components.
    pub dst_color: BlendFactor,
    /// Operation for the color components.
    pub color_op: BlendOperation,
    /// Source factor for alpha.
    pub src_alpha: BlendFactor,
    /// Destination factor for alpha.
    pub dst_alpha: BlendFactor,
    /// Operation for alpha.
    pub alpha_op: BlendOperation,
    /// Channels written to the target.
    pub write_mask: ColorWrites,
}

impl RenderTargetBlend {
    /// Blending disabled, all channels written.
    pub const OPAQUE: Self = Self {
        blend_enabled: false,
        src_color: BlendFactor::One,
        dst_color: BlendFactor::Zero,
        color_op: BlendOperation::Add,
        src_alpha: BlendFactor::One,
        dst_alpha: BlendFactor::Zero,
        alpha_op: BlendOperation::Add,
        write_mask: ColorWrites::ALL,
    };

    /// Classic `src * a + dst * (1 - a)` alpha blending.
    pub const ALPHA_BLEND: Self = Self {
        blend_enabled: true,
        src_color: BlendFactor::SrcAlpha,
        dst_color: BlendFactor::OneMinusSrcAlpha,
        color_op: BlendOperation::Add,
        src_alpha: BlendFactor::One,
        dst_alpha: BlendFactor::OneMinusSrcAlpha,
        alpha_op: BlendOperation::Add,
        write_mask: ColorWrites::ALL,
    };

    /// Additive blending.
    pub const ADDITIVE: Self = Self {
        blend_enabled: true,
        src_color: BlendFactor::One,
        dst_color: BlendFactor::One,
        color_op: BlendOperation::Add,
        src_alpha: BlendFactor::One,
        dst_alpha: BlendFactor::One,
        alpha_op: BlendOperation::Add,
        write_mask: ColorWrites::ALL,
    };

    fn uses_constant(&self) -> bool {
        self.blend_enabled
            && [self.src_color, self.dst_color, self.src_alpha, self.dst_alpha]
                .into_iter()
                .any(BlendFactor::uses_constant)
    }
}

impl Default for RenderTargetBlend {
    fn default() -> Self {
        Self::OPAQUE
    }
}

/// Describes the output-merger blend state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlendDescriptor {
    /// Uses the pixel alpha as a multisample coverage mask.
    pub alpha_to_coverage_enabled: bool,
    /// When `false`, only `render_targets[0]` is used for every target.
    pub independent_blend_enabled: bool,
    /// Per-target blend equations.
    pub render_targets: [RenderTargetBlend; MAX_RENDER_TARGETS],
}

impl BlendDescriptor {
    /// The same blend equation on every target.
    pub const fn uniform(target: RenderTargetBlend) -> Self {
        Self {
            alpha_to_coverage_enabled: false,
            independent_blend_enabled: false,
            render_targets: [target; MAX_RENDER_TARGETS],
        }
    }

    /// Returns `true` if any active target reads the pipeline blend constant.
    pub fn uses_blend_constant(&self) -> bool {
        let active = if self.independent_blend_enabled {
            MAX_RENDER_TARGETS
        } else {
            1
        };
        self.render_targets[..active]
            .iter()
            .any(RenderTargetBlend::uses_constant)
    }
}

impl Default for BlendDescriptor {
    fn default() -> Self {
        Self::uniform(RenderTargetBlend::OPAQUE)
    }
}

/// Stencil operations for one triangle facing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StencilFaceState {
    /// The operation to perform if the stencil test fails.
    pub fail_op: StencilOperation,
    /// The operation to perform if the stencil test passes but the depth test fails.
    pub depth_fail_op: StencilOperation,
    /// The operation to perform if both the stencil and depth tests pass.
    pub pass_op: StencilOperation,
    /// The comparison function used for the stencil test.
    pub compare: CompareFunction,
}

/// Describes the depth and stencil tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DepthStencilDescriptor {
    /// Enables the depth test.
    pub depth_enabled: bool,
    /// If `true`, depth values will be written to the depth buffer.
    pub depth_write_enabled: bool,
    /// The comparison function used for the depth test.
    pub depth_compare: CompareFunction,
    /// Enables the stencil test.
    pub stencil_enabled: bool,
    /// A bitmask for reading from the stencil buffer.
    pub stencil_read_mask: u8,
    /// A bitmask for writing to the stencil buffer.
    pub stencil_write_mask: u8,
    /// Stencil state for front-facing primitives.
    pub front_face: StencilFaceState,
    /// Stencil state for back-facing primitives.
    pub back_face: StencilFaceState,
}

impl Default for DepthStencilDescriptor {
    fn default() -> Self {
        Self {
            depth_enabled: true,
            depth_write_enabled: true,
            depth_compare: CompareFunction::Less,
            stencil_enabled: false,
            stencil_read_mask: 0xff,
            stencil_write_mask: 0xff,
            front_face: StencilFaceState::default(),
            back_face: StencilFaceState::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_equal_descriptors_hash_equal() {
        let mut set = HashSet::new();
        set.insert(RasterizerDescriptor::default());
        set.insert(RasterizerDescriptor::default());
        set.insert(RasterizerDescriptor {
            cull_mode: CullMode::None,
            ..Default::default()
        });
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_blend_constant_detection() {
        assert!(!BlendDescriptor::default().uses_blend_constant());

        let constant = RenderTargetBlend {
            src_color: BlendFactor::Constant,
            ..RenderTargetBlend::ALPHA_BLEND
        };
        assert!(BlendDescriptor::uniform(constant).uses_blend_constant());

        // Disabled blending never reads the constant, whatever the factors say.
        let disabled = RenderTargetBlend {
            blend_enabled: false,
            ..constant
        };
        assert!(!BlendDescriptor::uniform(disabled).uses_blend_constant());
    }

    #[test]
    fn test_independent_blend_checks_every_target() {
        let mut desc = BlendDescriptor::default();
        desc.render_targets[3] = RenderTargetBlend {
            dst_alpha: BlendFactor::OneMinusConstant,
            ..RenderTargetBlend::ALPHA_BLEND
        };
        assert!(!desc.uses_blend_constant());
        desc.independent_blend_enabled = true;
        assert!(desc.uses_blend_constant());
    }
}
