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

//! Flags representing which shader stages can access a resource binding.

use super::enums::ShaderStage;
use crate::utils::bitflags::prism_bitflags;

prism_bitflags! {
    /// Which shader stages can see a descriptor.
    ///
    /// A descriptor visible to several stages is bound to each of them independently.
    pub struct ShaderStageFlags: u32 {
        /// Vertex shader stage.
        const VERTEX = 1 << 0;
        /// Hull shader stage.
        const HULL = 1 << 1;
        /// Domain shader stage.
        const DOMAIN = 1 << 2;
        /// Geometry shader stage.
        const GEOMETRY = 1 << 3;
        /// Pixel shader stage.
        const PIXEL = 1 << 4;
        /// Compute shader stage.
        const COMPUTE = 1 << 5;
        /// Vertex and pixel stages.
        const VERTEX_PIXEL = (1 << 0) | (1 << 4);
        /// Every graphics stage.
        const ALL_GRAPHICS = 0b01_1111;
        /// Every stage.
        const ALL = 0b11_1111;
    }
}

impl ShaderStageFlags {
    /// Creates flags from a single shader stage.
    pub const fn from_stage(stage: ShaderStage) -> Self {
        match stage {
            ShaderStage::Vertex => Self::VERTEX,
            ShaderStage::Hull => Self::HULL,
            ShaderStage::Domain => Self::DOMAIN,
            ShaderStage::Geometry => Self::GEOMETRY,
            ShaderStage::Pixel => Self::PIXEL,
            ShaderStage::Compute => Self::COMPUTE,
        }
    }

    /// Checks if these flags contain a specific stage.
    pub const fn has_stage(&self, stage: ShaderStage) -> bool {
        self.contains(Self::from_stage(stage))
    }

    /// Iterates over the individual stages set in the mask, in pipeline order.
    pub fn stages(self) -> impl Iterator<Item = ShaderStage> {
        ShaderStage::ALL
            .into_iter()
            .filter(move |stage| self.has_stage(*stage))
    }
}

impl From<ShaderStage> for ShaderStageFlags {
    fn from(stage: ShaderStage) -> Self {
        Self::from_stage(stage)
    }
}
