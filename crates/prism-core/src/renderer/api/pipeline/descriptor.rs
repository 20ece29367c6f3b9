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

//! The pipeline descriptor: the full value identity of a pipeline.

use super::state::*;
use super::vertex::VertexLayout;
use crate::math::LinearRgba;
use crate::renderer::api::descriptor::DescriptorLayout;
use crate::renderer::api::resource::ShaderId;
use crate::renderer::api::util::{PrimitiveTopology, ShaderStage};
use crate::renderer::error::PipelineError;
use std::sync::Arc;

/// The shaders of a pipeline, one optional module per stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShaderSet {
    /// Vertex shader.
    pub vertex: Option<ShaderId>,
    /// Hull shader.
    pub hull: Option<ShaderId>,
    /// Domain shader.
    pub domain: Option<ShaderId>,
    /// Geometry shader.
    pub geometry: Option<ShaderId>,
    /// Pixel shader.
    pub pixel: Option<ShaderId>,
    /// Compute shader. Exclusive with every other stage.
    pub compute: Option<ShaderId>,
}

impl ShaderSet {
    /// A vertex + pixel graphics set.
    pub const fn graphics(vertex: ShaderId, pixel: ShaderId) -> Self {
        Self {
            vertex: Some(vertex),
            hull: None,
            domain: None,
            geometry: None,
            pixel: Some(pixel),
            compute: None,
        }
    }

    /// A compute-only set.
    pub const fn compute(compute: ShaderId) -> Self {
        Self {
            vertex: None,
            hull: None,
            domain: None,
            geometry: None,
            pixel: None,
            compute: Some(compute),
        }
    }

    /// The shader bound to `stage`.
    pub const fn get(&self, stage: ShaderStage) -> Option<ShaderId> {
        match stage {
            ShaderStage::Vertex => self.vertex,
            ShaderStage::Hull => self.hull,
            ShaderStage::Domain => self.domain,
            ShaderStage::Geometry => self.geometry,
            ShaderStage::Pixel => self.pixel,
            ShaderStage::Compute => self.compute,
        }
    }

    /// Iterates over the stages that have a shader.
    pub fn iter(&self) -> impl Iterator<Item = (ShaderStage, ShaderId)> + '_ {
        ShaderStage::ALL
            .into_iter()
            .filter_map(|stage| self.get(stage).map(|id| (stage, id)))
    }
}

/// Whether a pipeline drives the graphics stages or the compute stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineKind {
    /// Vertex to pixel pipeline used by draws.
    Graphics,
    /// Compute pipeline used by dispatches.
    Compute,
}

/// Everything that defines a pipeline.
///
/// Equality is structural: two descriptors with identical field values are the
/// same pipeline as far as every cache is concerned.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PipelineDescriptor {
    /// Shader modules per stage.
    pub shaders: ShaderSet,
    /// Rasterizer state.
    pub rasterizer: RasterizerDescriptor,
    /// Blend state.
    pub blend: BlendDescriptor,
    /// The blend constant used by `BlendFactor::Constant`.
    pub blend_factor: LinearRgba,
    /// Multisample coverage mask.
    pub sample_mask: u32,
    /// Depth/stencil state.
    pub depth_stencil: DepthStencilDescriptor,
    /// Reference value for the stencil test.
    pub stencil_reference: u32,
    /// Vertex input layout.
    pub vertex_layout: VertexLayout,
    /// Primitive topology.
    pub topology: PrimitiveTopology,
    /// Descriptor layouts in set-index order.
    pub descriptor_layouts: Vec<Arc<DescriptorLayout>>,
}

impl PipelineDescriptor {
    /// A descriptor with default fixed-function state for the given shaders.
    pub fn new(shaders: ShaderSet) -> Self {
        Self {
            shaders,
            rasterizer: RasterizerDescriptor::default(),
            blend: BlendDescriptor::default(),
            blend_factor: LinearRgba::WHITE,
            sample_mask: u32::MAX,
            depth_stencil: DepthStencilDescriptor::default(),
            stencil_reference: 0,
            vertex_layout: VertexLayout::empty(),
            topology: PrimitiveTopology::TriangleList,
            descriptor_layouts: Vec::new(),
        }
    }

    /// The pipeline kind implied by the shader set. Does not validate.
    pub fn kind(&self) -> PipelineKind {
        if self.shaders.compute.is_some() {
            PipelineKind::Compute
        } else {
            PipelineKind::Graphics
        }
    }

    /// Checks the structural rules a backend relies on and returns the pipeline kind.
    pub fn validate(&self) -> Result<PipelineKind, PipelineError> {
        let shaders = &self.shaders;
        if shaders.compute.is_some() {
            let has_graphics = ShaderStage::GRAPHICS
                .into_iter()
                .any(|stage| shaders.get(stage).is_some());
            if has_graphics {
                return Err(PipelineError::MixedComputeAndGraphics);
            }
            return Ok(PipelineKind::Compute);
        }

        if shaders.vertex.is_none() {
            return Err(PipelineError::MissingShaderStage {
                stage: ShaderStage::Vertex,
            });
        }
        if shaders.pixel.is_none() {
            return Err(PipelineError::MissingShaderStage {
                stage: ShaderStage::Pixel,
            });
        }
        if shaders.hull.is_some() != shaders.domain.is_some() {
            return Err(PipelineError::IncompleteTessellation);
        }
        if let PrimitiveTopology::PatchList(points) = self.topology {
            if !(1..=32).contains(&points) {
                return Err(PipelineError::InvalidPatchControlPoints(points));
            }
        }
        Ok(PipelineKind::Graphics)
    }
}
