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

//! Pipelines of the software device and the caches their state objects come from.

use super::resources::SamplerState;
use super::states::{BlendState, DepthStencilState, InputLayout, InputLayoutKey, RasterizerState};
use prism_core::renderer::{
    binding_offsets, BlendDescriptor, ClassCounts, DepthStencilDescriptor, PipelineDescriptor,
    PipelineError, PipelineKind, RasterizerDescriptor, SamplerDescriptor, StateCache,
};
use std::sync::Arc;

/// The device-wide caches of immutable state objects.
#[derive(Debug)]
pub(crate) struct StateCaches {
    pub(crate) rasterizer: StateCache<RasterizerDescriptor, Arc<RasterizerState>>,
    pub(crate) blend: StateCache<BlendDescriptor, Arc<BlendState>>,
    pub(crate) depth_stencil: StateCache<DepthStencilDescriptor, Arc<DepthStencilState>>,
    pub(crate) input_layouts: StateCache<InputLayoutKey, Arc<InputLayout>>,
    pub(crate) samplers: StateCache<SamplerDescriptor, Arc<SamplerState>>,
}

impl StateCaches {
    pub(crate) fn new() -> Self {
        Self {
            rasterizer: StateCache::new("rasterizer state"),
            blend: StateCache::new("blend state"),
            depth_stencil: StateCache::new("depth/stencil state"),
            input_layouts: StateCache::new("input layout"),
            samplers: StateCache::new("sampler state"),
        }
    }

    /// Number of distinct objects per cache, in declaration order.
    pub(crate) fn counts(&self) -> CachedStateCounts {
        CachedStateCounts {
            rasterizer: self.rasterizer.len(),
            blend: self.blend.len(),
            depth_stencil: self.depth_stencil.len(),
            input_layouts: self.input_layouts.len(),
            samplers: self.samplers.len(),
        }
    }
}

/// How many distinct state objects the device has created so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CachedStateCounts {
    pub rasterizer: usize,
    pub blend: usize,
    pub depth_stencil: usize,
    pub input_layouts: usize,
    pub samplers: usize,
}

/// The fixed-function objects of a graphics pipeline.
#[derive(Debug)]
pub struct GraphicsState {
    /// `None` when the pipeline reads no vertex attributes.
    pub input_layout: Option<Arc<InputLayout>>,
    pub rasterizer: Arc<RasterizerState>,
    pub blend: Arc<BlendState>,
    pub depth_stencil: Arc<DepthStencilState>,
}

/// A validated pipeline with its resolved state objects.
#[derive(Debug)]
pub struct SoftPipeline {
    descriptor: PipelineDescriptor,
    kind: PipelineKind,
    graphics: Option<GraphicsState>,
    vertex_strides: Vec<u32>,
    binding_offsets: Vec<ClassCounts>,
}

impl SoftPipeline {
    /// Validates `descriptor` and resolves its state objects through `caches`.
    pub(crate) fn resolve(
        descriptor: &PipelineDescriptor,
        caches: &StateCaches,
        max_vertex_buffers: u32,
    ) -> Result<Self, PipelineError> {
        let kind = descriptor.validate()?;
        let graphics = match (kind, descriptor.shaders.vertex) {
            (PipelineKind::Graphics, Some(vertex_shader)) => {
                let input_layout = if descriptor.vertex_layout.has_attributes() {
                    let key = InputLayoutKey {
                        layout: descriptor.vertex_layout.clone(),
                        vertex_shader,
                    };
                    Some(caches.input_layouts.get_or_create(&key, |key| {
                        InputLayout::create(key, max_vertex_buffers).map(Arc::new)
                    })?)
                } else {
                    None
                };
                Some(GraphicsState {
                    input_layout,
                    rasterizer: caches
                        .rasterizer
                        .get_or_create(&descriptor.rasterizer, |d| {
                            RasterizerState::create(d).map(Arc::new)
                        })?,
                    blend: caches
                        .blend
                        .get_or_create(&descriptor.blend, |d| BlendState::create(d).map(Arc::new))?,
                    depth_stencil: caches
                        .depth_stencil
                        .get_or_create(&descriptor.depth_stencil, |d| {
                            DepthStencilState::create(d).map(Arc::new)
                        })?,
                })
            }
            _ => None,
        };

        Ok(Self {
            kind,
            graphics,
            vertex_strides: descriptor.vertex_layout.strides(),
            binding_offsets: binding_offsets(&descriptor.descriptor_layouts),
            descriptor: descriptor.clone(),
        })
    }

    pub fn descriptor(&self) -> &PipelineDescriptor {
        &self.descriptor
    }

    pub fn kind(&self) -> PipelineKind {
        self.kind
    }

    /// Fixed-function objects, `None` for compute pipelines.
    pub fn graphics(&self) -> Option<&GraphicsState> {
        self.graphics.as_ref()
    }

    /// Stride of every vertex buffer slot the layout declares.
    pub fn vertex_strides(&self) -> &[u32] {
        &self.vertex_strides
    }

    /// First flat slot of every class, per descriptor set index.
    pub fn binding_offsets(&self) -> &[ClassCounts] {
        &self.binding_offsets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_core::renderer::{
        CullMode, DescriptorClass, DescriptorLayout, DescriptorLayoutElement, ShaderId, ShaderSet,
        ShaderStageFlags, VertexBufferLayout, VertexFormat, VertexLayout,
    };

    fn descriptor() -> PipelineDescriptor {
        PipelineDescriptor {
            vertex_layout: VertexLayout {
                buffers: vec![VertexBufferLayout::packed(&[
                    ("POSITION", VertexFormat::Float32x3),
                    ("TEXCOORD", VertexFormat::Float32x2),
                ])],
            },
            ..PipelineDescriptor::new(ShaderSet::graphics(ShaderId(1), ShaderId(2)))
        }
    }

    #[test]
    fn test_equal_states_are_shared_across_pipelines() {
        let caches = StateCaches::new();
        let a = SoftPipeline::resolve(&descriptor(), &caches, 16).unwrap();
        let mut other = descriptor();
        other.topology = prism_core::renderer::PrimitiveTopology::LineList;
        let b = SoftPipeline::resolve(&other, &caches, 16).unwrap();

        let (a, b) = (a.graphics().unwrap(), b.graphics().unwrap());
        assert!(Arc::ptr_eq(&a.rasterizer, &b.rasterizer));
        assert!(Arc::ptr_eq(&a.blend, &b.blend));
        assert!(Arc::ptr_eq(&a.depth_stencil, &b.depth_stencil));
        assert!(Arc::ptr_eq(
            a.input_layout.as_ref().unwrap(),
            b.input_layout.as_ref().unwrap()
        ));
        assert_eq!(caches.counts().rasterizer, 1);
    }

    #[test]
    fn test_distinct_states_get_distinct_objects() {
        let caches = StateCaches::new();
        let a = SoftPipeline::resolve(&descriptor(), &caches, 16).unwrap();
        let mut other = descriptor();
        other.rasterizer.cull_mode = CullMode::None;
        let b = SoftPipeline::resolve(&other, &caches, 16).unwrap();
        assert!(!Arc::ptr_eq(
            &a.graphics().unwrap().rasterizer,
            &b.graphics().unwrap().rasterizer
        ));
        assert_eq!(caches.counts().rasterizer, 2);
    }

    #[test]
    fn test_no_input_layout_without_attributes() {
        let caches = StateCaches::new();
        let desc = PipelineDescriptor::new(ShaderSet::graphics(ShaderId(1), ShaderId(2)));
        let pipeline = SoftPipeline::resolve(&desc, &caches, 16).unwrap();
        assert!(pipeline.graphics().unwrap().input_layout.is_none());
        assert!(caches.input_layouts.is_empty());
    }

    #[test]
    fn test_compute_pipeline_has_no_fixed_function_state() {
        let caches = StateCaches::new();
        let mut desc = PipelineDescriptor::new(ShaderSet::compute(ShaderId(3)));
        desc.descriptor_layouts = vec![
            Arc::new(DescriptorLayout::new([DescriptorLayoutElement::new(
                DescriptorClass::ReadWrite,
                ShaderStageFlags::COMPUTE,
            )])),
            Arc::new(DescriptorLayout::new([DescriptorLayoutElement::new(
                DescriptorClass::ReadWrite,
                ShaderStageFlags::COMPUTE,
            )])),
        ];
        let pipeline = SoftPipeline::resolve(&desc, &caches, 16).unwrap();
        assert_eq!(pipeline.kind(), PipelineKind::Compute);
        assert!(pipeline.graphics().is_none());
        assert_eq!(pipeline.binding_offsets()[1].read_writes, 1);
        assert_eq!(caches.counts(), CachedStateCounts::default());
    }

    #[test]
    fn test_invalid_input_layout_is_reported() {
        let caches = StateCaches::new();
        let mut desc = descriptor();
        desc.vertex_layout.buffers[0].stride = 4;
        let result = SoftPipeline::resolve(&desc, &caches, 16);
        assert!(matches!(result, Err(PipelineError::StateCreationFailed(_))));
        assert!(caches.input_layouts.is_empty());
    }
}
