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

//! Command recording with redundant state elimination.
//!
//! Every state-setting call is compared with the value the list last applied and
//! only reaches the deferred context when it differs. Vertex buffers, viewports and
//! scissor rects are only marked dirty and flushed right before the next draw, in
//! that fixed order: viewports, scissors, vertex buffers.

use super::commands::{NativeCommand, VertexBufferBinding};
use super::context::{CommandBuffer, DeferredContext};
use super::device::SoftDevice;
use super::pipeline::SoftPipeline;
use super::states::{BlendState, DepthStencilState, RasterizerState};
use prism_core::math::LinearRgba;
use prism_core::renderer::{
    BindingResource, BufferId, BufferUsage, ClearFlags, CommandList, CommandListId,
    CommandListState, CommandListType, DescriptorClass, DescriptorSet, GpuResource, IndexFormat,
    MapMode, MapStatus, PipelineId, PipelineKind, QueueId, Rect, ResourceError, ResourceRegion,
    ShaderStage, TextureFormat, TextureId, Viewport,
};
use std::any::Any;
use std::sync::Arc;

/// A buffer bound to one vertex input slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct VertexSlot {
    buffer: Option<BufferId>,
    offset: u32,
}

/// The values last applied to the deferred context.
#[derive(Debug, Default)]
struct BindingCache {
    pipeline: Option<Arc<SoftPipeline>>,
    rasterizer: Option<Arc<RasterizerState>>,
    blend: Option<(Arc<BlendState>, LinearRgba, u32)>,
    depth_stencil: Option<(Arc<DepthStencilState>, u32)>,
    vertex_strides: Vec<u32>,
    vertex_buffers: Vec<VertexSlot>,
    /// Inclusive range of vertex buffer slots changed since the last flush.
    dirty_vertex_buffers: Option<(u32, u32)>,
    index_buffer: Option<(BufferId, IndexFormat, u32)>,
    viewports: Vec<Viewport>,
    viewports_dirty: bool,
    scissors: Vec<Rect>,
    scissors_dirty: bool,
    render_targets: Option<(Vec<TextureId>, Option<TextureId>)>,
}

impl BindingCache {
    fn mark_vertex_buffer_dirty(&mut self, slot: u32) {
        self.dirty_vertex_buffers = Some(match self.dirty_vertex_buffers {
            Some((first, last)) => (first.min(slot), last.max(slot)),
            None => (slot, slot),
        });
    }
}

/// A command list recording into its own deferred context.
#[derive(Debug)]
pub struct SoftCommandList {
    id: CommandListId,
    owner: QueueId,
    list_type: CommandListType,
    state: CommandListState,
    device: SoftDevice,
    context: DeferredContext,
    compiled: Option<CommandBuffer>,
    cache: BindingCache,
}

impl SoftCommandList {
    pub(crate) fn new(device: SoftDevice, owner: QueueId, list_type: CommandListType) -> Self {
        let id = CommandListId::generate();
        log::debug!("SoftCommandList: Created {id} ({list_type:?}) for {owner}");
        Self {
            id,
            owner,
            list_type,
            state: CommandListState::Idle,
            device,
            context: DeferredContext::default(),
            compiled: None,
            cache: BindingCache::default(),
        }
    }

    /// The native commands recorded so far, or the compiled stream once ended.
    pub fn recorded_commands(&self) -> &[NativeCommand] {
        match (&self.state, &self.compiled) {
            (CommandListState::Compiled, Some(buffer)) => buffer.commands(),
            _ => self.context.commands(),
        }
    }

    /// Takes the compiled command buffer, leaving the list compiled but empty.
    pub(crate) fn take_compiled(&mut self) -> Option<CommandBuffer> {
        self.compiled.take()
    }

    fn assert_recording(&self, operation: &str) {
        assert_eq!(
            self.state,
            CommandListState::Recording,
            "{operation} called on {} outside of Begin/End",
            self.id
        );
    }

    fn assert_graphics(&self, operation: &str) {
        assert_eq!(
            self.list_type,
            CommandListType::Graphics,
            "{operation} is not available on compute command list {}",
            self.id
        );
    }

    fn record(&mut self, command: NativeCommand) {
        self.context.record(command);
    }

    fn bound_pipeline(&self, operation: &str) -> Arc<SoftPipeline> {
        self.cache
            .pipeline
            .clone()
            .unwrap_or_else(|| {
                panic!("{operation} called on {} before a pipeline was set", self.id)
            })
    }

    fn check_buffer_usage(&self, buffer: BufferId, usage: BufferUsage, what: &str) {
        let resource = self
            .device
            .resources()
            .buffer(buffer)
            .unwrap_or_else(|| panic!("{buffer} bound as {what} does not exist"));
        assert!(
            resource.usage.contains(usage),
            "{buffer} was not created with {usage:?} usage and cannot be bound as {what}"
        );
    }

    fn clear_target_format(&self, target: TextureId) -> TextureFormat {
        self.device
            .resources()
            .texture(target)
            .unwrap_or_else(|| panic!("Clear target {target} does not exist"))
            .descriptor()
            .format
    }

    fn apply_graphics_pipeline(&mut self, pipeline: &SoftPipeline) {
        let descriptor = pipeline.descriptor();
        for stage in ShaderStage::GRAPHICS {
            self.record(NativeCommand::SetShader {
                stage,
                shader: descriptor.shaders.get(stage),
            });
        }
        let Some(graphics) = pipeline.graphics() else {
            return;
        };
        self.record(NativeCommand::SetInputLayout(graphics.input_layout.clone()));
        self.record(NativeCommand::SetPrimitiveTopology(descriptor.topology));

        let rasterizer_changed = self
            .cache
            .rasterizer
            .as_ref()
            .map_or(true, |current| !Arc::ptr_eq(current, &graphics.rasterizer));
        if rasterizer_changed {
            self.cache.rasterizer = Some(Arc::clone(&graphics.rasterizer));
            self.record(NativeCommand::SetRasterizerState(Arc::clone(&graphics.rasterizer)));
        }

        let blend_changed = self.cache.blend.as_ref().map_or(true, |(state, factor, mask)| {
            !Arc::ptr_eq(state, &graphics.blend)
                || *factor != descriptor.blend_factor
                || *mask != descriptor.sample_mask
        });
        if blend_changed {
            self.cache.blend = Some((
                Arc::clone(&graphics.blend),
                descriptor.blend_factor,
                descriptor.sample_mask,
            ));
            self.record(NativeCommand::SetBlendState {
                state: Arc::clone(&graphics.blend),
                blend_factor: descriptor.blend_factor,
                sample_mask: descriptor.sample_mask,
            });
        }

        let depth_stencil_changed =
            self.cache
                .depth_stencil
                .as_ref()
                .map_or(true, |(state, reference)| {
                    !Arc::ptr_eq(state, &graphics.depth_stencil)
                        || *reference != descriptor.stencil_reference
                });
        if depth_stencil_changed {
            self.cache.depth_stencil = Some((
                Arc::clone(&graphics.depth_stencil),
                descriptor.stencil_reference,
            ));
            self.record(NativeCommand::SetDepthStencilState {
                state: Arc::clone(&graphics.depth_stencil),
                stencil_reference: descriptor.stencil_reference,
            });
        }

        if self.cache.vertex_strides != pipeline.vertex_strides() {
            self.cache.vertex_strides = pipeline.vertex_strides().to_vec();
            // Bound buffers must be re-emitted with the new strides.
            let bound: Vec<u32> = (0..self.cache.vertex_buffers.len() as u32)
                .filter(|&slot| self.cache.vertex_buffers[slot as usize].buffer.is_some())
                .collect();
            for slot in bound {
                self.cache.mark_vertex_buffer_dirty(slot);
            }
        }
    }

    fn flush_graphics_state(&mut self) {
        if self.cache.viewports_dirty {
            self.cache.viewports_dirty = false;
            self.record(NativeCommand::SetViewports(self.cache.viewports.clone()));
        }
        if self.cache.scissors_dirty {
            self.cache.scissors_dirty = false;
            self.record(NativeCommand::SetScissorRects(self.cache.scissors.clone()));
        }
        if let Some((first, last)) = self.cache.dirty_vertex_buffers.take() {
            let bindings = (first..=last)
                .map(|slot| {
                    let bound = self.cache.vertex_buffers[slot as usize];
                    VertexBufferBinding {
                        buffer: bound.buffer,
                        stride: self.cache.vertex_strides.get(slot as usize).copied().unwrap_or(0),
                        offset: bound.offset,
                    }
                })
                .collect();
            self.record(NativeCommand::SetVertexBuffers {
                start_slot: first,
                bindings,
            });
        }
    }

    fn prepare_draw(&mut self, operation: &str, count: u32, instance_count: u32) {
        self.assert_recording(operation);
        self.assert_graphics(operation);
        let pipeline = self.bound_pipeline(operation);
        assert_eq!(
            pipeline.kind(),
            PipelineKind::Graphics,
            "{operation} requires a graphics pipeline"
        );
        assert!(count > 0, "{operation} called with a zero element count");
        assert!(instance_count >= 1, "{operation} called with a zero instance count");
        self.flush_graphics_state();
    }
}

impl CommandList for SoftCommandList {
    fn id(&self) -> CommandListId {
        self.id
    }

    fn list_type(&self) -> CommandListType {
        self.list_type
    }

    fn owner(&self) -> QueueId {
        self.owner
    }

    fn state(&self) -> CommandListState {
        self.state
    }

    fn begin(&mut self) {
        assert_ne!(
            self.state,
            CommandListState::Recording,
            "begin called on {} while it is already recording",
            self.id
        );
        self.cache = BindingCache::default();
        self.context.clear_state();
        self.compiled = None;
        self.state = CommandListState::Recording;
    }

    fn end(&mut self) {
        self.assert_recording("end");
        let buffer = self.context.finish();
        log::trace!("SoftCommandList: {} compiled {} commands", self.id, buffer.len());
        self.compiled = Some(buffer);
        self.state = CommandListState::Compiled;
    }

    fn reset(&mut self) {
        self.compiled = None;
        self.context.clear_state();
        self.cache = BindingCache::default();
        self.state = CommandListState::Idle;
    }

    fn set_pipeline(&mut self, pipeline: PipelineId) {
        self.assert_recording("set_pipeline");
        let resolved = self
            .device
            .pipeline(pipeline)
            .unwrap_or_else(|| panic!("{pipeline} does not exist"));
        if let Some(current) = &self.cache.pipeline {
            if Arc::ptr_eq(current, &resolved) || current.descriptor() == resolved.descriptor() {
                return;
            }
        }
        match resolved.kind() {
            PipelineKind::Graphics => {
                self.assert_graphics("binding a graphics pipeline");
                self.apply_graphics_pipeline(&resolved);
            }
            PipelineKind::Compute => self.record(NativeCommand::SetShader {
                stage: ShaderStage::Compute,
                shader: resolved.descriptor().shaders.compute,
            }),
        }
        self.cache.pipeline = Some(resolved);
    }

    fn set_descriptor_set(&mut self, index: u32, set: &DescriptorSet) {
        self.assert_recording("set_descriptor_set");
        let pipeline = self.bound_pipeline("set_descriptor_set");
        let layouts = &pipeline.descriptor().descriptor_layouts;
        let offsets = *pipeline.binding_offsets().get(index as usize).unwrap_or_else(|| {
            panic!(
                "Descriptor set index {index} is out of range for a pipeline with {} layouts",
                layouts.len()
            )
        });
        assert!(
            *layouts[index as usize] == **set.layout(),
            "The descriptor set bound at index {index} does not use the pipeline's layout"
        );

        let settings = self.device.settings_ref();
        let mut commands = Vec::new();
        for (element, binding, resource) in set.iter_populated() {
            let slot = offsets.get(binding.class) + binding.slot;
            let limit = settings.class_limit(binding.class);
            assert!(
                slot < limit,
                "Descriptor {element} of set {index} maps to {:?} slot {slot}, the device has {limit}",
                binding.class
            );
            for stage in binding.stages.stages() {
                commands.push(match (binding.class, resource) {
                    (DescriptorClass::Constant, BindingResource::Buffer(buffer)) => {
                        NativeCommand::SetConstantBuffer { stage, slot, buffer }
                    }
                    (DescriptorClass::Read, resource) => NativeCommand::SetShaderResource {
                        stage,
                        slot,
                        resource,
                    },
                    (DescriptorClass::ReadWrite, resource) => NativeCommand::SetUnorderedAccess {
                        stage,
                        slot,
                        resource,
                    },
                    (DescriptorClass::Sampler, BindingResource::Sampler(sampler)) => {
                        NativeCommand::SetSampler {
                            stage,
                            slot,
                            sampler,
                        }
                    }
                    (class, resource) => {
                        panic!("{resource:?} cannot be bound to a {class:?} descriptor")
                    }
                });
            }
        }
        for command in commands {
            self.record(command);
        }
    }

    fn set_render_targets(&mut self, color_targets: &[TextureId], depth_target: Option<TextureId>) {
        self.assert_recording("set_render_targets");
        self.assert_graphics("set_render_targets");
        let max = self.device.settings_ref().max_render_targets;
        assert!(
            color_targets.len() <= max as usize,
            "{} color targets bound, the device supports {max}",
            color_targets.len()
        );
        if let Some((colors, depth)) = &self.cache.render_targets {
            if colors.as_slice() == color_targets && *depth == depth_target {
                return;
            }
        }
        self.cache.render_targets = Some((color_targets.to_vec(), depth_target));
        self.record(NativeCommand::SetRenderTargets {
            colors: color_targets.to_vec(),
            depth: depth_target,
        });
    }

    fn set_vertex_buffer(&mut self, buffer: BufferId, slot: u32, offset: u32) {
        self.assert_recording("set_vertex_buffer");
        let max = self.device.settings_ref().max_vertex_buffers;
        assert!(slot < max, "Vertex buffer slot {slot} is out of range (0..{max})");
        let bound = VertexSlot {
            buffer: Some(buffer),
            offset,
        };
        if self.cache.vertex_buffers.get(slot as usize) == Some(&bound) {
            return;
        }
        self.check_buffer_usage(buffer, BufferUsage::VERTEX, "a vertex buffer");
        let slots = &mut self.cache.vertex_buffers;
        if slots.len() <= slot as usize {
            slots.resize(slot as usize + 1, VertexSlot::default());
        }
        slots[slot as usize] = bound;
        self.cache.mark_vertex_buffer_dirty(slot);
    }

    fn set_index_buffer(&mut self, buffer: BufferId, format: IndexFormat, offset: u32) {
        self.assert_recording("set_index_buffer");
        if self.cache.index_buffer == Some((buffer, format, offset)) {
            return;
        }
        self.check_buffer_usage(buffer, BufferUsage::INDEX, "an index buffer");
        self.cache.index_buffer = Some((buffer, format, offset));
        self.record(NativeCommand::SetIndexBuffer {
            buffer,
            format,
            offset,
        });
    }

    fn set_viewport(&mut self, viewport: &Viewport, index: u32) {
        self.assert_recording("set_viewport");
        let max = self.device.settings_ref().max_viewports;
        assert!(index < max, "Viewport index {index} is out of range (0..{max})");
        let viewports = &mut self.cache.viewports;
        if viewports.get(index as usize) == Some(viewport) {
            return;
        }
        if viewports.len() <= index as usize {
            viewports.resize(index as usize + 1, Viewport::default());
        }
        viewports[index as usize] = *viewport;
        self.cache.viewports_dirty = true;
    }

    fn set_scissor(&mut self, rect: &Rect, index: u32) {
        self.assert_recording("set_scissor");
        let max = self.device.settings_ref().max_viewports;
        assert!(index < max, "Scissor index {index} is out of range (0..{max})");
        let scissors = &mut self.cache.scissors;
        if scissors.get(index as usize) == Some(rect) {
            return;
        }
        if scissors.len() <= index as usize {
            scissors.resize(index as usize + 1, Rect::default());
        }
        scissors[index as usize] = *rect;
        self.cache.scissors_dirty = true;
    }

    fn clear_render_target(&mut self, target: TextureId, color: LinearRgba) {
        self.assert_recording("clear_render_target");
        self.assert_graphics("clear_render_target");
        let format = self.clear_target_format(target);
        assert!(
            !format.is_depth_stencil(),
            "{target} has depth format {format:?} and cannot be cleared as a color target"
        );
        self.record(NativeCommand::ClearRenderTarget { target, color });
    }

    fn clear_depth_stencil(
        &mut self,
        target: TextureId,
        flags: ClearFlags,
        depth: f32,
        stencil: u8,
    ) {
        self.assert_recording("clear_depth_stencil");
        self.assert_graphics("clear_depth_stencil");
        let format = self.clear_target_format(target);
        assert!(
            format.is_depth_stencil(),
            "{target} has color format {format:?} and cannot be cleared as a depth target"
        );
        assert!(
            (0.0..=1.0).contains(&depth),
            "Depth clear value {depth} is outside [0, 1]"
        );
        self.record(NativeCommand::ClearDepthStencil {
            target,
            flags,
            depth,
            stencil,
        });
    }

    fn draw(
        &mut self,
        vertex_count: u32,
        instance_count: u32,
        vertex_start: u32,
        instance_start: u32,
    ) {
        self.prepare_draw("draw", vertex_count, instance_count);
        if instance_count == 1 && instance_start == 0 {
            self.record(NativeCommand::Draw {
                vertex_count,
                vertex_start,
            });
        } else {
            self.record(NativeCommand::DrawInstanced {
                vertex_count,
                instance_count,
                vertex_start,
                instance_start,
            });
        }
    }

    fn draw_indexed(
        &mut self,
        index_count: u32,
        instance_count: u32,
        index_start: u32,
        base_vertex: i32,
        instance_start: u32,
    ) {
        self.assert_recording("draw_indexed");
        assert!(
            self.cache.index_buffer.is_some(),
            "draw_indexed called on {} without an index buffer",
            self.id
        );
        self.prepare_draw("draw_indexed", index_count, instance_count);
        if instance_count == 1 && instance_start == 0 {
            self.record(NativeCommand::DrawIndexed {
                index_count,
                index_start,
                base_vertex,
            });
        } else {
            self.record(NativeCommand::DrawIndexedInstanced {
                index_count,
                instance_count,
                index_start,
                base_vertex,
                instance_start,
            });
        }
    }

    fn dispatch(&mut self, groups_x: u32, groups_y: u32, groups_z: u32) {
        self.assert_recording("dispatch");
        let pipeline = self.bound_pipeline("dispatch");
        assert_eq!(
            pipeline.kind(),
            PipelineKind::Compute,
            "dispatch requires a compute pipeline"
        );
        assert!(
            groups_x > 0 && groups_y > 0 && groups_z > 0,
            "dispatch called with an empty group count ({groups_x}, {groups_y}, {groups_z})"
        );
        self.record(NativeCommand::Dispatch {
            x: groups_x,
            y: groups_y,
            z: groups_z,
        });
    }

    fn map_resource(
        &mut self,
        resource: GpuResource,
        subresource: u32,
        mode: MapMode,
        do_not_wait: bool,
    ) -> Result<MapStatus, ResourceError> {
        // Deferred contexts cannot map.
        self.device.immediate_context().map(
            self.device.resources(),
            resource,
            subresource,
            mode,
            do_not_wait,
        )
    }

    fn unmap_resource(&mut self, resource: GpuResource, subresource: u32) {
        self.device.immediate_context().unmap(resource, subresource);
    }

    fn write_resource(
        &mut self,
        resource: GpuResource,
        subresource: u32,
        region: Option<&ResourceRegion>,
        data: &[u8],
        row_pitch: u32,
        depth_pitch: u32,
    ) {
        self.assert_recording("write_resource");
        let info = self
            .device
            .resources()
            .subresource(resource, subresource)
            .unwrap_or_else(|| panic!("write_resource target {resource} does not exist"));
        if let Err(reason) = info.check_update(region, data.len(), row_pitch, depth_pitch) {
            panic!("Invalid write to {resource} subresource {subresource}: {reason}");
        }
        self.record(NativeCommand::UpdateSubresource {
            resource,
            subresource,
            region: region.copied(),
            data: Arc::from(data),
            row_pitch,
            depth_pitch,
        });
    }

    fn copy_texture(
        &mut self,
        source: TextureId,
        source_subresource: u32,
        destination: TextureId,
        destination_subresource: u32,
    ) {
        self.assert_recording("copy_texture");
        let resources = self.device.resources();
        let lookup = |id: TextureId, subresource: u32| {
            let texture = resources
                .texture(id)
                .unwrap_or_else(|| panic!("copy_texture operand {id} does not exist"));
            let descriptor = texture.descriptor().clone();
            assert!(
                subresource < descriptor.subresource_count(),
                "Subresource {subresource} is out of range for {id}"
            );
            descriptor
        };
        let src = lookup(source, source_subresource);
        let dst = lookup(destination, destination_subresource);
        assert!(
            src.subresource_extent(source_subresource)
                == dst.subresource_extent(destination_subresource),
            "copy_texture between subresources of different extents"
        );
        assert_eq!(
            src.format.bytes_per_texel(),
            dst.format.bytes_per_texel(),
            "copy_texture between formats of different texel sizes"
        );

        let command = if src.sample_count > 1 && dst.sample_count <= 1 {
            NativeCommand::ResolveSubresource {
                source,
                source_subresource,
                destination,
                destination_subresource,
                format: dst.format,
            }
        } else {
            assert_eq!(
                src.sample_count, dst.sample_count,
                "copy_texture between textures of different sample counts"
            );
            NativeCommand::CopySubresource {
                source,
                source_subresource,
                destination,
                destination_subresource,
            }
        };
        self.record(command);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}
