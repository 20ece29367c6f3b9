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

//! The command list contract.

use crate::math::LinearRgba;
use crate::renderer::api::*;
use crate::renderer::error::ResourceError;
use bytemuck::Pod;
use std::any::Any;
use std::fmt::Debug;

/// Recording state of a command list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandListState {
    /// Not recording. `begin` may be called.
    Idle,
    /// Between `begin` and `end`; recording calls are accepted.
    Recording,
    /// Closed. Holds a compiled unit ready for submission.
    Compiled,
}

/// Records GPU work with redundant state elimination.
///
/// Lifecycle: `Idle -> begin -> Recording -> end -> Compiled -> reset -> Idle`.
/// Every recording call outside the `Recording` state, and every violated
/// precondition listed on a method, is a caller bug and panics.
///
/// State-setting calls compare the new value with the last one applied and emit a
/// native transition only when it differs.
pub trait CommandList: Send + Debug + Any {
    /// The list's id.
    fn id(&self) -> CommandListId;

    /// Graphics or compute.
    fn list_type(&self) -> CommandListType;

    /// The queue that owns this list.
    fn owner(&self) -> QueueId;

    /// Current recording state.
    fn state(&self) -> CommandListState;

    /// Clears every cached binding and starts recording.
    fn begin(&mut self);

    /// Closes recording into a compiled unit.
    fn end(&mut self);

    /// Drops the compiled unit (or the partial recording) and returns to `Idle`.
    fn reset(&mut self);

    /// Binds a pipeline. Pipelines with equal descriptors are not rebound.
    fn set_pipeline(&mut self, pipeline: PipelineId);

    /// Binds the populated resources of `set` for the layout at `index` of the
    /// current pipeline.
    ///
    /// # Panics
    ///
    /// If no pipeline is bound, `index` is not a layout of the pipeline, or the
    /// set was built for a different layout.
    fn set_descriptor_set(&mut self, index: u32, set: &DescriptorSet);

    /// Binds color targets and an optional depth/stencil target.
    fn set_render_targets(&mut self, color_targets: &[TextureId], depth_target: Option<TextureId>);

    /// Binds a vertex buffer to `slot`. Applied at the next draw.
    fn set_vertex_buffer(&mut self, buffer: BufferId, slot: u32, offset: u32);

    /// Binds the index buffer.
    fn set_index_buffer(&mut self, buffer: BufferId, format: IndexFormat, offset: u32);

    /// Sets viewport `index`. Applied at the next draw.
    fn set_viewport(&mut self, viewport: &Viewport, index: u32);

    /// Sets scissor rect `index`. Applied at the next draw.
    fn set_scissor(&mut self, rect: &Rect, index: u32);

    /// Clears a color target. Never elided.
    ///
    /// # Panics
    ///
    /// If `target` does not exist or has a depth format.
    fn clear_render_target(&mut self, target: TextureId, color: LinearRgba);

    /// Clears a depth/stencil target. Never elided.
    ///
    /// # Panics
    ///
    /// If `target` does not exist or has a color format, or `depth` is outside [0, 1].
    fn clear_depth_stencil(
        &mut self,
        target: TextureId,
        flags: ClearFlags,
        depth: f32,
        stencil: u8,
    );

    /// Draws non-indexed geometry.
    ///
    /// # Panics
    ///
    /// If no graphics pipeline is bound, `vertex_count` is zero or
    /// `instance_count` is zero.
    fn draw(
        &mut self,
        vertex_count: u32,
        instance_count: u32,
        vertex_start: u32,
        instance_start: u32,
    );

    /// Draws indexed geometry.
    ///
    /// # Panics
    ///
    /// Same preconditions as [`draw`](Self::draw), plus a bound index buffer.
    fn draw_indexed(
        &mut self,
        index_count: u32,
        instance_count: u32,
        index_start: u32,
        base_vertex: i32,
        instance_start: u32,
    );

    /// Dispatches compute work with the bound compute pipeline.
    fn dispatch(&mut self, groups_x: u32, groups_y: u32, groups_z: u32);

    /// Maps a subresource for CPU access.
    ///
    /// Always performed on the device's immediate context, never recorded. With
    /// `do_not_wait`, a resource that is already mapped yields [`MapStatus::InUse`]
    /// instead of blocking.
    fn map_resource(
        &mut self,
        resource: GpuResource,
        subresource: u32,
        mode: MapMode,
        do_not_wait: bool,
    ) -> Result<MapStatus, ResourceError>;

    /// Unmaps a subresource previously mapped with [`map_resource`](Self::map_resource).
    fn unmap_resource(&mut self, resource: GpuResource, subresource: u32);

    /// Records a GPU-side update of `resource`.
    ///
    /// `region` restricts the update to a box inside the subresource; `row_pitch`
    /// and `depth_pitch` describe the layout of `data` for textures.
    fn write_resource(
        &mut self,
        resource: GpuResource,
        subresource: u32,
        region: Option<&ResourceRegion>,
        data: &[u8],
        row_pitch: u32,
        depth_pitch: u32,
    );

    /// Copies one subresource into another. Textures with different sample counts
    /// are resolved.
    fn copy_texture(
        &mut self,
        source: TextureId,
        source_subresource: u32,
        destination: TextureId,
        destination_subresource: u32,
    );

    /// Upcast for backend downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Owned upcast, used by queues to recover their concrete list type.
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

/// Typed helpers available on every command list.
pub trait CommandListExt: CommandList {
    /// Records a whole-buffer update from plain-old-data values.
    fn write_resource_pod<T: Pod>(&mut self, buffer: BufferId, data: &[T]) {
        self.write_resource(
            GpuResource::Buffer(buffer),
            0,
            None,
            bytemuck::cast_slice(data),
            0,
            0,
        );
    }

    /// Records an update of part of a buffer from plain-old-data values.
    fn write_resource_pod_at<T: Pod>(&mut self, buffer: BufferId, offset: u32, data: &[T]) {
        let bytes: &[u8] = bytemuck::cast_slice(data);
        let region = ResourceRegion::buffer_range(offset, bytes.len() as u32);
        self.write_resource(GpuResource::Buffer(buffer), 0, Some(&region), bytes, 0, 0);
    }
}

impl<T: CommandList + ?Sized> CommandListExt for T {}
