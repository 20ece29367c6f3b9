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

//! Deferred and immediate contexts of the software device.
//!
//! A [`DeferredContext`] only records [`NativeCommand`]s. Finishing it yields a
//! [`CommandBuffer`], which the single [`ImmediateContext`] of the device executes
//! against resource storage. Like `ExecuteCommandList` with state restoration
//! disabled, every executed buffer starts from and leaves behind a cleared state.

use super::commands::NativeCommand;
use super::resources::{encode_color, ResourceRegistry, SharedBytes, SoftTexture};
use prism_core::renderer::{
    ClearFlags, GpuResource, IndexFormat, MapMode, MapStatus, MappedMemory, MappedSubresource,
    PrimitiveTopology, RenderStats, ResourceError, ShaderId, ShaderStage, TextureFormat,
    TextureId,
};
use prism_core::utils::sync::{lock, read, write};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

/// Records native commands without executing them.
#[derive(Debug, Default)]
pub struct DeferredContext {
    commands: Vec<NativeCommand>,
}

impl DeferredContext {
    pub(crate) fn record(&mut self, command: NativeCommand) {
        log::trace!("Recording {}", command.name());
        self.commands.push(command);
    }

    /// Drops everything recorded since the last finish.
    pub(crate) fn clear_state(&mut self) {
        self.commands.clear();
    }

    /// Closes the recording, like `FinishCommandList`.
    pub(crate) fn finish(&mut self) -> CommandBuffer {
        CommandBuffer {
            commands: std::mem::take(&mut self.commands),
        }
    }

    /// The commands recorded so far.
    pub fn commands(&self) -> &[NativeCommand] {
        &self.commands
    }
}

/// A finished, immutable command stream.
#[derive(Debug, Clone, Default)]
pub struct CommandBuffer {
    commands: Vec<NativeCommand>,
}

impl CommandBuffer {
    pub fn commands(&self) -> &[NativeCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// The slice of bound state execution needs to account and check draws.
#[derive(Debug, Default)]
struct BoundState {
    shaders: HashMap<ShaderStage, ShaderId>,
    topology: Option<PrimitiveTopology>,
    index_format: Option<IndexFormat>,
    color_targets: usize,
}

#[derive(Debug, Default)]
struct ExecutionState {
    bound: BoundState,
    stats: RenderStats,
}

/// The device's single executing context.
///
/// Execution and mapping are internally synchronized. Map bookkeeping has its own
/// lock so that a thread blocked waiting on a busy resource never holds up the
/// thread that is about to unmap it.
#[derive(Debug)]
pub struct ImmediateContext {
    collect_statistics: bool,
    state: Mutex<ExecutionState>,
    mapped: Mutex<HashMap<(GpuResource, u32), Arc<AtomicBool>>>,
    unmapped: Condvar,
}

impl ImmediateContext {
    pub(crate) fn new(collect_statistics: bool) -> Self {
        Self {
            collect_statistics,
            state: Mutex::new(ExecutionState::default()),
            mapped: Mutex::new(HashMap::new()),
            unmapped: Condvar::new(),
        }
    }

    /// Bound state and counters.
    ///
    /// Unlike the registries this lock is not recovered from poisoning: a panic in
    /// the middle of a buffer leaves bound state that the next buffer must not see.
    fn state(&self) -> MutexGuard<'_, ExecutionState> {
        self.state
            .lock()
            .expect("Immediate context state was poisoned by a panic during execution")
    }

    /// Executes `buffer` to completion.
    pub(crate) fn execute(&self, buffer: &CommandBuffer, resources: &ResourceRegistry) {
        let mut state = self.state();
        for command in buffer.commands() {
            self.apply(&mut state, command, resources);
        }
        if self.collect_statistics {
            state.stats.command_lists_executed += 1;
        }
        state.bound = BoundState::default();
    }

    fn apply(
        &self,
        state: &mut ExecutionState,
        command: &NativeCommand,
        resources: &ResourceRegistry,
    ) {
        let ExecutionState { bound, stats } = state;
        let collect = self.collect_statistics;
        match command {
            NativeCommand::SetShader { stage, shader } => match shader {
                Some(shader) => {
                    bound.shaders.insert(*stage, *shader);
                }
                None => {
                    bound.shaders.remove(stage);
                }
            },
            NativeCommand::SetPrimitiveTopology(topology) => bound.topology = Some(*topology),
            NativeCommand::SetIndexBuffer { format, .. } => bound.index_format = Some(*format),
            NativeCommand::SetRenderTargets { colors, .. } => bound.color_targets = colors.len(),
            NativeCommand::SetInputLayout(_)
            | NativeCommand::SetRasterizerState(_)
            | NativeCommand::SetBlendState { .. }
            | NativeCommand::SetDepthStencilState { .. }
            | NativeCommand::SetVertexBuffers { .. }
            | NativeCommand::SetViewports(_)
            | NativeCommand::SetScissorRects(_)
            | NativeCommand::SetConstantBuffer { .. }
            | NativeCommand::SetShaderResource { .. }
            | NativeCommand::SetUnorderedAccess { .. }
            | NativeCommand::SetSampler { .. } => {}
            NativeCommand::ClearRenderTarget { target, color } => {
                let Some(texture) = texture_or_warn(resources, *target, command) else {
                    return;
                };
                // Depth targets are rejected when the clear is recorded.
                let Some(texel) = encode_color(texture.descriptor().format, *color) else {
                    return;
                };
                for storage in mip0_subresources(&texture) {
                    let fill = |dst: &mut [u8]| dst.copy_from_slice(&texel);
                    fill_texels(&mut write(storage), fill, texel.len());
                }
                if collect {
                    stats.clears += 1;
                }
            }
            NativeCommand::ClearDepthStencil {
                target,
                flags,
                depth,
                stencil,
            } => {
                if let Some(texture) = texture_or_warn(resources, *target, command) {
                    if clear_depth_stencil(&texture, *flags, *depth, *stencil) && collect {
                        stats.clears += 1;
                    }
                }
            }
            NativeCommand::Draw {
                vertex_count,
                ..
            } => {
                let topology = check_draw(bound, command);
                if collect {
                    stats.record_draw(topology, *vertex_count, 1, false);
                }
            }
            NativeCommand::DrawInstanced {
                vertex_count,
                instance_count,
                ..
            } => {
                let topology = check_draw(bound, command);
                if collect {
                    stats.record_draw(topology, *vertex_count, *instance_count, true);
                }
            }
            NativeCommand::DrawIndexed { index_count, .. } => {
                let topology = check_indexed_draw(bound, command);
                if collect {
                    stats.record_draw(topology, *index_count, 1, false);
                }
            }
            NativeCommand::DrawIndexedInstanced {
                index_count,
                instance_count,
                ..
            } => {
                let topology = check_indexed_draw(bound, command);
                if collect {
                    stats.record_draw(topology, *index_count, *instance_count, true);
                }
            }
            NativeCommand::Dispatch { x, y, z } => {
                if !bound.shaders.contains_key(&ShaderStage::Compute) {
                    log::warn!("Dispatch({x}, {y}, {z}) executed without a compute shader");
                }
                if collect {
                    stats.dispatches += 1;
                }
            }
            NativeCommand::UpdateSubresource {
                resource,
                subresource,
                region,
                data,
                row_pitch,
                depth_pitch,
            } => match resources.subresource(*resource, *subresource) {
                Some(info) => {
                    info.write_region(region.as_ref(), data, *row_pitch, *depth_pitch);
                    if collect {
                        stats.transfers += 1;
                    }
                }
                None => log::warn!("{} skipped: {resource} no longer exists", command.name()),
            },
            NativeCommand::CopySubresource {
                source,
                source_subresource,
                destination,
                destination_subresource,
            } => {
                let (Some(src), Some(dst)) = (
                    texture_or_warn(resources, *source, command),
                    texture_or_warn(resources, *destination, command),
                ) else {
                    return;
                };
                let src = src.subresource(*source_subresource);
                let dst = dst.subresource(*destination_subresource);
                if Arc::ptr_eq(src, dst) {
                    log::warn!("{} skipped: source and destination alias", command.name());
                    return;
                }
                let bytes = read(src);
                let mut target = write(dst);
                if bytes.len() == target.len() {
                    target.copy_from_slice(&bytes);
                    if collect {
                        stats.transfers += 1;
                    }
                } else {
                    log::warn!(
                        "{} skipped: {} bytes cannot be copied into {} bytes",
                        command.name(),
                        bytes.len(),
                        target.len()
                    );
                }
            }
            NativeCommand::ResolveSubresource {
                source,
                source_subresource,
                destination,
                destination_subresource,
                format,
            } => {
                let (Some(src), Some(dst)) = (
                    texture_or_warn(resources, *source, command),
                    texture_or_warn(resources, *destination, command),
                ) else {
                    return;
                };
                let samples = src.descriptor().sample_count.max(1) as usize;
                let bytes = read(src.subresource(*source_subresource));
                let mut target = write(dst.subresource(*destination_subresource));
                resolve(&bytes, &mut target, samples, *format);
                if collect {
                    stats.transfers += 1;
                }
            }
        }
    }

    /// Maps one subresource for CPU access.
    ///
    /// A subresource that is already mapped is busy: with `do_not_wait` the call
    /// returns [`MapStatus::InUse`], otherwise it blocks until it is unmapped.
    pub(crate) fn map(
        &self,
        resources: &ResourceRegistry,
        resource: GpuResource,
        subresource: u32,
        mode: MapMode,
        do_not_wait: bool,
    ) -> Result<MapStatus, ResourceError> {
        let info = resources
            .subresource(resource, subresource)
            .ok_or_else(|| ResourceError::BackendError(format!("{resource} does not exist")))?;
        if !mode.is_allowed_by(info.cpu_access) {
            return Err(ResourceError::NotMappable {
                resource,
                requested: format!("{mode:?} (created with {:?} CPU access)", info.cpu_access),
            });
        }

        let key = (resource, subresource);
        let mut mapped = lock(&self.mapped);
        while mapped.contains_key(&key) {
            if do_not_wait {
                log::debug!("{resource} subresource {subresource} is busy");
                return Ok(MapStatus::InUse);
            }
            mapped = self
                .unmapped
                .wait(mapped)
                .unwrap_or_else(PoisonError::into_inner);
        }
        let live = Arc::new(AtomicBool::new(true));
        mapped.insert(key, Arc::clone(&live));
        drop(mapped);

        if mode == MapMode::WriteDiscard {
            write(&info.storage).fill(0);
        }
        let memory = Arc::new(SoftMappedMemory {
            resource,
            storage: info.storage,
            live,
        });
        Ok(MapStatus::Mapped(MappedSubresource::new(
            resource,
            subresource,
            mode,
            info.row_pitch,
            info.depth_pitch,
            memory,
        )))
    }

    /// Releases a mapping and wakes the threads waiting on it.
    ///
    /// # Panics
    ///
    /// If the subresource is not mapped.
    pub(crate) fn unmap(&self, resource: GpuResource, subresource: u32) {
        let live = lock(&self.mapped)
            .remove(&(resource, subresource))
            .unwrap_or_else(|| panic!("{resource} subresource {subresource} is not mapped"));
        live.store(false, Ordering::Release);
        self.unmapped.notify_all();
    }

    /// Returns `true` if the subresource is currently mapped.
    pub fn is_mapped(&self, resource: GpuResource, subresource: u32) -> bool {
        lock(&self.mapped).contains_key(&(resource, subresource))
    }

    /// Counters accumulated since creation or the last reset.
    pub fn stats(&self) -> RenderStats {
        self.state().stats
    }

    pub fn reset_stats(&self) {
        self.state().stats = RenderStats::default();
    }
}

/// Memory handed out by [`ImmediateContext::map`].
#[derive(Debug)]
struct SoftMappedMemory {
    resource: GpuResource,
    storage: SharedBytes,
    live: Arc<AtomicBool>,
}

impl SoftMappedMemory {
    fn assert_live(&self) {
        assert!(
            self.live.load(Ordering::Acquire),
            "Mapped memory of {} used after unmap",
            self.resource
        );
    }
}

impl MappedMemory for SoftMappedMemory {
    fn len(&self) -> usize {
        read(&self.storage).len()
    }

    fn read(&self, offset: usize, dst: &mut [u8]) -> Result<(), ResourceError> {
        self.assert_live();
        let bytes = read(&self.storage);
        let end = offset.checked_add(dst.len()).ok_or(ResourceError::OutOfBounds)?;
        let src = bytes.get(offset..end).ok_or(ResourceError::OutOfBounds)?;
        dst.copy_from_slice(src);
        Ok(())
    }

    fn write(&self, offset: usize, src: &[u8]) -> Result<(), ResourceError> {
        self.assert_live();
        let mut bytes = write(&self.storage);
        let end = offset.checked_add(src.len()).ok_or(ResourceError::OutOfBounds)?;
        let dst = bytes.get_mut(offset..end).ok_or(ResourceError::OutOfBounds)?;
        dst.copy_from_slice(src);
        Ok(())
    }
}

fn texture_or_warn(
    resources: &ResourceRegistry,
    id: TextureId,
    command: &NativeCommand,
) -> Option<Arc<SoftTexture>> {
    let texture = resources.texture(id);
    if texture.is_none() {
        log::warn!("{} skipped: {id} no longer exists", command.name());
    }
    texture
}

/// The storage a whole-resource view writes to: mip 0 of every array layer.
fn mip0_subresources(texture: &SoftTexture) -> impl Iterator<Item = &SharedBytes> + '_ {
    let descriptor = texture.descriptor();
    (0..descriptor.array_layers())
        .map(move |layer| texture.subresource(descriptor.subresource_index(0, layer)))
}

fn fill_texels(bytes: &mut [u8], mut fill: impl FnMut(&mut [u8]), texel_size: usize) {
    for texel in bytes.chunks_exact_mut(texel_size) {
        fill(texel);
    }
}

/// Returns `false` for color targets, which are rejected when the clear is recorded.
fn clear_depth_stencil(texture: &SoftTexture, flags: ClearFlags, depth: f32, stencil: u8) -> bool {
    let format = texture.descriptor().format;
    if !format.is_depth_stencil() {
        return false;
    }
    let depth = depth.clamp(0.0, 1.0);
    for storage in mip0_subresources(texture) {
        let mut bytes = write(storage);
        match format {
            TextureFormat::Depth32Float => {
                if flags.contains(ClearFlags::DEPTH) {
                    let value = depth.to_le_bytes();
                    fill_texels(&mut bytes, |dst| dst.copy_from_slice(&value), 4);
                }
            }
            TextureFormat::Depth24PlusStencil8 => {
                let depth_bits = (depth * 0x00ff_ffff as f32).round() as u32;
                fill_texels(
                    &mut bytes,
                    |dst| {
                        let mut value = u32::from_le_bytes([dst[0], dst[1], dst[2], dst[3]]);
                        if flags.contains(ClearFlags::DEPTH) {
                            value = (value & 0xff00_0000) | depth_bits;
                        }
                        if flags.contains(ClearFlags::STENCIL) {
                            value = (value & 0x00ff_ffff) | (u32::from(stencil) << 24);
                        }
                        dst.copy_from_slice(&value.to_le_bytes());
                    },
                    4,
                );
            }
            _ => unreachable!("{format:?} is not a depth format"),
        }
    }
    true
}

/// Averages the samples of every texel of `src` into `dst`.
///
/// Unsigned normalized and 32-bit float formats are averaged per channel; other
/// formats take the first sample.
fn resolve(src: &[u8], dst: &mut [u8], samples: usize, format: TextureFormat) {
    let texel_size = format.bytes_per_texel() as usize;
    let sources = src.chunks_exact(texel_size * samples);
    for (texel, out) in sources.zip(dst.chunks_exact_mut(texel_size)) {
        match format {
            TextureFormat::R8Unorm
            | TextureFormat::Rgba8Unorm
            | TextureFormat::Rgba8UnormSrgb
            | TextureFormat::Bgra8Unorm => {
                for (channel, value) in out.iter_mut().enumerate() {
                    let sum: u32 = (0..samples)
                        .map(|s| u32::from(texel[s * texel_size + channel]))
                        .sum();
                    *value = ((sum + samples as u32 / 2) / samples as u32) as u8;
                }
            }
            TextureFormat::R32Float | TextureFormat::Rgba32Float => {
                for channel in 0..texel_size / 4 {
                    let sum: f32 = (0..samples)
                        .map(|s| {
                            let at = s * texel_size + channel * 4;
                            f32::from_le_bytes([
                                texel[at],
                                texel[at + 1],
                                texel[at + 2],
                                texel[at + 3],
                            ])
                        })
                        .sum();
                    let average = sum / samples as f32;
                    out[channel * 4..channel * 4 + 4].copy_from_slice(&average.to_le_bytes());
                }
            }
            _ => out.copy_from_slice(&texel[..texel_size]),
        }
    }
}

fn check_draw(bound: &BoundState, command: &NativeCommand) -> PrimitiveTopology {
    if !bound.shaders.contains_key(&ShaderStage::Vertex) {
        log::warn!("{} executed without a vertex shader", command.name());
    }
    if bound.color_targets == 0 && !bound.shaders.contains_key(&ShaderStage::Pixel) {
        log::trace!("{} has no color output", command.name());
    }
    bound.topology.unwrap_or_else(|| {
        log::warn!("{} executed without a primitive topology", command.name());
        PrimitiveTopology::TriangleList
    })
}

fn check_indexed_draw(bound: &BoundState, command: &NativeCommand) -> PrimitiveTopology {
    if bound.index_format.is_none() {
        log::warn!("{} executed without an index buffer", command.name());
    }
    check_draw(bound, command)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::software::resources::SoftBuffer;
    use prism_core::math::LinearRgba;
    use prism_core::renderer::{BufferId, BufferUsage, CpuAccess, TextureDescriptor};
    use std::panic::{self, AssertUnwindSafe};
    use std::thread;
    use std::time::Duration;

    fn registry_with_buffer(cpu_access: CpuAccess) -> (ResourceRegistry, GpuResource) {
        let registry = ResourceRegistry::default();
        let buffer =
            SoftBuffer::new(BufferId(1), None, 16, BufferUsage::VERTEX, cpu_access).unwrap();
        let id = registry.insert_buffer(buffer);
        (registry, id.into())
    }

    fn texture(registry: &ResourceRegistry, descriptor: &TextureDescriptor) -> TextureId {
        registry.insert_texture(SoftTexture::new(TextureId::generate(), descriptor).unwrap())
    }

    fn execute(
        context: &ImmediateContext,
        registry: &ResourceRegistry,
        commands: Vec<NativeCommand>,
    ) {
        let mut deferred = DeferredContext::default();
        for command in commands {
            deferred.record(command);
        }
        context.execute(&deferred.finish(), registry);
    }

    #[test]
    fn test_finish_takes_the_recording() {
        let mut deferred = DeferredContext::default();
        deferred.record(NativeCommand::Dispatch { x: 1, y: 1, z: 1 });
        let buffer = deferred.finish();
        assert_eq!(buffer.len(), 1);
        assert!(deferred.commands().is_empty());
    }

    #[test]
    fn test_draw_statistics() {
        let registry = ResourceRegistry::default();
        let context = ImmediateContext::new(true);
        execute(
            &context,
            &registry,
            vec![
                NativeCommand::SetPrimitiveTopology(PrimitiveTopology::TriangleList),
                NativeCommand::Draw {
                    vertex_count: 6,
                    vertex_start: 0,
                },
                NativeCommand::DrawInstanced {
                    vertex_count: 3,
                    instance_count: 4,
                    vertex_start: 0,
                    instance_start: 0,
                },
                NativeCommand::SetPrimitiveTopology(PrimitiveTopology::LineStrip),
                NativeCommand::Draw {
                    vertex_count: 5,
                    vertex_start: 0,
                },
            ],
        );
        let stats = context.stats();
        assert_eq!(stats.command_lists_executed, 1);
        assert_eq!(stats.draw_calls, 3);
        assert_eq!(stats.instanced_draw_calls, 1);
        assert_eq!(stats.triangles, 2 + 4);
        assert_eq!(stats.lines, 4);

        context.reset_stats();
        assert_eq!(context.stats(), RenderStats::default());
    }

    #[test]
    fn test_statistics_can_be_disabled() {
        let registry = ResourceRegistry::default();
        let context = ImmediateContext::new(false);
        execute(&context, &registry, vec![NativeCommand::Dispatch { x: 8, y: 8, z: 1 }]);
        assert_eq!(context.stats(), RenderStats::default());
    }

    #[test]
    fn test_state_does_not_leak_between_buffers() {
        let registry = ResourceRegistry::default();
        let context = ImmediateContext::new(true);
        execute(
            &context,
            &registry,
            vec![NativeCommand::SetPrimitiveTopology(PrimitiveTopology::PointList)],
        );
        // Falls back to triangles because the previous topology was cleared.
        execute(
            &context,
            &registry,
            vec![NativeCommand::Draw {
                vertex_count: 3,
                vertex_start: 0,
            }],
        );
        assert_eq!(context.stats().points, 0);
        assert_eq!(context.stats().triangles, 1);
    }

    #[test]
    fn test_clear_render_target_fills_every_texel() {
        let registry = ResourceRegistry::default();
        let target = texture(
            &registry,
            &TextureDescriptor::render_target(2, 2, TextureFormat::Bgra8Unorm),
        );
        let context = ImmediateContext::new(true);
        execute(
            &context,
            &registry,
            vec![NativeCommand::ClearRenderTarget {
                target,
                color: LinearRgba::new(1.0, 0.0, 0.0, 1.0),
            }],
        );
        let texels = registry.texture(target).unwrap().subresource_contents(0).unwrap();
        assert_eq!(texels, [0, 0, 255, 255].repeat(4));
        assert_eq!(context.stats().clears, 1);
    }

    #[test]
    fn test_depth_stencil_clear_honors_flags() {
        let registry = ResourceRegistry::default();
        let target = texture(
            &registry,
            &TextureDescriptor::render_target(1, 1, TextureFormat::Depth24PlusStencil8),
        );
        let context = ImmediateContext::new(true);
        let clear = |flags, depth, stencil| NativeCommand::ClearDepthStencil {
            target,
            flags,
            depth,
            stencil,
        };
        execute(
            &context,
            &registry,
            vec![
                clear(ClearFlags::DEPTH_STENCIL, 1.0, 7),
                clear(ClearFlags::STENCIL, 0.0, 3),
            ],
        );
        let bytes = registry.texture(target).unwrap().subresource_contents(0).unwrap();
        let value = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        assert_eq!(value & 0x00ff_ffff, 0x00ff_ffff);
        assert_eq!(value >> 24, 3);
    }

    #[test]
    fn test_depth_clear_leaves_color_target_untouched() {
        let registry = ResourceRegistry::default();
        let target = texture(
            &registry,
            &TextureDescriptor::render_target(2, 1, TextureFormat::Rgba8Unorm),
        );
        let context = ImmediateContext::new(true);
        execute(
            &context,
            &registry,
            vec![NativeCommand::ClearDepthStencil {
                target,
                flags: ClearFlags::DEPTH_STENCIL,
                depth: 1.0,
                stencil: 0xff,
            }],
        );
        let texels = registry.texture(target).unwrap().subresource_contents(0).unwrap();
        assert_eq!(texels, vec![0; 8]);
        assert_eq!(context.stats().clears, 0);
    }

    #[test]
    #[should_panic(expected = "poisoned by a panic during execution")]
    fn test_execution_after_a_panicked_buffer_is_fatal() {
        let registry = ResourceRegistry::default();
        let context = ImmediateContext::new(true);
        let _ = panic::catch_unwind(AssertUnwindSafe(|| {
            let mut state = context.state();
            state.bound.topology = Some(PrimitiveTopology::PointList);
            panic!("buffer aborted half way");
        }));
        assert!(context.state.is_poisoned());
        execute(&context, &registry, Vec::new());
    }

    #[test]
    fn test_mapping_survives_a_panicked_buffer() {
        let (registry, buffer) = registry_with_buffer(CpuAccess::Write);
        let context = ImmediateContext::new(true);
        let _ = panic::catch_unwind(AssertUnwindSafe(|| {
            let _state = context.state();
            panic!("buffer aborted half way");
        }));
        let status = context.map(&registry, buffer, 0, MapMode::Write, true).unwrap();
        assert!(status.mapped().is_some());
        context.unmap(buffer, 0);
        assert!(!context.is_mapped(buffer, 0));
    }

    #[test]
    fn test_resolve_averages_samples() {
        let registry = ResourceRegistry::default();
        let source = texture(
            &registry,
            &TextureDescriptor {
                sample_count: 2,
                ..TextureDescriptor::render_target(1, 1, TextureFormat::R8Unorm)
            },
        );
        let destination = texture(
            &registry,
            &TextureDescriptor::render_target(1, 1, TextureFormat::R8Unorm),
        );
        *write(registry.texture(source).unwrap().subresource(0)) = vec![100, 200];

        let context = ImmediateContext::new(true);
        execute(
            &context,
            &registry,
            vec![NativeCommand::ResolveSubresource {
                source,
                source_subresource: 0,
                destination,
                destination_subresource: 0,
                format: TextureFormat::R8Unorm,
            }],
        );
        let resolved = registry.texture(destination).unwrap().subresource_contents(0).unwrap();
        assert_eq!(resolved, vec![150]);
        assert_eq!(context.stats().transfers, 1);
    }

    #[test]
    fn test_map_checks_cpu_access() {
        let (registry, buffer) = registry_with_buffer(CpuAccess::Write);
        let context = ImmediateContext::new(true);
        let result = context.map(&registry, buffer, 0, MapMode::Read, false);
        assert!(matches!(result, Err(ResourceError::NotMappable { .. })));
        assert!(!context.is_mapped(buffer, 0));
    }

    #[test]
    fn test_busy_map_with_do_not_wait() {
        let (registry, buffer) = registry_with_buffer(CpuAccess::ReadWrite);
        let context = ImmediateContext::new(true);
        let first = context.map(&registry, buffer, 0, MapMode::Write, false).unwrap();
        assert!(first.mapped().is_some());

        let second = context.map(&registry, buffer, 0, MapMode::Read, true).unwrap();
        assert!(second.is_in_use());

        context.unmap(buffer, 0);
        let third = context.map(&registry, buffer, 0, MapMode::Read, true).unwrap();
        assert!(!third.is_in_use());
        context.unmap(buffer, 0);
    }

    #[test]
    fn test_blocking_map_waits_for_unmap() {
        let (registry, buffer) = registry_with_buffer(CpuAccess::ReadWrite);
        let registry = Arc::new(registry);
        let context = Arc::new(ImmediateContext::new(true));
        let mapping = context
            .map(&registry, buffer, 0, MapMode::Write, false)
            .unwrap()
            .mapped()
            .unwrap();
        mapping.write_bytes(0, &[42]).unwrap();

        let waiter = {
            let context = Arc::clone(&context);
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let mapping = context
                    .map(&registry, buffer, 0, MapMode::Read, false)
                    .unwrap()
                    .mapped()
                    .unwrap();
                let mut byte = [0];
                mapping.read_bytes(0, &mut byte).unwrap();
                context.unmap(buffer, 0);
                byte[0]
            })
        };
        thread::sleep(Duration::from_millis(20));
        context.unmap(buffer, 0);
        assert_eq!(waiter.join().unwrap(), 42);
    }

    #[test]
    fn test_write_discard_zeroes_storage() {
        let (registry, buffer) = registry_with_buffer(CpuAccess::Write);
        let context = ImmediateContext::new(true);
        let mapping = context
            .map(&registry, buffer, 0, MapMode::Write, false)
            .unwrap()
            .mapped()
            .unwrap();
        mapping.write_bytes(0, &[9; 16]).unwrap();
        context.unmap(buffer, 0);

        let mapping = context
            .map(&registry, buffer, 0, MapMode::WriteDiscard, false)
            .unwrap()
            .mapped()
            .unwrap();
        context.unmap(buffer, 0);
        let GpuResource::Buffer(id) = mapping.resource() else {
            unreachable!()
        };
        assert_eq!(registry.buffer(id).unwrap().contents(), vec![0; 16]);
    }

    #[test]
    #[should_panic(expected = "used after unmap")]
    fn test_mapped_memory_is_dead_after_unmap() {
        let (registry, buffer) = registry_with_buffer(CpuAccess::Write);
        let context = ImmediateContext::new(true);
        let mapping = context
            .map(&registry, buffer, 0, MapMode::Write, false)
            .unwrap()
            .mapped()
            .unwrap();
        context.unmap(buffer, 0);
        let _ = mapping.write_bytes(0, &[1]);
    }

    #[test]
    #[should_panic(expected = "is not mapped")]
    fn test_unmap_without_map_is_fatal() {
        let (_registry, buffer) = registry_with_buffer(CpuAccess::Write);
        ImmediateContext::new(true).unmap(buffer, 0);
    }
}
