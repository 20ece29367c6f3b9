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

//! The software graphics device.

use super::command_list::SoftCommandList;
use super::command_queue::SoftCommandQueue;
use super::context::ImmediateContext;
use super::fence::SoftFence;
use super::pipeline::{CachedStateCounts, SoftPipeline, StateCaches};
use super::resources::{ResourceRegistry, SamplerState, SoftBuffer, SoftShader, SoftTexture};
use super::swap_chain::SoftSwapChain;
use prism_core::renderer::{
    BufferDescriptor, BufferId, BufferUsage, CommandList, CommandListType, CommandQueue,
    CpuAccess, DeviceSettings, Fence, GraphicsBackendType, GraphicsDevice, PipelineDescriptor,
    PipelineId, QueueId, RenderStats, ResourceError, SamplerDescriptor, SamplerId,
    ShaderDescriptor, ShaderError, ShaderId, StateCache, SwapChain, SwapChainDescriptor,
    TextureDescriptor, TextureDimension, TextureId,
};
use prism_core::utils::sync::{lock, write};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug)]
struct SoftDeviceInternal {
    settings: DeviceSettings,
    resources: ResourceRegistry,
    states: StateCaches,
    pipeline_cache: StateCache<PipelineDescriptor, Arc<SoftPipeline>>,
    pipelines: Mutex<HashMap<PipelineId, Arc<SoftPipeline>>>,
    immediate: ImmediateContext,
}

/// A device that emulates the Direct3D 11 context model in system memory.
///
/// Cloning is cheap and yields a handle to the same device.
#[derive(Debug, Clone)]
pub struct SoftDevice {
    internal: Arc<SoftDeviceInternal>,
}

impl Default for SoftDevice {
    fn default() -> Self {
        Self::new(DeviceSettings::default())
    }
}

impl SoftDevice {
    /// Creates a device with the given settings.
    pub fn new(settings: DeviceSettings) -> Self {
        log::info!(
            "SoftDevice: Created ({} vertex buffer slots, {} viewports, statistics {})",
            settings.max_vertex_buffers,
            settings.max_viewports,
            if settings.collect_statistics { "on" } else { "off" }
        );
        let immediate = ImmediateContext::new(settings.collect_statistics);
        Self {
            internal: Arc::new(SoftDeviceInternal {
                settings,
                resources: ResourceRegistry::default(),
                states: StateCaches::new(),
                pipeline_cache: StateCache::new("pipeline"),
                pipelines: Mutex::new(HashMap::new()),
                immediate,
            }),
        }
    }

    /// Creates a command list owned by `queue`, with its concrete type.
    pub fn new_command_list(&self, queue: QueueId, list_type: CommandListType) -> SoftCommandList {
        SoftCommandList::new(self.clone(), queue, list_type)
    }

    /// Creates a command queue, with its concrete type.
    pub fn new_command_queue(&self, list_type: CommandListType) -> SoftCommandQueue {
        SoftCommandQueue::new(self.clone(), list_type)
    }

    /// The context command buffers are executed on.
    pub fn immediate_context(&self) -> &ImmediateContext {
        &self.internal.immediate
    }

    /// A copy of a buffer's contents.
    pub fn read_buffer(&self, id: BufferId) -> Option<Vec<u8>> {
        self.internal.resources.buffer(id).map(|buffer| buffer.contents())
    }

    /// A copy of one texture subresource.
    pub fn read_texture(&self, id: TextureId, subresource: u32) -> Option<Vec<u8>> {
        self.internal
            .resources
            .texture(id)
            .and_then(|texture| texture.subresource_contents(subresource))
    }

    /// The descriptor a texture was created with.
    pub fn texture_descriptor(&self, id: TextureId) -> Option<TextureDescriptor<'static>> {
        self.internal
            .resources
            .texture(id)
            .map(|texture| texture.descriptor().clone())
    }

    /// Number of distinct fixed-function state objects created so far.
    pub fn cached_state_counts(&self) -> CachedStateCounts {
        self.internal.states.counts()
    }

    /// Number of distinct resolved pipelines, as opposed to pipeline ids.
    pub fn resolved_pipeline_count(&self) -> usize {
        self.internal.pipeline_cache.len()
    }

    pub(crate) fn settings_ref(&self) -> &DeviceSettings {
        &self.internal.settings
    }

    pub(crate) fn resources(&self) -> &ResourceRegistry {
        &self.internal.resources
    }

    pub(crate) fn pipeline(&self, id: PipelineId) -> Option<Arc<SoftPipeline>> {
        lock(&self.internal.pipelines).get(&id).cloned()
    }

    fn validate_buffer(
        descriptor: &BufferDescriptor,
        data_len: usize,
    ) -> Result<(), ResourceError> {
        let invalid = |msg: String| Err(ResourceError::InvalidDescriptor(msg));
        if descriptor.size == 0 {
            return invalid("buffer size is zero".to_string());
        }
        if descriptor.usage.is_empty() {
            return invalid("buffer has no usage".to_string());
        }
        if descriptor.usage.contains(BufferUsage::CONSTANT) && descriptor.size % 16 != 0 {
            return invalid(format!(
                "constant buffer size {} is not a multiple of 16",
                descriptor.size
            ));
        }
        if descriptor.structure_stride != 0
            && descriptor.size % u64::from(descriptor.structure_stride) != 0
        {
            return invalid(format!(
                "buffer size {} is not a multiple of the structure stride {}",
                descriptor.size, descriptor.structure_stride
            ));
        }
        if data_len as u64 > descriptor.size {
            return invalid(format!(
                "{data_len} bytes of initial data exceed the buffer size {}",
                descriptor.size
            ));
        }
        Ok(())
    }

    fn validate_texture(descriptor: &TextureDescriptor) -> Result<(), ResourceError> {
        let invalid = |msg: String| Err(ResourceError::InvalidDescriptor(msg));
        if descriptor.width == 0
            || descriptor.height == 0
            || descriptor.depth_or_array_layers == 0
        {
            return invalid(format!(
                "texture extent {}x{}x{} has a zero dimension",
                descriptor.width, descriptor.height, descriptor.depth_or_array_layers
            ));
        }
        let largest = match descriptor.dimension {
            TextureDimension::D3 => descriptor
                .width
                .max(descriptor.height)
                .max(descriptor.depth_or_array_layers),
            _ => descriptor.width.max(descriptor.height),
        };
        let max_mips = u32::BITS - largest.leading_zeros();
        if descriptor.mip_levels == 0 || descriptor.mip_levels > max_mips {
            return invalid(format!(
                "{} mip levels requested, 1..={max_mips} possible",
                descriptor.mip_levels
            ));
        }
        let samples = descriptor.sample_count;
        if samples == 0 || !samples.is_power_of_two() {
            return invalid(format!("sample count {samples} is not a power of two"));
        }
        if samples > 1 && (descriptor.mip_levels > 1 || descriptor.cpu_access != CpuAccess::None) {
            return invalid("multisampled textures cannot have mips or CPU access".to_string());
        }
        Ok(())
    }

    fn new_buffer(&self, descriptor: &BufferDescriptor) -> Result<SoftBuffer, ResourceError> {
        let label = if self.internal.settings.debug_labels {
            descriptor.label.as_ref().map(|label| label.to_string())
        } else {
            None
        };
        SoftBuffer::new(
            BufferId::generate(),
            label,
            descriptor.size,
            descriptor.usage,
            descriptor.cpu_access,
        )
    }
}

impl GraphicsDevice for SoftDevice {
    fn backend_type(&self) -> GraphicsBackendType {
        GraphicsBackendType::Software
    }

    fn settings(&self) -> &DeviceSettings {
        &self.internal.settings
    }

    fn create_buffer(&self, descriptor: &BufferDescriptor) -> Result<BufferId, ResourceError> {
        Self::validate_buffer(descriptor, 0)?;
        let id = self.internal.resources.insert_buffer(self.new_buffer(descriptor)?);
        log::info!(
            "SoftDevice: Created buffer '{}' with ID: {id}, size: {} bytes",
            descriptor.label.as_deref().unwrap_or_default(),
            descriptor.size
        );
        Ok(id)
    }

    fn create_buffer_with_data(
        &self,
        descriptor: &BufferDescriptor,
        data: &[u8],
    ) -> Result<BufferId, ResourceError> {
        Self::validate_buffer(descriptor, data.len())?;
        let buffer = self.new_buffer(descriptor)?;
        write(&buffer.storage)[..data.len()].copy_from_slice(data);
        let id = self.internal.resources.insert_buffer(buffer);
        log::info!(
            "SoftDevice: Created buffer '{}' with initial data. ID: {id}, size: {} bytes",
            descriptor.label.as_deref().unwrap_or_default(),
            descriptor.size
        );
        Ok(id)
    }

    fn destroy_buffer(&self, id: BufferId) -> Result<(), ResourceError> {
        match self.internal.resources.remove_buffer(id) {
            Some(_) => {
                log::debug!("SoftDevice: Destroyed buffer with ID: {id}");
                Ok(())
            }
            None => Err(ResourceError::BackendError(format!("{id} does not exist"))),
        }
    }

    fn create_texture(&self, descriptor: &TextureDescriptor) -> Result<TextureId, ResourceError> {
        Self::validate_texture(descriptor)?;
        let mut texture = SoftTexture::new(TextureId::generate(), descriptor)?;
        if !self.internal.settings.debug_labels {
            texture.descriptor.label = None;
        }
        let id = self.internal.resources.insert_texture(texture);
        log::info!(
            "SoftDevice: Created texture '{}' with ID: {}, {}x{} {:?}",
            descriptor.label.as_deref().unwrap_or_default(),
            id,
            descriptor.width,
            descriptor.height,
            descriptor.format
        );
        Ok(id)
    }

    fn destroy_texture(&self, id: TextureId) -> Result<(), ResourceError> {
        match self.internal.resources.remove_texture(id) {
            Some(_) => {
                log::debug!("SoftDevice: Destroyed texture with ID: {id}");
                Ok(())
            }
            None => Err(ResourceError::BackendError(format!("{id} does not exist"))),
        }
    }

    fn create_sampler(&self, descriptor: &SamplerDescriptor) -> Result<SamplerId, ResourceError> {
        if descriptor.max_anisotropy == 0 || descriptor.max_anisotropy > 16 {
            return Err(ResourceError::InvalidDescriptor(format!(
                "max anisotropy {} is outside 1..=16",
                descriptor.max_anisotropy
            )));
        }
        let sampler = self
            .internal
            .states
            .samplers
            .get_or_create(descriptor, |descriptor| {
                Ok::<_, ResourceError>(Arc::new(SamplerState {
                    descriptor: descriptor.clone(),
                }))
            })?;
        let id = SamplerId::generate();
        self.internal.resources.insert_sampler(id, sampler);
        log::debug!("SoftDevice: Created sampler with ID: {id}");
        Ok(id)
    }

    fn destroy_sampler(&self, id: SamplerId) -> Result<(), ResourceError> {
        match self.internal.resources.remove_sampler(id) {
            Some(_) => {
                log::debug!("SoftDevice: Destroyed sampler with ID: {id}");
                Ok(())
            }
            None => Err(ResourceError::BackendError(format!("{id} does not exist"))),
        }
    }

    fn create_shader(&self, descriptor: &ShaderDescriptor) -> Result<ShaderId, ResourceError> {
        let label = descriptor.label.as_deref().unwrap_or_default();
        if descriptor.bytecode.is_empty() {
            return Err(ShaderError::CompilationError {
                label: label.to_string(),
                details: "empty bytecode".to_string(),
            }
            .into());
        }
        if descriptor.entry_point.is_empty() {
            return Err(ShaderError::CompilationError {
                label: label.to_string(),
                details: "empty entry point".to_string(),
            }
            .into());
        }
        let id = self.internal.resources.insert_shader(SoftShader {
            id: ShaderId::generate(),
            stage: descriptor.stage,
            entry_point: descriptor.entry_point.to_string(),
            bytecode: descriptor.bytecode.to_vec(),
        });
        log::info!(
            "SoftDevice: Created {:?} shader '{label}' with ID: {id}",
            descriptor.stage
        );
        Ok(id)
    }

    fn destroy_shader(&self, id: ShaderId) -> Result<(), ResourceError> {
        match self.internal.resources.remove_shader(id) {
            Some(_) => {
                log::debug!("SoftDevice: Destroyed shader with ID: {id}");
                Ok(())
            }
            None => Err(ShaderError::NotFound { id }.into()),
        }
    }

    fn create_pipeline(
        &self,
        descriptor: &PipelineDescriptor,
    ) -> Result<PipelineId, ResourceError> {
        let kind = descriptor.validate()?;
        for (stage, id) in descriptor.shaders.iter() {
            let shader = self
                .internal
                .resources
                .shader(id)
                .ok_or(ShaderError::NotFound { id })?;
            if shader.stage != stage {
                return Err(ShaderError::StageMismatch {
                    id,
                    expected: stage,
                    actual: shader.stage,
                }
                .into());
            }
        }

        let max_vertex_buffers = self.internal.settings.max_vertex_buffers;
        let states = &self.internal.states;
        let pipeline = self
            .internal
            .pipeline_cache
            .get_or_create(descriptor, |descriptor| {
                SoftPipeline::resolve(descriptor, states, max_vertex_buffers).map(Arc::new)
            })?;

        let id = PipelineId::generate();
        lock(&self.internal.pipelines).insert(id, pipeline);
        log::info!("SoftDevice: Created {kind:?} pipeline with ID: {id}");
        Ok(id)
    }

    fn destroy_pipeline(&self, id: PipelineId) -> Result<(), ResourceError> {
        match lock(&self.internal.pipelines).remove(&id) {
            Some(_) => {
                log::debug!("SoftDevice: Destroyed pipeline with ID: {id}");
                Ok(())
            }
            None => Err(ResourceError::BackendError(format!("{id} does not exist"))),
        }
    }

    fn create_command_list(
        &self,
        queue: QueueId,
        list_type: CommandListType,
    ) -> Box<dyn CommandList> {
        Box::new(self.new_command_list(queue, list_type))
    }

    fn create_command_queue(&self, list_type: CommandListType) -> Box<dyn CommandQueue> {
        Box::new(self.new_command_queue(list_type))
    }

    fn create_fence(&self) -> Arc<dyn Fence> {
        Arc::new(SoftFence::new())
    }

    fn create_swap_chain(
        &self,
        descriptor: &SwapChainDescriptor,
    ) -> Result<Box<dyn SwapChain>, ResourceError> {
        Ok(Box::new(SoftSwapChain::new(self.clone(), descriptor)?))
    }

    fn render_stats(&self) -> RenderStats {
        self.internal.immediate.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_core::renderer::{
        PipelineError, ShaderSet, ShaderStage, TextureFormat,
    };
    use std::borrow::Cow;

    fn shader(device: &SoftDevice, stage: ShaderStage) -> ShaderId {
        device
            .create_shader(&ShaderDescriptor::new(stage, vec![0xde, 0xad]))
            .unwrap()
    }

    #[test]
    fn test_buffer_creation_validates_descriptor() {
        let device = SoftDevice::default();
        let constant = |size| BufferDescriptor {
            size,
            usage: BufferUsage::CONSTANT,
            ..Default::default()
        };
        assert!(device.create_buffer(&constant(64)).is_ok());
        assert!(matches!(
            device.create_buffer(&constant(60)),
            Err(ResourceError::InvalidDescriptor(_))
        ));
        assert!(matches!(
            device.create_buffer(&constant(0)),
            Err(ResourceError::InvalidDescriptor(_))
        ));
        assert!(matches!(
            device.create_buffer_with_data(&constant(16), &[0; 32]),
            Err(ResourceError::InvalidDescriptor(_))
        ));
    }

    #[test]
    fn test_buffer_with_data_is_initialized() {
        let device = SoftDevice::default();
        let descriptor = BufferDescriptor {
            label: Some(Cow::Borrowed("vertices")),
            size: 8,
            usage: BufferUsage::VERTEX,
            ..Default::default()
        };
        let id = device.create_buffer_with_data(&descriptor, &[1, 2, 3]).unwrap();
        assert_eq!(device.read_buffer(id).unwrap(), vec![1, 2, 3, 0, 0, 0, 0, 0]);

        device.destroy_buffer(id).unwrap();
        assert!(device.read_buffer(id).is_none());
        assert!(device.destroy_buffer(id).is_err());
    }

    #[test]
    fn test_texture_creation_validates_descriptor() {
        let device = SoftDevice::default();
        let base = TextureDescriptor::render_target(16, 8, TextureFormat::Rgba8Unorm);
        assert!(device.create_texture(&base).is_ok());
        assert!(device
            .create_texture(&TextureDescriptor {
                mip_levels: 5,
                ..base.clone()
            })
            .is_ok());
        assert!(device
            .create_texture(&TextureDescriptor {
                mip_levels: 6,
                ..base.clone()
            })
            .is_err());
        assert!(device
            .create_texture(&TextureDescriptor {
                sample_count: 4,
                mip_levels: 2,
                ..base.clone()
            })
            .is_err());
        assert!(device
            .create_texture(&TextureDescriptor { width: 0, ..base })
            .is_err());
    }

    #[test]
    fn test_empty_bytecode_fails_compilation() {
        let device = SoftDevice::default();
        let result = device.create_shader(&ShaderDescriptor::new(ShaderStage::Pixel, Vec::new()));
        assert!(matches!(
            result,
            Err(ResourceError::Shader(ShaderError::CompilationError { .. }))
        ));
    }

    #[test]
    fn test_equal_pipeline_descriptors_share_one_resolution() {
        let device = SoftDevice::default();
        let vs = shader(&device, ShaderStage::Vertex);
        let ps = shader(&device, ShaderStage::Pixel);
        let descriptor = PipelineDescriptor::new(ShaderSet::graphics(vs, ps));

        let a = device.create_pipeline(&descriptor).unwrap();
        let b = device.create_pipeline(&descriptor.clone()).unwrap();
        assert_ne!(a, b);
        assert!(Arc::ptr_eq(&device.pipeline(a).unwrap(), &device.pipeline(b).unwrap()));
        assert_eq!(device.resolved_pipeline_count(), 1);
        assert_eq!(device.cached_state_counts().rasterizer, 1);
    }

    #[test]
    fn test_pipeline_shader_checks() {
        let device = SoftDevice::default();
        let vs = shader(&device, ShaderStage::Vertex);
        let ps = shader(&device, ShaderStage::Pixel);

        let swapped = PipelineDescriptor::new(ShaderSet::graphics(ps, vs));
        assert!(matches!(
            device.create_pipeline(&swapped),
            Err(ResourceError::Shader(ShaderError::StageMismatch { .. }))
        ));

        let unknown = PipelineDescriptor::new(ShaderSet::graphics(vs, ShaderId(u64::MAX)));
        assert!(matches!(
            device.create_pipeline(&unknown),
            Err(ResourceError::Shader(ShaderError::NotFound { .. }))
        ));

        let mut no_pixel = PipelineDescriptor::new(ShaderSet::graphics(vs, ps));
        no_pixel.shaders.pixel = None;
        assert!(matches!(
            device.create_pipeline(&no_pixel),
            Err(ResourceError::Pipeline(PipelineError::MissingShaderStage { .. }))
        ));
        assert_eq!(device.resolved_pipeline_count(), 0);
    }

    #[test]
    fn test_equal_samplers_share_state() {
        let device = SoftDevice::default();
        let a = device.create_sampler(&SamplerDescriptor::default()).unwrap();
        let b = device.create_sampler(&SamplerDescriptor::default()).unwrap();
        assert_ne!(a, b);
        assert_eq!(device.cached_state_counts().samplers, 1);
        device.destroy_sampler(a).unwrap();
        assert!(device.destroy_sampler(a).is_err());
    }

    #[test]
    fn test_settings_drive_labels() {
        let device = SoftDevice::new(DeviceSettings {
            debug_labels: false,
            ..DeviceSettings::default()
        });
        let descriptor = BufferDescriptor {
            label: Some(Cow::Borrowed("hidden")),
            size: 4,
            usage: BufferUsage::VERTEX,
            ..Default::default()
        };
        let id = device.create_buffer(&descriptor).unwrap();
        assert_eq!(device.internal.resources.buffer(id).unwrap().label(), None);
        assert_eq!(device.backend_type(), GraphicsBackendType::Software);
    }
}
