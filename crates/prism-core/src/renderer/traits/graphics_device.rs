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

use crate::renderer::api::*;
use crate::renderer::error::ResourceError;
use crate::renderer::traits::{CommandList, CommandQueue, Fence, SwapChain};
use std::fmt::Debug;
use std::sync::Arc;

/// The factory every graphics backend implements.
///
/// Resources are addressed by id. A device owns the objects behind those ids as
/// well as the caches that let equal descriptions share one native object.
pub trait GraphicsDevice: Send + Sync + Debug + 'static {
    /// The backend implementing this device.
    fn backend_type(&self) -> GraphicsBackendType;

    /// The settings the device was created with.
    fn settings(&self) -> &DeviceSettings;

    /// Creates a new GPU buffer.
    /// ## Arguments
    /// * `descriptor` - A reference to a `BufferDescriptor` containing the buffer configuration.
    /// ## Returns
    /// A `Result` containing the ID of the created buffer or an error if the creation fails.
    fn create_buffer(&self, descriptor: &BufferDescriptor) -> Result<BufferId, ResourceError>;

    /// Creates a new GPU buffer and initializes it with the provided data.
    /// ## Arguments
    /// * `descriptor` - A reference to a `BufferDescriptor` containing the buffer configuration.
    /// * `data` - Initial contents. Must not be larger than the buffer.
    /// ## Returns
    /// A `Result` containing the ID of the created buffer or an error if the creation fails.
    fn create_buffer_with_data(
        &self,
        descriptor: &BufferDescriptor,
        data: &[u8],
    ) -> Result<BufferId, ResourceError>;

    /// Destroys a GPU buffer.
    /// ## Arguments
    /// * `id` - The ID of the buffer to be destroyed.
    /// ## Returns
    /// A `Result` indicating success or failure of the operation.
    fn destroy_buffer(&self, id: BufferId) -> Result<(), ResourceError>;

    /// Creates a new GPU texture.
    /// ## Arguments
    /// * `descriptor` - A reference to a `TextureDescriptor` containing the texture configuration.
    /// ## Returns
    /// A `Result` containing the ID of the created texture or an error if the creation fails.
    fn create_texture(&self, descriptor: &TextureDescriptor) -> Result<TextureId, ResourceError>;

    /// Destroys a GPU texture.
    fn destroy_texture(&self, id: TextureId) -> Result<(), ResourceError>;

    /// Creates a sampler. Equal descriptors may share one native sampler.
    fn create_sampler(&self, descriptor: &SamplerDescriptor) -> Result<SamplerId, ResourceError>;

    /// Destroys a sampler.
    fn destroy_sampler(&self, id: SamplerId) -> Result<(), ResourceError>;

    /// Creates a shader module from precompiled bytecode.
    /// ## Errors
    /// * `ResourceError::Shader` - If the backend rejects the bytecode.
    fn create_shader(&self, descriptor: &ShaderDescriptor) -> Result<ShaderId, ResourceError>;

    /// Destroys a shader module. Pipelines already created with it stay valid.
    fn destroy_shader(&self, id: ShaderId) -> Result<(), ResourceError>;

    /// Creates a pipeline.
    ///
    /// The resolved pipeline is cached by descriptor value: an equal descriptor gets a
    /// new id backed by the same resolved object.
    /// ## Errors
    /// * `ResourceError::Pipeline` - If the descriptor is structurally invalid.
    /// * `ResourceError::Shader` - If a referenced shader is unknown or bound to the wrong stage.
    fn create_pipeline(&self, descriptor: &PipelineDescriptor) -> Result<PipelineId, ResourceError>;

    /// Releases a pipeline id.
    fn destroy_pipeline(&self, id: PipelineId) -> Result<(), ResourceError>;

    /// Creates a descriptor layout from its elements.
    fn create_descriptor_layout(
        &self,
        elements: &[DescriptorLayoutElement],
    ) -> Arc<DescriptorLayout> {
        Arc::new(DescriptorLayout::new(elements.iter().copied()))
    }

    /// Creates an empty descriptor set for `layout`.
    fn create_descriptor_set(&self, layout: &Arc<DescriptorLayout>) -> DescriptorSet {
        DescriptorSet::new(Arc::clone(layout))
    }

    /// Creates an idle command list owned by `queue`.
    ///
    /// Applications normally get lists from [`CommandQueue::allocate`], which pools them.
    fn create_command_list(&self, queue: QueueId, list_type: CommandListType)
        -> Box<dyn CommandList>;

    /// Creates a command queue submitting to this device's immediate context.
    fn create_command_queue(&self, list_type: CommandListType) -> Box<dyn CommandQueue>;

    /// Creates an unsignaled fence.
    fn create_fence(&self) -> Arc<dyn Fence>;

    /// Creates a swap chain.
    fn create_swap_chain(
        &self,
        descriptor: &SwapChainDescriptor,
    ) -> Result<Box<dyn SwapChain>, ResourceError>;

    /// Statistics accumulated by the immediate context since creation.
    fn render_stats(&self) -> RenderStats;
}
