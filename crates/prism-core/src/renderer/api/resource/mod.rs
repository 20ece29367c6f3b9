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

//! GPU resource ids and the descriptors used to create them.

mod buffer;
mod id;
mod sampler;
mod shader;
mod texture;

pub use self::buffer::{BufferDescriptor, BufferUsage, CpuAccess};
pub use self::id::*;
pub use self::sampler::{AddressMode, FilterMode, SamplerDescriptor};
pub use self::shader::ShaderDescriptor;
pub use self::texture::{SwapChainDescriptor, TextureDescriptor, TextureDimension, TextureUsage};

/// A buffer or texture, for operations that accept either (mapping, updates).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GpuResource {
    /// A buffer resource.
    Buffer(BufferId),
    /// A texture resource.
    Texture(TextureId),
}

impl From<BufferId> for GpuResource {
    fn from(id: BufferId) -> Self {
        GpuResource::Buffer(id)
    }
}

impl From<TextureId> for GpuResource {
    fn from(id: TextureId) -> Self {
        GpuResource::Texture(id)
    }
}

impl std::fmt::Display for GpuResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GpuResource::Buffer(id) => write!(f, "{id}"),
            GpuResource::Texture(id) => write!(f, "{id}"),
        }
    }
}
