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

//! A backend emulating the Direct3D 11 execution model in system memory.
//!
//! Command lists record into per-list deferred contexts; queues execute the
//! finished command buffers on the device's single immediate context, which also
//! owns resource mapping.

mod command_list;
mod command_queue;
mod commands;
mod context;
mod device;
mod fence;
mod pipeline;
mod resources;
mod states;
mod swap_chain;

pub use self::command_list::SoftCommandList;
pub use self::command_queue::SoftCommandQueue;
pub use self::commands::{NativeCommand, VertexBufferBinding};
pub use self::context::{CommandBuffer, DeferredContext, ImmediateContext};
pub use self::device::SoftDevice;
pub use self::fence::SoftFence;
pub use self::pipeline::{CachedStateCounts, GraphicsState, SoftPipeline};
pub use self::resources::{SamplerState, SoftBuffer, SoftShader, SoftTexture};
pub use self::states::{BlendState, DepthStencilState, InputLayout, RasterizerState};
pub use self::swap_chain::SoftSwapChain;
