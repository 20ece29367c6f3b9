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

//! Defines the core architectural traits for the rendering subsystem.
//!
//! - [`GraphicsDevice`]: The factory for every GPU object.
//! - [`CommandList`]: Records GPU work with redundant state elimination.
//! - [`CommandQueue`]: Pools command lists and submits them.
//! - [`Fence`]: Signals completion of submitted work.
//! - [`SwapChain`]: Presentable back buffers.

mod command_list;
mod command_queue;
mod fence;
mod graphics_device;
mod swap_chain;

pub use self::command_list::{CommandList, CommandListExt, CommandListState};
pub use self::command_queue::CommandQueue;
pub use self::fence::Fence;
pub use self::graphics_device::GraphicsDevice;
pub use self::swap_chain::SwapChain;
