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

use crate::renderer::api::{SwapChainId, TextureFormat, TextureId};
use crate::renderer::error::{RenderError, ResourceError};
use std::fmt::Debug;

/// A chain of presentable back buffers.
pub trait SwapChain: Send + Debug {
    /// The swap chain's id.
    fn id(&self) -> SwapChainId;

    /// The texture to render into this frame.
    fn back_buffer(&self) -> TextureId;

    /// Back buffer size in pixels.
    fn size(&self) -> (u32, u32);

    /// Back buffer format.
    fn format(&self) -> TextureFormat;

    /// Presents the current back buffer and advances to the next one.
    fn present(&mut self) -> Result<(), RenderError>;

    /// Recreates the back buffers at a new size. The buffers get new ids.
    fn resize(&mut self, width: u32, height: u32) -> Result<(), ResourceError>;
}
