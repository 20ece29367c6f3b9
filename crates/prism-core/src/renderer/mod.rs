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

//! Provides the public, backend-agnostic rendering contracts.
//!
//! The abstract `traits` (like [`GraphicsDevice`] and [`CommandList`]), the data
//! structures consumed by them (like [`PipelineDescriptor`]) and the error types
//! form the API application code is written against. A concrete backend in
//! `prism-infra` implements the traits.

pub mod api;
pub mod cache;
pub mod error;
pub mod traits;

pub use self::api::*;
pub use self::cache::StateCache;
pub use self::error::{PipelineError, RenderError, ResourceError, ShaderError};
pub use self::traits::{
    CommandList, CommandListExt, CommandListState, CommandQueue, Fence, GraphicsDevice, SwapChain,
};
