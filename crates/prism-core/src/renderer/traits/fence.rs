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

use crate::renderer::api::FenceId;
use std::fmt::Debug;
use std::time::Duration;

/// A CPU-visible completion signal.
pub trait Fence: Send + Sync + Debug {
    /// The fence's id.
    fn id(&self) -> FenceId;

    /// Marks the fence signaled and wakes waiters.
    fn signal(&self);

    /// Returns `true` once signaled.
    fn is_signaled(&self) -> bool;

    /// Returns the fence to the unsignaled state.
    fn reset(&self);

    /// Blocks until signaled. `None` waits forever. Returns `false` on timeout.
    fn wait(&self, timeout: Option<Duration>) -> bool;
}
