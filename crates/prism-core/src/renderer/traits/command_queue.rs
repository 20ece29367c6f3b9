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

use crate::renderer::api::{CommandListType, QueueId};
use crate::renderer::traits::{CommandList, Fence};
use std::fmt::Debug;

/// Owns and recycles command lists and submits them to a device.
pub trait CommandQueue: Send + Sync + Debug {
    /// The queue's id. Lists remember it as their owner.
    fn id(&self) -> QueueId;

    /// The kind of lists this queue accepts.
    fn list_type(&self) -> CommandListType;

    /// Returns a list in the `Recording` state, reused from the pool when possible.
    fn allocate(&self) -> Box<dyn CommandList>;

    /// Submits `list`, recycles it and signals `fence` once the work is done.
    ///
    /// # Panics
    ///
    /// If the list was allocated by another queue or its type does not match.
    fn execute(&self, list: Box<dyn CommandList>, fence: Option<&dyn Fence>);

    /// Executes every present list in order. `None` entries are skipped.
    fn execute_all(&self, lists: Vec<Option<Box<dyn CommandList>>>) {
        for list in lists.into_iter().flatten() {
            self.execute(list, None);
        }
    }

    /// Number of lists created by this queue so far.
    fn allocated_count(&self) -> usize;

    /// Number of lists waiting in the reuse pool.
    fn pooled_count(&self) -> usize;
}
