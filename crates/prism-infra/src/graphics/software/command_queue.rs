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

use super::command_list::SoftCommandList;
use super::device::SoftDevice;
use prism_core::renderer::{
    CommandList, CommandListState, CommandListType, CommandQueue, Fence, QueueId,
};
use prism_core::utils::sync::lock;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Allocates, submits and recycles the command lists of one queue.
///
/// Every queue of a device submits to the same immediate context; submissions of
/// one queue are serialized.
#[derive(Debug)]
pub struct SoftCommandQueue {
    id: QueueId,
    list_type: CommandListType,
    device: SoftDevice,
    available: Mutex<VecDeque<Box<SoftCommandList>>>,
    allocated: AtomicUsize,
    submit: Mutex<()>,
}

impl SoftCommandQueue {
    pub(crate) fn new(device: SoftDevice, list_type: CommandListType) -> Self {
        let id = QueueId::generate();
        log::info!("SoftCommandQueue: Created {id} ({list_type:?})");
        Self {
            id,
            list_type,
            device,
            available: Mutex::new(VecDeque::new()),
            allocated: AtomicUsize::new(0),
            submit: Mutex::new(()),
        }
    }

    /// Like [`CommandQueue::allocate`], keeping the concrete type.
    pub fn allocate_list(&self) -> Box<SoftCommandList> {
        let pooled = lock(&self.available).pop_front();
        let mut list = pooled.unwrap_or_else(|| {
            let total = self.allocated.fetch_add(1, Ordering::Relaxed) + 1;
            log::debug!("SoftCommandQueue: {} grew to {total} command lists", self.id);
            Box::new(self.device.new_command_list(self.id, self.list_type))
        });
        list.begin();
        list
    }
}

impl CommandQueue for SoftCommandQueue {
    fn id(&self) -> QueueId {
        self.id
    }

    fn list_type(&self) -> CommandListType {
        self.list_type
    }

    fn allocate(&self) -> Box<dyn CommandList> {
        self.allocate_list()
    }

    fn execute(&self, list: Box<dyn CommandList>, fence: Option<&dyn Fence>) {
        assert_eq!(
            list.list_type(),
            self.list_type,
            "{:?} command list {} submitted to a {:?} queue {}",
            list.list_type(),
            list.id(),
            self.list_type,
            self.id
        );
        assert_eq!(
            list.owner(),
            self.id,
            "{} was allocated by {} and cannot be executed on {}",
            list.id(),
            list.owner(),
            self.id
        );
        let mut list = list
            .into_any()
            .downcast::<SoftCommandList>()
            .unwrap_or_else(|_| panic!("{} received a command list of another backend", self.id));

        if list.state() == CommandListState::Recording {
            list.end();
        }
        let buffer = list
            .take_compiled()
            .unwrap_or_else(|| panic!("{} has no compiled commands to execute", list.id()));
        {
            let _submission = lock(&self.submit);
            self.device
                .immediate_context()
                .execute(&buffer, self.device.resources());
        }

        list.reset();
        lock(&self.available).push_back(list);

        if let Some(fence) = fence {
            fence.signal();
        }
    }

    fn allocated_count(&self) -> usize {
        self.allocated.load(Ordering::Relaxed)
    }

    fn pooled_count(&self) -> usize {
        lock(&self.available).len()
    }
}

impl Drop for SoftCommandQueue {
    fn drop(&mut self) {
        log::info!(
            "SoftCommandQueue: Dropping {} ({} command lists allocated, {} pooled)",
            self.id,
            self.allocated_count(),
            self.pooled_count()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::software::fence::SoftFence;
    use prism_core::math::LinearRgba;
    use prism_core::renderer::{GraphicsDevice, TextureDescriptor, TextureFormat, TextureId};

    fn target(device: &SoftDevice) -> TextureId {
        device
            .create_texture(&TextureDescriptor::render_target(2, 2, TextureFormat::Rgba8Unorm))
            .unwrap()
    }

    #[test]
    fn test_allocate_returns_recording_lists() {
        let queue = SoftDevice::default().new_command_queue(CommandListType::Graphics);
        let list = queue.allocate();
        assert_eq!(list.state(), CommandListState::Recording);
        assert_eq!(list.owner(), queue.id());
        assert_eq!(queue.allocated_count(), 1);
    }

    #[test]
    fn test_executed_lists_are_recycled() {
        let device = SoftDevice::default();
        let queue = device.new_command_queue(CommandListType::Graphics);
        let target = target(&device);

        let mut list = queue.allocate();
        let first_id = list.id();
        list.clear_render_target(target, LinearRgba::WHITE);
        queue.execute(list, None);
        assert_eq!(queue.pooled_count(), 1);

        let list = queue.allocate();
        assert_eq!(list.id(), first_id);
        assert_eq!(queue.allocated_count(), 1);
        assert_eq!(queue.pooled_count(), 0);
        assert_eq!(device.read_texture(target, 0).unwrap(), vec![255; 16]);
    }

    #[test]
    fn test_pool_grows_to_high_water_mark() {
        let queue = SoftDevice::default().new_command_queue(CommandListType::Compute);
        let lists: Vec<_> = (0..3).map(|_| Some(queue.allocate())).collect();
        queue.execute_all(lists);
        assert_eq!(queue.allocated_count(), 3);
        assert_eq!(queue.pooled_count(), 3);

        let _a = queue.allocate();
        let _b = queue.allocate();
        assert_eq!(queue.allocated_count(), 3);
    }

    #[test]
    fn test_execute_all_skips_missing_entries() {
        let device = SoftDevice::default();
        let queue = device.new_command_queue(CommandListType::Graphics);
        queue.execute_all(vec![None, Some(queue.allocate()), None]);
        assert_eq!(device.render_stats().command_lists_executed, 1);
    }

    #[test]
    fn test_fence_is_signaled_after_execution() {
        let device = SoftDevice::default();
        let queue = device.new_command_queue(CommandListType::Graphics);
        let fence = SoftFence::new();
        queue.execute(queue.allocate(), Some(&fence));
        assert!(fence.is_signaled());
    }

    #[test]
    #[should_panic(expected = "submitted to a Graphics queue")]
    fn test_type_mismatch_is_fatal() {
        let device = SoftDevice::default();
        let graphics = device.new_command_queue(CommandListType::Graphics);
        let mut list = device.new_command_list(graphics.id(), CommandListType::Compute);
        list.begin();
        graphics.execute(Box::new(list), None);
    }
}
