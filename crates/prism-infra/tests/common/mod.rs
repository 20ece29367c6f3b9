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

//! Shared setup for the software backend integration tests.

#![allow(dead_code)]

use prism_core::renderer::{
    BufferDescriptor, BufferId, BufferUsage, CommandListType, DescriptorClass, DescriptorLayout,
    DescriptorLayoutElement, GraphicsDevice, PipelineDescriptor, PipelineId,
    ShaderDescriptor, ShaderId, ShaderSet, ShaderStage, ShaderStageFlags,
};
use prism_infra::graphics::software::{NativeCommand, SoftCommandList, SoftCommandQueue, SoftDevice};
use std::sync::Arc;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub struct TestBed {
    pub device: SoftDevice,
    pub queue: SoftCommandQueue,
    pub vertex_shader: ShaderId,
    pub pixel_shader: ShaderId,
    pub compute_shader: ShaderId,
}

impl TestBed {
    pub fn new() -> Self {
        Self::with_device(SoftDevice::default())
    }

    pub fn with_device(device: SoftDevice) -> Self {
        init_logger();
        let shader = |stage| {
            device
                .create_shader(&ShaderDescriptor::new(stage, vec![0x44, 0x58, 0x42, 0x43]))
                .expect("shader creation should succeed")
        };
        let vertex_shader = shader(ShaderStage::Vertex);
        let pixel_shader = shader(ShaderStage::Pixel);
        let compute_shader = shader(ShaderStage::Compute);
        let queue = device.new_command_queue(CommandListType::Graphics);
        Self {
            device,
            queue,
            vertex_shader,
            pixel_shader,
            compute_shader,
        }
    }

    pub fn graphics_descriptor(&self) -> PipelineDescriptor {
        PipelineDescriptor::new(ShaderSet::graphics(self.vertex_shader, self.pixel_shader))
    }

    pub fn pipeline(&self, descriptor: &PipelineDescriptor) -> PipelineId {
        self.device
            .create_pipeline(descriptor)
            .expect("pipeline creation should succeed")
    }

    pub fn buffer(&self, size: u64, usage: BufferUsage) -> BufferId {
        self.device
            .create_buffer(&BufferDescriptor {
                size,
                usage,
                ..Default::default()
            })
            .expect("buffer creation should succeed")
    }

    pub fn list(&self) -> Box<SoftCommandList> {
        self.queue.allocate_list()
    }
}

pub fn layout(elements: &[(DescriptorClass, ShaderStageFlags)]) -> Arc<DescriptorLayout> {
    Arc::new(DescriptorLayout::new(
        elements
            .iter()
            .map(|&(class, stages)| DescriptorLayoutElement::new(class, stages)),
    ))
}

/// Names of the recorded native calls.
pub fn names(list: &SoftCommandList) -> Vec<&'static str> {
    list.recorded_commands().iter().map(NativeCommand::name).collect()
}

/// How many times a native call was recorded.
pub fn count(list: &SoftCommandList, name: &str) -> usize {
    names(list).into_iter().filter(|n| *n == name).count()
}
