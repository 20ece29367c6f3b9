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

// Prism Sandbox
// Records a handful of frames against the software backend and prints the
// resulting statistics. Pass a JSON settings file as the first argument to
// override the device limits.

use std::time::Duration;

use anyhow::{anyhow, Result};
use prism_core::math::LinearRgba;
use prism_core::renderer::*;
use prism_infra::graphics::software::SoftDevice;

const FRAMES: u32 = 3;

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct Vertex {
    position: [f32; 3],
    color: [f32; 3],
}

const VERTICES: &[Vertex] = &[
    Vertex {
        position: [0.0, 0.5, 0.0],
        color: [1.0, 0.0, 0.0],
    },
    Vertex {
        position: [-0.5, -0.5, 0.0],
        color: [0.0, 1.0, 0.0],
    },
    Vertex {
        position: [0.5, -0.5, 0.0],
        color: [0.0, 0.0, 1.0],
    },
];

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct FrameConstants {
    tint: [f32; 4],
}

struct Scene {
    pipeline: PipelineId,
    vertex_buffer: BufferId,
    constants: BufferId,
    material: DescriptorSet,
}

impl Scene {
    fn new(device: &SoftDevice) -> Result<Self> {
        log::info!("Sandbox: Initializing GPU resources...");

        // --- Step 1: Shaders ---
        let vertex = device.create_shader(&ShaderDescriptor {
            label: Some("sandbox_vs".into()),
            ..ShaderDescriptor::new(ShaderStage::Vertex, &b"DXBC-sandbox-vs"[..])
        })?;
        let pixel = device.create_shader(&ShaderDescriptor {
            label: Some("sandbox_ps".into()),
            ..ShaderDescriptor::new(ShaderStage::Pixel, &b"DXBC-sandbox-ps"[..])
        })?;

        // --- Step 2: Buffers ---
        let vertex_buffer = device.create_buffer_with_data(
            &BufferDescriptor {
                label: Some("triangle_vertices".into()),
                size: std::mem::size_of_val(VERTICES) as u64,
                usage: BufferUsage::VERTEX,
                ..Default::default()
            },
            bytemuck::cast_slice(VERTICES),
        )?;
        let constants = device.create_buffer(&BufferDescriptor {
            label: Some("frame_constants".into()),
            size: std::mem::size_of::<FrameConstants>() as u64,
            usage: BufferUsage::CONSTANT,
            ..Default::default()
        })?;

        // --- Step 3: Descriptor layout and pipeline ---
        let layout = device.create_descriptor_layout(&[
            DescriptorLayoutElement::new(DescriptorClass::Constant, ShaderStageFlags::VERTEX_PIXEL),
            DescriptorLayoutElement::new(DescriptorClass::Sampler, ShaderStageFlags::PIXEL),
        ]);
        let sampler = device.create_sampler(&SamplerDescriptor::default())?;
        let material = device
            .create_descriptor_set(&layout)
            .with_resource(0, constants)
            .with_resource(1, sampler);

        let mut descriptor = PipelineDescriptor::new(ShaderSet::graphics(vertex, pixel));
        descriptor.vertex_layout = VertexLayout {
            buffers: vec![VertexBufferLayout::packed(&[
                ("POSITION", VertexFormat::Float32x3),
                ("COLOR", VertexFormat::Float32x3),
            ])],
        };
        descriptor.descriptor_layouts.push(layout);
        let pipeline = device.create_pipeline(&descriptor)?;
        log::info!(" -> Pipeline created: {pipeline}");

        Ok(Self {
            pipeline,
            vertex_buffer,
            constants,
            material,
        })
    }

    fn record(&self, list: &mut dyn CommandList, target: TextureId, size: (u32, u32), frame: u32) {
        let (width, height) = size;
        let pulse = frame as f32 / FRAMES as f32;
        list.set_render_targets(&[target], None);
        list.set_viewport(&Viewport::from_size(width as f32, height as f32), 0);
        list.clear_render_target(target, LinearRgba::rgb(0.1, 0.1, 0.15));

        list.set_pipeline(self.pipeline);
        list.write_resource_pod(
            self.constants,
            &[FrameConstants {
                tint: [1.0, pulse, pulse, 1.0],
            }],
        );
        list.set_descriptor_set(0, &self.material);
        list.set_vertex_buffer(self.vertex_buffer, 0, 0);
        list.draw(VERTICES.len() as u32, 1, 0, 0);
    }
}

fn load_settings() -> Result<DeviceSettings> {
    match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Sandbox: Loading device settings from '{path}'");
            DeviceSettings::from_file(&path).map_err(|err| anyhow!("{path}: {err}"))
        }
        None => Ok(DeviceSettings::default()),
    }
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let device = SoftDevice::new(load_settings()?);
    let scene = Scene::new(&device)?;
    let queue = device.create_command_queue(CommandListType::Graphics);
    let fence = device.create_fence();
    let mut swap_chain = device.create_swap_chain(&SwapChainDescriptor::new(320, 240))?;

    for frame in 0..FRAMES {
        let mut list = queue.allocate();
        scene.record(list.as_mut(), swap_chain.back_buffer(), swap_chain.size(), frame);

        fence.reset();
        queue.execute(list, Some(fence.as_ref()));
        if !fence.wait(Some(Duration::from_secs(1))) {
            return Err(anyhow!("frame {frame} did not complete"));
        }
        swap_chain.present()?;
    }

    let stats = device.render_stats();
    log::info!(
        "Sandbox: {} lists, {} draws, {} triangles, {} clears, {} transfers",
        stats.command_lists_executed,
        stats.draw_calls,
        stats.triangles,
        stats.clears,
        stats.transfers
    );
    log::info!("Sandbox: cached states {:?}", device.cached_state_counts());
    log::info!(
        "Sandbox: queue allocated {} list(s), {} pooled",
        queue.allocated_count(),
        queue.pooled_count()
    );

    Ok(())
}
