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

mod common;

use common::{count, layout, names, TestBed};
use prism_core::renderer::{
    BindingResource, BufferUsage, CommandList, DescriptorClass, DescriptorSet, GraphicsDevice,
    IndexFormat,
    PrimitiveTopology, Rect, SamplerDescriptor, ShaderStage, ShaderStageFlags, TextureDescriptor,
    TextureFormat, VertexBufferLayout, VertexFormat, VertexLayout, Viewport,
};
use prism_infra::graphics::software::NativeCommand;

#[test]
fn test_repeated_set_calls_record_once() {
    // --- 1. ARRANGE ---
    let bed = TestBed::new();
    let pipeline = bed.pipeline(&bed.graphics_descriptor());
    let vertices = bed.buffer(256, BufferUsage::VERTEX);
    let indices = bed.buffer(64, BufferUsage::INDEX);
    let viewport = Viewport::from_size(640.0, 480.0);
    let scissor = Rect::new(0, 0, 640, 480);
    let mut list = bed.list();

    // --- 2. ACT ---
    for _ in 0..3 {
        list.set_pipeline(pipeline);
        list.set_vertex_buffer(vertices, 0, 0);
        list.set_viewport(&viewport, 0);
        list.set_scissor(&scissor, 0);
    }
    list.set_index_buffer(indices, IndexFormat::Uint16, 0);
    list.draw(3, 1, 0, 0);
    list.draw(3, 1, 3, 0);

    // --- 3. ASSERT ---
    assert_eq!(count(&list, "SetShader"), 5, "Each graphics stage is bound once");
    assert_eq!(count(&list, "SetRasterizerState"), 1);
    assert_eq!(count(&list, "SetBlendState"), 1);
    assert_eq!(count(&list, "SetDepthStencilState"), 1);
    assert_eq!(count(&list, "SetVertexBuffers"), 1);
    assert_eq!(count(&list, "SetViewports"), 1);
    assert_eq!(count(&list, "SetScissorRects"), 1);
    assert_eq!(count(&list, "Draw"), 2);
}

#[test]
fn test_pipelines_with_equal_descriptors_are_not_rebound() {
    // --- 1. ARRANGE ---
    let bed = TestBed::new();
    let reads = [(DescriptorClass::Read, ShaderStageFlags::PIXEL)];
    let mut first = bed.graphics_descriptor();
    first.descriptor_layouts.push(layout(&reads));
    let mut second = bed.graphics_descriptor();
    second.descriptor_layouts.push(layout(&reads));

    let a = bed.pipeline(&first);
    let b = bed.pipeline(&second);
    let mut list = bed.list();

    // --- 2. ACT ---
    list.set_pipeline(a);
    let after_first = list.recorded_commands().len();
    list.set_pipeline(b);

    // --- 3. ASSERT ---
    assert_ne!(a, b, "Every create call returns a fresh id");
    assert_eq!(bed.device.resolved_pipeline_count(), 1);
    assert_eq!(
        list.recorded_commands().len(),
        after_first,
        "A pipeline equal by value must not record anything"
    );
}

#[test]
fn test_pipeline_switch_only_rebinds_what_changed() {
    // --- 1. ARRANGE ---
    let bed = TestBed::new();
    let base = bed.graphics_descriptor();
    let mut lines = base.clone();
    lines.topology = PrimitiveTopology::LineList;
    let a = bed.pipeline(&base);
    let b = bed.pipeline(&lines);
    let mut list = bed.list();
    list.set_pipeline(a);
    let before = list.recorded_commands().len();

    // --- 2. ACT ---
    list.set_pipeline(b);

    // --- 3. ASSERT ---
    let switched: Vec<_> = names(&list)[before..].to_vec();
    assert!(switched.contains(&"SetPrimitiveTopology"));
    assert!(
        !switched.contains(&"SetRasterizerState")
            && !switched.contains(&"SetBlendState")
            && !switched.contains(&"SetDepthStencilState"),
        "Shared fixed-function state must not be rebound: {switched:?}"
    );
}

#[test]
fn test_descriptor_slots_follow_layout_offsets() {
    // --- 1. ARRANGE ---
    let bed = TestBed::new();
    let pixel = ShaderStageFlags::PIXEL;
    let a = layout(&[
        (DescriptorClass::Constant, pixel),
        (DescriptorClass::Constant, pixel),
        (DescriptorClass::Sampler, pixel),
    ]);
    let b = layout(&[
        (DescriptorClass::Read, pixel),
        (DescriptorClass::Read, pixel),
        (DescriptorClass::ReadWrite, pixel),
    ]);
    let c = layout(&[
        (DescriptorClass::Constant, pixel),
        (DescriptorClass::Read, pixel),
        (DescriptorClass::Sampler, pixel),
        (DescriptorClass::Sampler, pixel),
    ]);
    let mut descriptor = bed.graphics_descriptor();
    descriptor.descriptor_layouts = vec![a, b, c.clone()];
    let pipeline = bed.pipeline(&descriptor);

    let constants = bed.buffer(256, BufferUsage::CONSTANT);
    let texture = bed
        .device
        .create_texture(&TextureDescriptor::render_target(4, 4, TextureFormat::Rgba8Unorm))
        .expect("texture creation should succeed");
    let sampler = bed
        .device
        .create_sampler(&SamplerDescriptor::default())
        .expect("sampler creation should succeed");
    let set = DescriptorSet::new(c)
        .with_resource(0, constants)
        .with_resource(1, texture)
        .with_resource(2, sampler)
        .with_resource(3, sampler);

    let mut list = bed.list();
    list.set_pipeline(pipeline);
    let before = list.recorded_commands().len();

    // --- 2. ACT ---
    list.set_descriptor_set(2, &set);

    // --- 3. ASSERT ---
    let expected = vec![
        NativeCommand::SetConstantBuffer {
            stage: ShaderStage::Pixel,
            slot: 2,
            buffer: constants,
        },
        NativeCommand::SetShaderResource {
            stage: ShaderStage::Pixel,
            slot: 2,
            resource: BindingResource::Texture(texture),
        },
        NativeCommand::SetSampler {
            stage: ShaderStage::Pixel,
            slot: 1,
            sampler,
        },
        NativeCommand::SetSampler {
            stage: ShaderStage::Pixel,
            slot: 2,
            sampler,
        },
    ];
    assert_eq!(
        &list.recorded_commands()[before..],
        expected.as_slice(),
        "Slots are the per-class prefix sums of the lower layouts plus the element slot"
    );
}

#[test]
fn test_two_layout_binding_scenario() {
    // --- 1. ARRANGE ---
    let bed = TestBed::new();
    let material = layout(&[
        (DescriptorClass::Constant, ShaderStageFlags::VERTEX),
        (DescriptorClass::Constant, ShaderStageFlags::VERTEX),
        (DescriptorClass::Sampler, ShaderStageFlags::PIXEL),
    ]);
    let textures = layout(&[(DescriptorClass::Read, ShaderStageFlags::PIXEL)]);
    let mut descriptor = bed.graphics_descriptor();
    descriptor.descriptor_layouts = vec![material.clone(), textures.clone()];
    let pipeline = bed.pipeline(&descriptor);

    let albedo = bed
        .device
        .create_texture(&TextureDescriptor::render_target(8, 8, TextureFormat::Rgba8Unorm))
        .expect("texture creation should succeed");
    let sampler = bed
        .device
        .create_sampler(&SamplerDescriptor::default())
        .expect("sampler creation should succeed");
    let texture_set = bed.device.create_descriptor_set(&textures).with_resource(0, albedo);
    let mut material_set = bed.device.create_descriptor_set(&material);
    material_set.set_resource(2, Some(sampler.into()));

    let mut list = bed.list();
    list.set_pipeline(pipeline);
    let before = list.recorded_commands().len();

    // --- 2. ACT ---
    list.set_descriptor_set(1, &texture_set);
    list.set_descriptor_set(0, &material_set);

    // --- 3. ASSERT ---
    assert_eq!(
        &list.recorded_commands()[before..],
        &[
            NativeCommand::SetShaderResource {
                stage: ShaderStage::Pixel,
                slot: 0,
                resource: BindingResource::Texture(albedo),
            },
            NativeCommand::SetSampler {
                stage: ShaderStage::Pixel,
                slot: 0,
                sampler,
            },
        ]
    );
}

#[test]
fn test_descriptor_visible_to_two_stages_binds_both() {
    // --- 1. ARRANGE ---
    let bed = TestBed::new();
    let shared = layout(&[(DescriptorClass::Constant, ShaderStageFlags::VERTEX_PIXEL)]);
    let mut descriptor = bed.graphics_descriptor();
    descriptor.descriptor_layouts = vec![shared.clone()];
    let pipeline = bed.pipeline(&descriptor);
    let constants = bed.buffer(64, BufferUsage::CONSTANT);
    let set = DescriptorSet::new(shared).with_resource(0, constants);
    let mut list = bed.list();
    list.set_pipeline(pipeline);

    // --- 2. ACT ---
    list.set_descriptor_set(0, &set);

    // --- 3. ASSERT ---
    let stages: Vec<ShaderStage> = list
        .recorded_commands()
        .iter()
        .filter_map(|command| match command {
            NativeCommand::SetConstantBuffer { stage, .. } => Some(*stage),
            _ => None,
        })
        .collect();
    assert_eq!(stages, vec![ShaderStage::Vertex, ShaderStage::Pixel]);
}

#[test]
fn test_instanced_form_depends_on_instance_parameters() {
    // --- 1. ARRANGE ---
    let bed = TestBed::new();
    let pipeline = bed.pipeline(&bed.graphics_descriptor());
    let mut list = bed.list();
    list.set_pipeline(pipeline);

    // --- 2. ACT ---
    list.draw(10, 1, 0, 0);
    list.draw(10, 4, 0, 0);
    list.draw(10, 1, 0, 2);

    // --- 3. ASSERT ---
    let draws: Vec<_> = list
        .recorded_commands()
        .iter()
        .filter(|command| command.name().starts_with("Draw"))
        .cloned()
        .collect();
    assert_eq!(
        draws,
        vec![
            NativeCommand::Draw {
                vertex_count: 10,
                vertex_start: 0,
            },
            NativeCommand::DrawInstanced {
                vertex_count: 10,
                instance_count: 4,
                vertex_start: 0,
                instance_start: 0,
            },
            NativeCommand::DrawInstanced {
                vertex_count: 10,
                instance_count: 1,
                vertex_start: 0,
                instance_start: 2,
            },
        ]
    );
}

#[test]
fn test_vertex_stride_comes_from_the_pipeline() {
    // --- 1. ARRANGE ---
    let bed = TestBed::new();
    let mut descriptor = bed.graphics_descriptor();
    descriptor.vertex_layout = VertexLayout {
        buffers: vec![
            VertexBufferLayout::packed(&[
                ("POSITION", VertexFormat::Float32x3),
                ("NORMAL", VertexFormat::Float32x3),
            ]),
            VertexBufferLayout::packed(&[("TEXCOORD", VertexFormat::Float32x2)]),
        ],
    };
    let pipeline = bed.pipeline(&descriptor);
    let positions = bed.buffer(240, BufferUsage::VERTEX);
    let uvs = bed.buffer(80, BufferUsage::VERTEX);
    let mut list = bed.list();

    // --- 2. ACT ---
    list.set_pipeline(pipeline);
    list.set_vertex_buffer(uvs, 1, 8);
    list.set_vertex_buffer(positions, 0, 0);
    list.draw(3, 1, 0, 0);

    // --- 3. ASSERT ---
    let bindings = list
        .recorded_commands()
        .iter()
        .find_map(|command| match command {
            NativeCommand::SetVertexBuffers {
                start_slot,
                bindings,
            } => Some((*start_slot, bindings.clone())),
            _ => None,
        })
        .expect("vertex buffers should be flushed before the draw");
    assert_eq!(bindings.0, 0);
    let strides: Vec<u32> = bindings.1.iter().map(|b| b.stride).collect();
    let offsets: Vec<u32> = bindings.1.iter().map(|b| b.offset).collect();
    assert_eq!(strides, vec![24, 8]);
    assert_eq!(offsets, vec![0, 8]);
}

#[test]
#[should_panic(expected = "does not use the pipeline's layout")]
fn test_descriptor_set_with_foreign_layout_is_fatal() {
    let bed = TestBed::new();
    let mut descriptor = bed.graphics_descriptor();
    descriptor.descriptor_layouts = vec![layout(&[(
        DescriptorClass::Read,
        ShaderStageFlags::PIXEL,
    )])];
    let pipeline = bed.pipeline(&descriptor);
    let other = DescriptorSet::new(layout(&[(
        DescriptorClass::Sampler,
        ShaderStageFlags::PIXEL,
    )]));

    let mut list = bed.list();
    list.set_pipeline(pipeline);
    list.set_descriptor_set(0, &other);
}

#[test]
#[should_panic(expected = "out of range")]
fn test_descriptor_set_index_beyond_layouts_is_fatal() {
    let bed = TestBed::new();
    let pipeline = bed.pipeline(&bed.graphics_descriptor());
    let set = DescriptorSet::new(layout(&[(DescriptorClass::Read, ShaderStageFlags::PIXEL)]));

    let mut list = bed.list();
    list.set_pipeline(pipeline);
    list.set_descriptor_set(0, &set);
}
