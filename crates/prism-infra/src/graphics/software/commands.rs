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

//! The native command stream recorded by deferred contexts.
//!
//! Each variant corresponds to one Direct3D 11 context call.

use super::states::{BlendState, DepthStencilState, InputLayout, RasterizerState};
use prism_core::math::LinearRgba;
use prism_core::renderer::{
    BindingResource, BufferId, ClearFlags, GpuResource, IndexFormat, PrimitiveTopology, Rect,
    ResourceRegion, SamplerId, ShaderId, ShaderStage, TextureFormat, TextureId, Viewport,
};
use std::sync::Arc;

/// One slot of an `IASetVertexBuffers` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexBufferBinding {
    /// The bound buffer, `None` to unbind the slot.
    pub buffer: Option<BufferId>,
    /// Element stride taken from the pipeline's vertex layout.
    pub stride: u32,
    /// Byte offset of the first element.
    pub offset: u32,
}

/// A recorded context call.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeCommand {
    /// `XXSetShader`.
    SetShader {
        /// Stage.
        stage: ShaderStage,
        /// Shader, `None` to unbind the stage.
        shader: Option<ShaderId>,
    },
    /// `IASetInputLayout`.
    SetInputLayout(Option<Arc<InputLayout>>),
    /// `IASetPrimitiveTopology`.
    SetPrimitiveTopology(PrimitiveTopology),
    /// `RSSetState`.
    SetRasterizerState(Arc<RasterizerState>),
    /// `OMSetBlendState`.
    SetBlendState {
        /// State object.
        state: Arc<BlendState>,
        /// Blend constant.
        blend_factor: LinearRgba,
        /// Coverage mask.
        sample_mask: u32,
    },
    /// `OMSetDepthStencilState`.
    SetDepthStencilState {
        /// State object.
        state: Arc<DepthStencilState>,
        /// Stencil reference.
        stencil_reference: u32,
    },
    /// `IASetVertexBuffers` over a contiguous slot range.
    SetVertexBuffers {
        /// First slot.
        start_slot: u32,
        /// One binding per slot from `start_slot`.
        bindings: Vec<VertexBufferBinding>,
    },
    /// `IASetIndexBuffer`.
    SetIndexBuffer {
        /// Buffer.
        buffer: BufferId,
        /// Index width.
        format: IndexFormat,
        /// Byte offset.
        offset: u32,
    },
    /// `RSSetViewports` with the whole array.
    SetViewports(Vec<Viewport>),
    /// `RSSetScissorRects` with the whole array.
    SetScissorRects(Vec<Rect>),
    /// `OMSetRenderTargets`.
    SetRenderTargets {
        /// Color targets in slot order.
        colors: Vec<TextureId>,
        /// Depth/stencil target.
        depth: Option<TextureId>,
    },
    /// `XXSetConstantBuffers` for one slot.
    SetConstantBuffer {
        /// Stage.
        stage: ShaderStage,
        /// Flat slot.
        slot: u32,
        /// Buffer.
        buffer: BufferId,
    },
    /// `XXSetShaderResources` for one slot.
    SetShaderResource {
        /// Stage.
        stage: ShaderStage,
        /// Flat slot.
        slot: u32,
        /// Buffer or texture.
        resource: BindingResource,
    },
    /// `CSSetUnorderedAccessViews` or `OMSetRenderTargetsAndUnorderedAccessViews` for one slot.
    SetUnorderedAccess {
        /// Stage.
        stage: ShaderStage,
        /// Flat slot.
        slot: u32,
        /// Buffer or texture.
        resource: BindingResource,
    },
    /// `XXSetSamplers` for one slot.
    SetSampler {
        /// Stage.
        stage: ShaderStage,
        /// Flat slot.
        slot: u32,
        /// Sampler.
        sampler: SamplerId,
    },
    /// `ClearRenderTargetView`.
    ClearRenderTarget {
        /// Target.
        target: TextureId,
        /// Clear color.
        color: LinearRgba,
    },
    /// `ClearDepthStencilView`.
    ClearDepthStencil {
        /// Target.
        target: TextureId,
        /// Aspects to clear.
        flags: ClearFlags,
        /// Depth value.
        depth: f32,
        /// Stencil value.
        stencil: u8,
    },
    /// `Draw`.
    Draw {
        /// Vertices.
        vertex_count: u32,
        /// First vertex.
        vertex_start: u32,
    },
    /// `DrawInstanced`.
    DrawInstanced {
        /// Vertices per instance.
        vertex_count: u32,
        /// Instances.
        instance_count: u32,
        /// First vertex.
        vertex_start: u32,
        /// First instance.
        instance_start: u32,
    },
    /// `DrawIndexed`.
    DrawIndexed {
        /// Indices.
        index_count: u32,
        /// First index.
        index_start: u32,
        /// Value added to each index.
        base_vertex: i32,
    },
    /// `DrawIndexedInstanced`.
    DrawIndexedInstanced {
        /// Indices per instance.
        index_count: u32,
        /// Instances.
        instance_count: u32,
        /// First index.
        index_start: u32,
        /// Value added to each index.
        base_vertex: i32,
        /// First instance.
        instance_start: u32,
    },
    /// `Dispatch`.
    Dispatch {
        /// Groups along X.
        x: u32,
        /// Groups along Y.
        y: u32,
        /// Groups along Z.
        z: u32,
    },
    /// `UpdateSubresource`.
    UpdateSubresource {
        /// Destination.
        resource: GpuResource,
        /// Destination subresource.
        subresource: u32,
        /// Destination box, `None` for the whole subresource.
        region: Option<ResourceRegion>,
        /// Source bytes.
        data: Arc<[u8]>,
        /// Source row pitch.
        row_pitch: u32,
        /// Source depth pitch.
        depth_pitch: u32,
    },
    /// `CopySubresourceRegion` of a whole subresource.
    CopySubresource {
        /// Source texture.
        source: TextureId,
        /// Source subresource.
        source_subresource: u32,
        /// Destination texture.
        destination: TextureId,
        /// Destination subresource.
        destination_subresource: u32,
    },
    /// `ResolveSubresource`.
    ResolveSubresource {
        /// Multisampled source.
        source: TextureId,
        /// Source subresource.
        source_subresource: u32,
        /// Single-sampled destination.
        destination: TextureId,
        /// Destination subresource.
        destination_subresource: u32,
        /// Format the samples are interpreted as.
        format: TextureFormat,
    },
}

impl NativeCommand {
    /// The name of the context call, for logs and tests.
    pub fn name(&self) -> &'static str {
        match self {
            NativeCommand::SetShader { .. } => "SetShader",
            NativeCommand::SetInputLayout(_) => "SetInputLayout",
            NativeCommand::SetPrimitiveTopology(_) => "SetPrimitiveTopology",
            NativeCommand::SetRasterizerState(_) => "SetRasterizerState",
            NativeCommand::SetBlendState { .. } => "SetBlendState",
            NativeCommand::SetDepthStencilState { .. } => "SetDepthStencilState",
            NativeCommand::SetVertexBuffers { .. } => "SetVertexBuffers",
            NativeCommand::SetIndexBuffer { .. } => "SetIndexBuffer",
            NativeCommand::SetViewports(_) => "SetViewports",
            NativeCommand::SetScissorRects(_) => "SetScissorRects",
            NativeCommand::SetRenderTargets { .. } => "SetRenderTargets",
            NativeCommand::SetConstantBuffer { .. } => "SetConstantBuffer",
            NativeCommand::SetShaderResource { .. } => "SetShaderResource",
            NativeCommand::SetUnorderedAccess { .. } => "SetUnorderedAccess",
            NativeCommand::SetSampler { .. } => "SetSampler",
            NativeCommand::ClearRenderTarget { .. } => "ClearRenderTarget",
            NativeCommand::ClearDepthStencil { .. } => "ClearDepthStencil",
            NativeCommand::Draw { .. } => "Draw",
            NativeCommand::DrawInstanced { .. } => "DrawInstanced",
            NativeCommand::DrawIndexed { .. } => "DrawIndexed",
            NativeCommand::DrawIndexedInstanced { .. } => "DrawIndexedInstanced",
            NativeCommand::Dispatch { .. } => "Dispatch",
            NativeCommand::UpdateSubresource { .. } => "UpdateSubresource",
            NativeCommand::CopySubresource { .. } => "CopySubresource",
            NativeCommand::ResolveSubresource { .. } => "ResolveSubresource",
        }
    }

    /// Returns `true` for the four draw forms.
    pub fn is_draw(&self) -> bool {
        matches!(
            self,
            NativeCommand::Draw { .. }
                | NativeCommand::DrawInstanced { .. }
                | NativeCommand::DrawIndexed { .. }
                | NativeCommand::DrawIndexedInstanced { .. }
        )
    }

    /// Returns `true` for calls that change pipeline or binding state.
    pub fn is_state_change(&self) -> bool {
        self.name().starts_with("Set")
    }
}
