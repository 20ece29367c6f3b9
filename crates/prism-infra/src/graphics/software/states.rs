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

//! Immutable fixed-function state objects, the software counterparts of
//! `ID3D11RasterizerState`, `ID3D11BlendState`, `ID3D11DepthStencilState` and
//! `ID3D11InputLayout`.
//!
//! Objects are only created through the device's state caches, so two equal
//! descriptions always share one object and handle comparison is pointer
//! comparison.

use prism_core::renderer::{
    BlendDescriptor, DepthStencilDescriptor, PipelineError, RasterizerDescriptor, ShaderId,
    VertexLayout, VertexStepMode,
};
use std::collections::HashSet;

/// Rasterizer state object.
#[derive(Debug, PartialEq)]
pub struct RasterizerState {
    pub(crate) descriptor: RasterizerDescriptor,
}

impl RasterizerState {
    pub(crate) fn create(descriptor: &RasterizerDescriptor) -> Result<Self, PipelineError> {
        let clamp = descriptor.depth_bias_clamp.get();
        let slope = descriptor.slope_scaled_depth_bias.get();
        if !clamp.is_finite() || !slope.is_finite() {
            return Err(PipelineError::StateCreationFailed(format!(
                "rasterizer depth bias must be finite (clamp {clamp}, slope {slope})"
            )));
        }
        log::trace!("Creating rasterizer state {descriptor:?}");
        Ok(Self {
            descriptor: *descriptor,
        })
    }

    /// The description this object was created from.
    pub fn descriptor(&self) -> &RasterizerDescriptor {
        &self.descriptor
    }
}

/// Blend state object.
#[derive(Debug, PartialEq)]
pub struct BlendState {
    pub(crate) descriptor: BlendDescriptor,
}

impl BlendState {
    pub(crate) fn create(descriptor: &BlendDescriptor) -> Result<Self, PipelineError> {
        log::trace!("Creating blend state {descriptor:?}");
        Ok(Self {
            descriptor: *descriptor,
        })
    }

    /// The description this object was created from.
    pub fn descriptor(&self) -> &BlendDescriptor {
        &self.descriptor
    }
}

/// Depth/stencil state object.
#[derive(Debug, PartialEq)]
pub struct DepthStencilState {
    pub(crate) descriptor: DepthStencilDescriptor,
}

impl DepthStencilState {
    pub(crate) fn create(descriptor: &DepthStencilDescriptor) -> Result<Self, PipelineError> {
        if !descriptor.depth_enabled && descriptor.depth_write_enabled {
            log::warn!("Depth writes are enabled on a depth/stencil state with the depth test off");
        }
        log::trace!("Creating depth/stencil state {descriptor:?}");
        Ok(Self {
            descriptor: *descriptor,
        })
    }

    /// The description this object was created from.
    pub fn descriptor(&self) -> &DepthStencilDescriptor {
        &self.descriptor
    }
}

/// Key of the input layout cache. A native input layout is validated against the
/// vertex shader signature, so the shader is part of its identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct InputLayoutKey {
    pub(crate) layout: VertexLayout,
    pub(crate) vertex_shader: ShaderId,
}

/// Input layout object.
#[derive(Debug, PartialEq)]
pub struct InputLayout {
    pub(crate) layout: VertexLayout,
    pub(crate) vertex_shader: ShaderId,
}

impl InputLayout {
    pub(crate) fn create(key: &InputLayoutKey, max_slots: u32) -> Result<Self, PipelineError> {
        let layout = &key.layout;
        if layout.buffers.len() > max_slots as usize {
            return Err(PipelineError::StateCreationFailed(format!(
                "input layout uses {} vertex buffer slots, the device supports {max_slots}",
                layout.buffers.len()
            )));
        }

        let mut semantics = HashSet::new();
        for (slot, buffer) in layout.buffers.iter().enumerate() {
            if let VertexStepMode::Instance { step_rate: 0 } = buffer.step_mode {
                return Err(PipelineError::StateCreationFailed(format!(
                    "per-instance slot {slot} has a step rate of zero"
                )));
            }
            for attribute in &buffer.attributes {
                let end = attribute.offset + attribute.format.size();
                if buffer.stride != 0 && end > buffer.stride {
                    return Err(PipelineError::StateCreationFailed(format!(
                        "attribute {}{} ends at byte {end}, past the stride {} of slot {slot}",
                        attribute.semantic_name, attribute.semantic_index, buffer.stride
                    )));
                }
                let semantic = (
                    attribute.semantic_name.to_ascii_uppercase(),
                    attribute.semantic_index,
                );
                if !semantics.insert(semantic) {
                    return Err(PipelineError::StateCreationFailed(format!(
                        "semantic {}{} is declared twice",
                        attribute.semantic_name, attribute.semantic_index
                    )));
                }
            }
        }

        log::trace!(
            "Creating input layout for {} ({} slots)",
            key.vertex_shader,
            layout.buffers.len()
        );
        Ok(Self {
            layout: layout.clone(),
            vertex_shader: key.vertex_shader,
        })
    }

    /// The vertex layout this object was created from.
    pub fn layout(&self) -> &VertexLayout {
        &self.layout
    }

    /// The vertex shader whose signature the layout was validated against.
    pub fn vertex_shader(&self) -> ShaderId {
        self.vertex_shader
    }
}
