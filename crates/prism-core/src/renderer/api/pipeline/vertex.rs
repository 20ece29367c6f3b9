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

//! Vertex input layout.

use super::enums::{VertexFormat, VertexStepMode};

/// A single attribute read by the vertex shader.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VertexAttribute {
    /// Shader input semantic (e.g. `POSITION`).
    pub semantic_name: String,
    /// Semantic index (e.g. the `1` of `TEXCOORD1`).
    pub semantic_index: u32,
    /// The format of the attribute's data.
    pub format: VertexFormat,
    /// Byte offset of the attribute from the start of the element.
    pub offset: u32,
}

impl VertexAttribute {
    /// Creates an attribute with semantic index `0`.
    pub fn new(semantic_name: impl Into<String>, format: VertexFormat, offset: u32) -> Self {
        Self {
            semantic_name: semantic_name.into(),
            semantic_index: 0,
            format,
            offset,
        }
    }
}

/// The layout of one vertex buffer slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VertexBufferLayout {
    /// The byte distance between consecutive elements in the buffer.
    pub stride: u32,
    /// How often the buffer is advanced.
    pub step_mode: VertexStepMode,
    /// Attributes contained within each element.
    pub attributes: Vec<VertexAttribute>,
}

impl VertexBufferLayout {
    /// Builds a per-vertex layout whose stride is the tightly packed size of `attributes`
    /// laid out in order.
    pub fn packed(formats: &[(&str, VertexFormat)]) -> Self {
        let mut offset = 0;
        let attributes = formats
            .iter()
            .map(|(name, format)| {
                let attribute = VertexAttribute::new(*name, *format, offset);
                offset += format.size();
                attribute
            })
            .collect();
        Self {
            stride: offset,
            step_mode: VertexStepMode::Vertex,
            attributes,
        }
    }
}

/// The vertex input of a pipeline: one layout per vertex buffer slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VertexLayout {
    /// Buffer layouts indexed by vertex buffer slot.
    pub buffers: Vec<VertexBufferLayout>,
}

impl VertexLayout {
    /// A layout with no vertex input (e.g. full-screen passes generating vertices in the shader).
    pub const fn empty() -> Self {
        Self {
            buffers: Vec::new(),
        }
    }

    /// Returns `true` if any slot declares at least one attribute.
    pub fn has_attributes(&self) -> bool {
        self.buffers.iter().any(|b| !b.attributes.is_empty())
    }

    /// The stride of each slot, indexed by slot.
    pub fn strides(&self) -> Vec<u32> {
        self.buffers.iter().map(|b| b.stride).collect()
    }
}
