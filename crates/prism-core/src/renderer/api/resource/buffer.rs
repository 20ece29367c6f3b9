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

//! Defines data structures related to GPU buffer resources.

use crate::utils::bitflags::prism_bitflags;
use std::borrow::Cow;

prism_bitflags! {
    /// A set of flags describing how a buffer may be bound.
    ///
    /// The backend uses them to validate bindings and to choose the memory a
    /// buffer lives in.
    pub struct BufferUsage: u32 {
        /// The buffer can be bound as a vertex buffer.
        const VERTEX = 1 << 0;
        /// The buffer can be bound as an index buffer.
        const INDEX = 1 << 1;
        /// The buffer can be bound as a constant (uniform) buffer.
        const CONSTANT = 1 << 2;
        /// The buffer can be bound as a read-only shader resource.
        const SHADER_RESOURCE = 1 << 3;
        /// The buffer can be bound for unordered (read-write) access.
        const UNORDERED_ACCESS = 1 << 4;
        /// The buffer can hold indirect draw/dispatch arguments.
        const INDIRECT = 1 << 5;
    }
}

/// CPU visibility requested for a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CpuAccess {
    /// GPU-only resource. Cannot be mapped.
    #[default]
    None,
    /// The CPU may map the resource for reading.
    Read,
    /// The CPU may map the resource for writing.
    Write,
    /// The CPU may map the resource for reading and writing.
    ReadWrite,
}

impl CpuAccess {
    /// Returns `true` if mapping for reads is allowed.
    pub const fn can_read(self) -> bool {
        matches!(self, CpuAccess::Read | CpuAccess::ReadWrite)
    }

    /// Returns `true` if mapping for writes is allowed.
    pub const fn can_write(self) -> bool {
        matches!(self, CpuAccess::Write | CpuAccess::ReadWrite)
    }
}

/// A descriptor used to create a [`BufferId`](super::BufferId).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferDescriptor<'a> {
    /// An optional debug label for the buffer.
    pub label: Option<Cow<'a, str>>,
    /// The total size of the buffer in bytes.
    pub size: u64,
    /// How the buffer may be bound.
    pub usage: BufferUsage,
    /// CPU visibility of the buffer.
    pub cpu_access: CpuAccess,
    /// Element stride for structured buffers, `0` for raw/typed buffers.
    pub structure_stride: u32,
}

impl Default for BufferDescriptor<'_> {
    fn default() -> Self {
        Self {
            label: None,
            size: 0,
            usage: BufferUsage::EMPTY,
            cpu_access: CpuAccess::None,
            structure_stride: 0,
        }
    }
}
