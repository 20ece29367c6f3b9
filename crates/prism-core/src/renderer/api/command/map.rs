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

//! CPU mapping of GPU resources.

use crate::renderer::api::resource::{CpuAccess, GpuResource};
use crate::renderer::error::ResourceError;
use bytemuck::Pod;
use std::fmt;
use std::sync::Arc;

/// The CPU access requested by a map call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapMode {
    /// Read the current contents.
    Read,
    /// Write, keeping the current contents.
    Write,
    /// Read and write.
    ReadWrite,
    /// Write after discarding the previous contents.
    WriteDiscard,
    /// Write to a region the GPU is guaranteed not to be using.
    WriteNoOverwrite,
}

impl MapMode {
    /// Returns `true` if the mapping may be read.
    pub const fn can_read(self) -> bool {
        matches!(self, MapMode::Read | MapMode::ReadWrite)
    }

    /// Returns `true` if the mapping may be written.
    pub const fn can_write(self) -> bool {
        !matches!(self, MapMode::Read)
    }

    /// Returns `true` if a resource created with `access` can be mapped in this mode.
    pub const fn is_allowed_by(self, access: CpuAccess) -> bool {
        (!self.can_read() || access.can_read()) && (!self.can_write() || access.can_write())
    }
}

/// The storage behind a mapped subresource, provided by the backend.
///
/// Implementations check bounds and report [`ResourceError::OutOfBounds`]; they
/// panic if the memory is touched after the resource was unmapped.
pub trait MappedMemory: Send + Sync + fmt::Debug {
    /// Size of the mapped subresource in bytes.
    fn len(&self) -> usize;

    /// Returns `true` if the mapped subresource has no bytes.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copies `dst.len()` bytes starting at `offset` into `dst`.
    fn read(&self, offset: usize, dst: &mut [u8]) -> Result<(), ResourceError>;

    /// Copies `src` into the mapping starting at `offset`.
    fn write(&self, offset: usize, src: &[u8]) -> Result<(), ResourceError>;
}

/// A CPU view of one mapped subresource.
#[derive(Debug, Clone)]
pub struct MappedSubresource {
    resource: GpuResource,
    subresource: u32,
    mode: MapMode,
    row_pitch: u32,
    depth_pitch: u32,
    memory: Arc<dyn MappedMemory>,
}

impl MappedSubresource {
    /// Wraps backend memory. Called by backends only.
    pub fn new(
        resource: GpuResource,
        subresource: u32,
        mode: MapMode,
        row_pitch: u32,
        depth_pitch: u32,
        memory: Arc<dyn MappedMemory>,
    ) -> Self {
        Self {
            resource,
            subresource,
            mode,
            row_pitch,
            depth_pitch,
            memory,
        }
    }

    /// The mapped resource.
    pub fn resource(&self) -> GpuResource {
        self.resource
    }

    /// The mapped subresource index.
    pub fn subresource(&self) -> u32 {
        self.subresource
    }

    /// The mode the resource was mapped with.
    pub fn mode(&self) -> MapMode {
        self.mode
    }

    /// Bytes between two rows (texture mappings).
    pub fn row_pitch(&self) -> u32 {
        self.row_pitch
    }

    /// Bytes between two depth slices (texture mappings).
    pub fn depth_pitch(&self) -> u32 {
        self.depth_pitch
    }

    /// Size of the mapping in bytes.
    pub fn len(&self) -> usize {
        self.memory.len()
    }

    /// Returns `true` if the mapping has no bytes.
    pub fn is_empty(&self) -> bool {
        self.memory.is_empty()
    }

    /// Writes raw bytes at `offset`.
    ///
    /// # Panics
    ///
    /// If the resource was mapped for reading only.
    pub fn write_bytes(&self, offset: usize, data: &[u8]) -> Result<(), ResourceError> {
        assert!(
            self.mode.can_write(),
            "{} was mapped with {:?} and cannot be written",
            self.resource,
            self.mode
        );
        self.memory.write(offset, data)
    }

    /// Writes a slice of plain-old-data values at `offset`.
    pub fn write_pod<T: Pod>(&self, offset: usize, data: &[T]) -> Result<(), ResourceError> {
        self.write_bytes(offset, bytemuck::cast_slice(data))
    }

    /// Reads raw bytes at `offset` into `dst`.
    ///
    /// # Panics
    ///
    /// If the resource was not mapped for reading.
    pub fn read_bytes(&self, offset: usize, dst: &mut [u8]) -> Result<(), ResourceError> {
        assert!(
            self.mode.can_read(),
            "{} was mapped with {:?} and cannot be read",
            self.resource,
            self.mode
        );
        self.memory.read(offset, dst)
    }

    /// Reads `count` plain-old-data values starting at `offset`.
    pub fn read_pod<T: Pod>(&self, offset: usize, count: usize) -> Result<Vec<T>, ResourceError> {
        let mut values = vec![T::zeroed(); count];
        self.read_bytes(offset, bytemuck::cast_slice_mut(&mut values))?;
        Ok(values)
    }
}

/// The outcome of a map request.
#[derive(Debug)]
pub enum MapStatus {
    /// The resource is mapped.
    Mapped(MappedSubresource),
    /// The resource is still in use and the caller asked not to wait.
    InUse,
}

impl MapStatus {
    /// The mapping, if the request succeeded.
    pub fn mapped(self) -> Option<MappedSubresource> {
        match self {
            MapStatus::Mapped(mapped) => Some(mapped),
            MapStatus::InUse => None,
        }
    }

    /// Returns `true` if the resource was busy.
    pub fn is_in_use(&self) -> bool {
        matches!(self, MapStatus::InUse)
    }
}
