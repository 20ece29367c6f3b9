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

//! Resource storage of the software device.
//!
//! Buffers are one byte array; textures hold one byte array per subresource,
//! laid out row-major with the samples of a texel stored contiguously.

use half::f16;
use prism_core::math::LinearRgba;
use prism_core::renderer::{
    BufferId, BufferUsage, CpuAccess, GpuResource, ResourceError, ResourceRegion,
    SamplerDescriptor, SamplerId, ShaderId, ShaderStage, TextureDescriptor, TextureFormat,
    TextureId,
};
use prism_core::utils::sync::{lock, read, write};
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

/// Shared, lockable bytes of one buffer or texture subresource.
pub(crate) type SharedBytes = Arc<RwLock<Vec<u8>>>;

fn shared_bytes(len: u64) -> Result<SharedBytes, ResourceError> {
    let len = usize::try_from(len).map_err(|_| {
        ResourceError::BackendError(format!("allocation of {len} bytes exceeds address space"))
    })?;
    Ok(Arc::new(RwLock::new(vec![0; len])))
}

/// A buffer living in system memory.
#[derive(Debug)]
pub struct SoftBuffer {
    pub(crate) id: BufferId,
    pub(crate) label: Option<String>,
    pub(crate) size: u64,
    pub(crate) usage: BufferUsage,
    pub(crate) cpu_access: CpuAccess,
    pub(crate) storage: SharedBytes,
}

impl SoftBuffer {
    pub(crate) fn new(
        id: BufferId,
        label: Option<String>,
        size: u64,
        usage: BufferUsage,
        cpu_access: CpuAccess,
    ) -> Result<Self, ResourceError> {
        Ok(Self {
            id,
            label,
            size,
            usage,
            cpu_access,
            storage: shared_bytes(size)?,
        })
    }

    /// The debug label, if any.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Size in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// A copy of the buffer contents.
    pub fn contents(&self) -> Vec<u8> {
        read(&self.storage).clone()
    }
}

/// A texture living in system memory.
#[derive(Debug)]
pub struct SoftTexture {
    pub(crate) id: TextureId,
    pub(crate) descriptor: TextureDescriptor<'static>,
    pub(crate) subresources: Vec<SharedBytes>,
}

impl SoftTexture {
    pub(crate) fn new(
        id: TextureId,
        descriptor: &TextureDescriptor,
    ) -> Result<Self, ResourceError> {
        let descriptor = TextureDescriptor {
            label: descriptor
                .label
                .as_ref()
                .map(|label| Cow::Owned(label.to_string())),
            dimension: descriptor.dimension,
            format: descriptor.format,
            width: descriptor.width,
            height: descriptor.height,
            depth_or_array_layers: descriptor.depth_or_array_layers,
            mip_levels: descriptor.mip_levels,
            sample_count: descriptor.sample_count,
            usage: descriptor.usage,
            cpu_access: descriptor.cpu_access,
        };
        let subresources = (0..descriptor.subresource_count())
            .map(|sub| shared_bytes(descriptor.subresource_size(sub)))
            .collect::<Result<_, _>>()?;
        Ok(Self {
            id,
            descriptor,
            subresources,
        })
    }

    /// The descriptor the texture was created with.
    pub fn descriptor(&self) -> &TextureDescriptor<'static> {
        &self.descriptor
    }

    /// A copy of one subresource, or `None` if the index is out of range.
    pub fn subresource_contents(&self, subresource: u32) -> Option<Vec<u8>> {
        self.subresources
            .get(subresource as usize)
            .map(|bytes| read(bytes).clone())
    }

    pub(crate) fn subresource(&self, subresource: u32) -> &SharedBytes {
        self.subresources.get(subresource as usize).unwrap_or_else(|| {
            panic!(
                "Subresource {subresource} is out of range for {} ({} subresources)",
                self.id,
                self.subresources.len()
            )
        })
    }
}

/// The software counterpart of a native sampler object.
#[derive(Debug, PartialEq)]
pub struct SamplerState {
    pub(crate) descriptor: SamplerDescriptor,
}

impl SamplerState {
    /// The descriptor the sampler was created from.
    pub fn descriptor(&self) -> &SamplerDescriptor {
        &self.descriptor
    }
}

/// Validated shader bytecode.
#[derive(Debug)]
pub struct SoftShader {
    pub(crate) id: ShaderId,
    pub(crate) stage: ShaderStage,
    pub(crate) entry_point: String,
    pub(crate) bytecode: Vec<u8>,
}

impl SoftShader {
    /// The stage the shader was created for.
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    /// The entry point name.
    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    /// The bytecode the shader was created from.
    pub fn bytecode(&self) -> &[u8] {
        &self.bytecode
    }
}

/// Id to object tables of every resource created on a device.
#[derive(Debug, Default)]
pub(crate) struct ResourceRegistry {
    buffers: Mutex<HashMap<BufferId, Arc<SoftBuffer>>>,
    textures: Mutex<HashMap<TextureId, Arc<SoftTexture>>>,
    samplers: Mutex<HashMap<SamplerId, Arc<SamplerState>>>,
    shaders: Mutex<HashMap<ShaderId, Arc<SoftShader>>>,
}

impl ResourceRegistry {
    pub(crate) fn insert_buffer(&self, buffer: SoftBuffer) -> BufferId {
        let id = buffer.id;
        lock(&self.buffers).insert(id, Arc::new(buffer));
        id
    }

    pub(crate) fn buffer(&self, id: BufferId) -> Option<Arc<SoftBuffer>> {
        lock(&self.buffers).get(&id).cloned()
    }

    pub(crate) fn remove_buffer(&self, id: BufferId) -> Option<Arc<SoftBuffer>> {
        lock(&self.buffers).remove(&id)
    }

    pub(crate) fn insert_texture(&self, texture: SoftTexture) -> TextureId {
        let id = texture.id;
        lock(&self.textures).insert(id, Arc::new(texture));
        id
    }

    pub(crate) fn texture(&self, id: TextureId) -> Option<Arc<SoftTexture>> {
        lock(&self.textures).get(&id).cloned()
    }

    pub(crate) fn remove_texture(&self, id: TextureId) -> Option<Arc<SoftTexture>> {
        lock(&self.textures).remove(&id)
    }

    pub(crate) fn insert_sampler(&self, id: SamplerId, sampler: Arc<SamplerState>) {
        lock(&self.samplers).insert(id, sampler);
    }

    pub(crate) fn remove_sampler(&self, id: SamplerId) -> Option<Arc<SamplerState>> {
        lock(&self.samplers).remove(&id)
    }

    pub(crate) fn insert_shader(&self, shader: SoftShader) -> ShaderId {
        let id = shader.id;
        lock(&self.shaders).insert(id, Arc::new(shader));
        id
    }

    pub(crate) fn shader(&self, id: ShaderId) -> Option<Arc<SoftShader>> {
        lock(&self.shaders).get(&id).cloned()
    }

    pub(crate) fn remove_shader(&self, id: ShaderId) -> Option<Arc<SoftShader>> {
        lock(&self.shaders).remove(&id)
    }

    /// Storage, CPU access and size of a buffer or texture subresource.
    pub(crate) fn subresource(
        &self,
        resource: GpuResource,
        subresource: u32,
    ) -> Option<SubresourceInfo> {
        match resource {
            GpuResource::Buffer(id) => {
                let buffer = self.buffer(id)?;
                assert_eq!(
                    subresource, 0,
                    "Buffers have a single subresource, {subresource} requested on {id}"
                );
                Some(SubresourceInfo {
                    storage: Arc::clone(&buffer.storage),
                    cpu_access: buffer.cpu_access,
                    row_pitch: buffer.size as u32,
                    depth_pitch: buffer.size as u32,
                    extent: (buffer.size as u32, 1, 1),
                    texel_size: 1,
                })
            }
            GpuResource::Texture(id) => {
                let texture = self.texture(id)?;
                let storage = Arc::clone(texture.subresource(subresource));
                let descriptor = &texture.descriptor;
                let samples = descriptor.sample_count.max(1);
                Some(SubresourceInfo {
                    storage,
                    cpu_access: descriptor.cpu_access,
                    row_pitch: descriptor.row_pitch(subresource) * samples,
                    depth_pitch: descriptor.depth_pitch(subresource) * samples,
                    extent: descriptor.subresource_extent(subresource),
                    texel_size: descriptor.format.bytes_per_texel() * samples,
                })
            }
        }
    }
}

/// The addressing information of one subresource.
#[derive(Debug, Clone)]
pub(crate) struct SubresourceInfo {
    pub(crate) storage: SharedBytes,
    pub(crate) cpu_access: CpuAccess,
    pub(crate) row_pitch: u32,
    pub(crate) depth_pitch: u32,
    /// `(width, height, depth)` in elements: bytes for buffers, texels for textures.
    pub(crate) extent: (u32, u32, u32),
    /// Bytes per element, all samples included.
    pub(crate) texel_size: u32,
}

impl SubresourceInfo {
    /// The region covering the whole subresource.
    pub(crate) fn full_region(&self) -> ResourceRegion {
        let (width, height, depth) = self.extent;
        ResourceRegion {
            left: 0,
            top: 0,
            front: 0,
            right: width,
            bottom: height,
            back: depth,
        }
    }

    /// Checks that an update of `data_len` source bytes laid out with the given
    /// pitches fits both the source and the subresource.
    pub(crate) fn check_update(
        &self,
        region: Option<&ResourceRegion>,
        data_len: usize,
        row_pitch: u32,
        depth_pitch: u32,
    ) -> Result<(), String> {
        let region = region.copied().unwrap_or_else(|| self.full_region());
        let (width, height, depth) = self.extent;
        if region.right > width || region.bottom > height || region.back > depth {
            return Err(format!(
                "region {region:?} exceeds the subresource extent {:?}",
                self.extent
            ));
        }
        if region.is_empty() {
            return Err(format!("region {region:?} is empty"));
        }
        let layout = SourceLayout::new(self, &region, row_pitch, depth_pitch);
        if layout.required_len() > data_len {
            return Err(format!(
                "update needs {} source bytes, {data_len} provided",
                layout.required_len()
            ));
        }
        Ok(())
    }

    /// Copies `data` into `region` of the subresource. Rows falling outside
    /// either side are skipped with a warning.
    pub(crate) fn write_region(
        &self,
        region: Option<&ResourceRegion>,
        data: &[u8],
        row_pitch: u32,
        depth_pitch: u32,
    ) {
        let region = region.copied().unwrap_or_else(|| self.full_region());
        let layout = SourceLayout::new(self, &region, row_pitch, depth_pitch);
        let texel = self.texel_size as usize;
        let mut bytes = write(&self.storage);
        for z in 0..region.depth() as usize {
            for y in 0..region.height() as usize {
                let src = z * layout.depth_pitch + y * layout.row_pitch;
                let dst = (region.front as usize + z) * self.depth_pitch as usize
                    + (region.top as usize + y) * self.row_pitch as usize
                    + region.left as usize * texel;
                let source = data.get(src..src + layout.row_bytes);
                let destination = bytes.get_mut(dst..dst + layout.row_bytes);
                match (source, destination) {
                    (Some(source), Some(destination)) => destination.copy_from_slice(source),
                    _ => {
                        log::warn!("Skipping out-of-range row {y} of slice {z} in a subresource update");
                    }
                }
            }
        }
    }
}

/// Pitches of the source data of an update.
struct SourceLayout {
    row_bytes: usize,
    row_pitch: usize,
    depth_pitch: usize,
    rows: usize,
    slices: usize,
}

impl SourceLayout {
    fn new(
        info: &SubresourceInfo,
        region: &ResourceRegion,
        row_pitch: u32,
        depth_pitch: u32,
    ) -> Self {
        let row_bytes = region.width() as usize * info.texel_size as usize;
        let row_pitch = if row_pitch == 0 {
            row_bytes
        } else {
            row_pitch as usize
        };
        let rows = region.height() as usize;
        let depth_pitch = if depth_pitch == 0 {
            row_pitch * rows
        } else {
            depth_pitch as usize
        };
        Self {
            row_bytes,
            row_pitch,
            depth_pitch,
            rows,
            slices: region.depth() as usize,
        }
    }

    fn required_len(&self) -> usize {
        if self.rows == 0 || self.slices == 0 {
            return 0;
        }
        (self.slices - 1) * self.depth_pitch + (self.rows - 1) * self.row_pitch + self.row_bytes
    }
}

/// Encodes a clear color as one texel of `format`, or `None` for depth formats.
pub(crate) fn encode_color(format: TextureFormat, color: LinearRgba) -> Option<Vec<u8>> {
    let unorm = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    let [r, g, b, a] = color.to_array();
    let texel = match format {
        TextureFormat::R8Unorm => vec![unorm(r)],
        TextureFormat::Rgba8Unorm | TextureFormat::Rgba8UnormSrgb => {
            vec![unorm(r), unorm(g), unorm(b), unorm(a)]
        }
        TextureFormat::Bgra8Unorm => vec![unorm(b), unorm(g), unorm(r), unorm(a)],
        TextureFormat::Rgba16Float => {
            bytemuck::cast_slice(&[r, g, b, a].map(f16::from_f32)).to_vec()
        }
        TextureFormat::R32Float => r.to_le_bytes().to_vec(),
        TextureFormat::Rgba32Float => bytemuck::cast_slice(&[r, g, b, a]).to_vec(),
        TextureFormat::Depth32Float | TextureFormat::Depth24PlusStencil8 => return None,
    };
    Some(texel)
}
