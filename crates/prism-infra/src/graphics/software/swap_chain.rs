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

//! A headless swap chain: a ring of render target textures.

use super::device::SoftDevice;
use prism_core::renderer::{
    GraphicsDevice, RenderError, ResourceError, SwapChain, SwapChainDescriptor, SwapChainId,
    TextureDescriptor, TextureFormat, TextureId,
};

#[derive(Debug)]
pub struct SoftSwapChain {
    id: SwapChainId,
    device: SoftDevice,
    descriptor: SwapChainDescriptor,
    buffers: Vec<TextureId>,
    current: usize,
    presented: u64,
}

impl SoftSwapChain {
    pub(crate) fn new(
        device: SoftDevice,
        descriptor: &SwapChainDescriptor,
    ) -> Result<Self, ResourceError> {
        if descriptor.buffer_count == 0 {
            return Err(ResourceError::InvalidDescriptor(
                "a swap chain needs at least one buffer".to_string(),
            ));
        }
        let buffers = Self::create_buffers(&device, descriptor)?;
        let id = SwapChainId::generate();
        log::info!(
            "SoftSwapChain: Created {id} ({}x{}, {} buffers)",
            descriptor.width,
            descriptor.height,
            descriptor.buffer_count
        );
        Ok(Self {
            id,
            device,
            descriptor: *descriptor,
            buffers,
            current: 0,
            presented: 0,
        })
    }

    fn create_buffers(
        device: &SoftDevice,
        descriptor: &SwapChainDescriptor,
    ) -> Result<Vec<TextureId>, ResourceError> {
        let texture = TextureDescriptor::render_target(
            descriptor.width,
            descriptor.height,
            descriptor.format,
        );
        (0..descriptor.buffer_count)
            .map(|_| device.create_texture(&texture))
            .collect()
    }

    fn destroy_buffers(&mut self) {
        for id in self.buffers.drain(..) {
            if let Err(e) = self.device.destroy_texture(id) {
                log::warn!("SoftSwapChain: Failed to release back buffer {id}: {e}");
            }
        }
    }

    /// Number of completed presents.
    pub fn presented_frames(&self) -> u64 {
        self.presented
    }
}

impl SwapChain for SoftSwapChain {
    fn id(&self) -> SwapChainId {
        self.id
    }

    fn back_buffer(&self) -> TextureId {
        self.buffers[self.current]
    }

    fn size(&self) -> (u32, u32) {
        (self.descriptor.width, self.descriptor.height)
    }

    fn format(&self) -> TextureFormat {
        self.descriptor.format
    }

    fn present(&mut self) -> Result<(), RenderError> {
        self.current = (self.current + 1) % self.buffers.len();
        self.presented += 1;
        log::trace!("SoftSwapChain: Presented frame {}", self.presented);
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<(), ResourceError> {
        if (width, height) == self.size() {
            return Ok(());
        }
        let descriptor = SwapChainDescriptor {
            width,
            height,
            ..self.descriptor
        };
        let buffers = Self::create_buffers(&self.device, &descriptor)?;
        self.destroy_buffers();
        self.buffers = buffers;
        self.descriptor = descriptor;
        self.current = 0;
        log::info!("SoftSwapChain: Resized {} to {width}x{height}", self.id);
        Ok(())
    }
}

impl Drop for SoftSwapChain {
    fn drop(&mut self) {
        self.destroy_buffers();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_present_cycles_back_buffers() {
        let device = SoftDevice::default();
        let mut swap_chain = SoftSwapChain::new(device, &SwapChainDescriptor::new(4, 4)).unwrap();
        let first = swap_chain.back_buffer();
        swap_chain.present().unwrap();
        let second = swap_chain.back_buffer();
        assert_ne!(first, second);
        swap_chain.present().unwrap();
        assert_eq!(swap_chain.back_buffer(), first);
        assert_eq!(swap_chain.presented_frames(), 2);
    }

    #[test]
    fn test_resize_recreates_buffers_with_new_ids() {
        let device = SoftDevice::default();
        let mut swap_chain =
            SoftSwapChain::new(device.clone(), &SwapChainDescriptor::new(4, 4)).unwrap();
        let old = swap_chain.back_buffer();

        swap_chain.resize(8, 2).unwrap();

        let new = swap_chain.back_buffer();
        assert_ne!(old, new);
        assert!(device.read_texture(old, 0).is_none());
        assert_eq!(swap_chain.size(), (8, 2));
        let descriptor = device.texture_descriptor(new).unwrap();
        assert_eq!((descriptor.width, descriptor.height), (8, 2));
    }

    #[test]
    fn test_zero_buffers_is_invalid() {
        let descriptor = SwapChainDescriptor {
            buffer_count: 0,
            ..SwapChainDescriptor::new(4, 4)
        };
        assert!(SoftSwapChain::new(SoftDevice::default(), &descriptor).is_err());
    }
}
