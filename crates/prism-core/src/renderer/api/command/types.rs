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

//! Value types consumed by command list recording calls.

use crate::utils::bitflags::prism_bitflags;

/// A viewport rectangle in render target pixels plus its depth range.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Viewport {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
    /// Depth mapped to the near plane.
    pub min_depth: f32,
    /// Depth mapped to the far plane.
    pub max_depth: f32,
}

impl Viewport {
    /// A viewport covering `width` x `height` pixels with the full `[0, 1]` depth range.
    pub const fn from_size(width: f32, height: f32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width,
            height,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }
}

/// An integer rectangle, used for scissor rects. `right` and `bottom` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    /// Left edge.
    pub left: i32,
    /// Top edge.
    pub top: i32,
    /// Right edge.
    pub right: i32,
    /// Bottom edge.
    pub bottom: i32,
}

impl Rect {
    /// Creates a rect from its origin and size.
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            left: x,
            top: y,
            right: x + width,
            bottom: y + height,
        }
    }

    /// Width of the rect, zero if inverted.
    pub const fn width(&self) -> u32 {
        if self.right > self.left {
            (self.right - self.left) as u32
        } else {
            0
        }
    }

    /// Height of the rect, zero if inverted.
    pub const fn height(&self) -> u32 {
        if self.bottom > self.top {
            (self.bottom - self.top) as u32
        } else {
            0
        }
    }
}

prism_bitflags! {
    /// Which aspects of a depth/stencil target a clear touches.
    pub struct ClearFlags: u32 {
        /// Clears depth.
        const DEPTH = 1 << 0;
        /// Clears stencil.
        const STENCIL = 1 << 1;
        /// Clears both depth and stencil.
        const DEPTH_STENCIL = 0b11;
    }
}

/// A 3D box inside a subresource, in bytes for buffers and texels for textures.
///
/// Upper bounds are exclusive. A buffer region uses `left..right` and leaves the
/// other axes at `0..1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceRegion {
    /// Start on X.
    pub left: u32,
    /// Start on Y.
    pub top: u32,
    /// Start on Z.
    pub front: u32,
    /// End on X.
    pub right: u32,
    /// End on Y.
    pub bottom: u32,
    /// End on Z.
    pub back: u32,
}

impl ResourceRegion {
    /// A byte range inside a buffer.
    pub const fn buffer_range(offset: u32, size: u32) -> Self {
        Self {
            left: offset,
            top: 0,
            front: 0,
            right: offset + size,
            bottom: 1,
            back: 1,
        }
    }

    /// A 2D texel rectangle inside one texture subresource.
    pub const fn texels(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            left: x,
            top: y,
            front: 0,
            right: x + width,
            bottom: y + height,
            back: 1,
        }
    }

    /// Width of the region.
    pub const fn width(&self) -> u32 {
        self.right.saturating_sub(self.left)
    }

    /// Height of the region.
    pub const fn height(&self) -> u32 {
        self.bottom.saturating_sub(self.top)
    }

    /// Depth of the region.
    pub const fn depth(&self) -> u32 {
        self.back.saturating_sub(self.front)
    }

    /// Returns `true` if the region covers no element.
    pub const fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0 || self.depth() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_from_origin_and_size() {
        let rect = Rect::new(10, 20, 100, 50);
        assert_eq!(rect.right, 110);
        assert_eq!(rect.bottom, 70);
        assert_eq!(rect.width(), 100);
        assert_eq!(rect.height(), 50);
        assert_eq!(Rect::new(5, 5, -3, 2).width(), 0);
    }

    #[test]
    fn test_region_extent() {
        let range = ResourceRegion::buffer_range(16, 64);
        assert_eq!(range.width(), 64);
        assert_eq!(range.height(), 1);
        assert!(!range.is_empty());
        assert!(ResourceRegion::texels(4, 4, 0, 8).is_empty());
    }

    #[test]
    fn test_viewport_equality_is_exact() {
        let a = Viewport::from_size(1280.0, 720.0);
        let mut b = a;
        assert_eq!(a, b);
        b.max_depth = 0.5;
        assert_ne!(a, b);
    }
}
