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

//! Defines the `LinearRgba` color type.

use std::hash::{Hash, Hasher};

/// Represents a color in a **linear RGBA** color space using `f32` components.
///
/// Used for clear values and the pipeline blend constant. Equality and hashing are
/// bitwise so colors can take part in state-cache keys.
///
/// `#[repr(C)]` ensures a consistent memory layout, which is important when passing
/// color data to graphics APIs.
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct LinearRgba {
    /// The red component in linear space.
    pub r: f32,
    /// The green component in linear space.
    pub g: f32,
    /// The blue component in linear space.
    pub b: f32,
    /// The alpha (opacity) component.
    pub a: f32,
}

impl LinearRgba {
    /// Opaque white (`[1.0, 1.0, 1.0, 1.0]`).
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    /// Opaque black (`[0.0, 0.0, 0.0, 1.0]`).
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    /// Fully transparent black (`[0.0, 0.0, 0.0, 0.0]`).
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    /// Creates a new `LinearRgba` with explicit RGBA values.
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Creates a new opaque `LinearRgba` (alpha = 1.0).
    #[inline]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Returns the components as an `[r, g, b, a]` array.
    #[inline]
    pub const fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    fn bits(&self) -> [u32; 4] {
        [
            self.r.to_bits(),
            self.g.to_bits(),
            self.b.to_bits(),
            self.a.to_bits(),
        ]
    }
}

impl Default for LinearRgba {
    fn default() -> Self {
        Self::TRANSPARENT
    }
}

impl PartialEq for LinearRgba {
    fn eq(&self, other: &Self) -> bool {
        self.bits() == other.bits()
    }
}

impl Eq for LinearRgba {}

impl Hash for LinearRgba {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bits().hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        let c = LinearRgba::rgb(0.25, 0.5, 0.75);
        assert_eq!(c.to_array(), [0.25, 0.5, 0.75, 1.0]);
        assert_eq!(LinearRgba::default(), LinearRgba::TRANSPARENT);
    }

    #[test]
    fn test_pod_layout() {
        let c = LinearRgba::new(1.0, 0.0, 0.0, 1.0);
        let bytes: &[u8] = bytemuck::bytes_of(&c);
        assert_eq!(bytes.len(), 16);
        assert_eq!(&bytes[0..4], &1.0f32.to_ne_bytes());
    }
}
