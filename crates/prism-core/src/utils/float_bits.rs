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

//! An `f32` wrapper with bitwise equality, so float-bearing descriptors can key hash maps.

use std::hash::{Hash, Hasher};

/// An `f32` compared and hashed by its bit pattern.
///
/// `0.0` and `-0.0` are distinct and a NaN equals itself, which is exactly what a
/// cache of immutable state objects needs: equal bits always produce equal native state.
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct FloatBits(pub f32);

impl FloatBits {
    /// Returns the wrapped value.
    #[inline]
    pub const fn get(self) -> f32 {
        self.0
    }
}

impl PartialEq for FloatBits {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for FloatBits {}

impl Hash for FloatBits {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl From<f32> for FloatBits {
    fn from(value: f32) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_bitwise_equality() {
        assert_eq!(FloatBits(1.5), FloatBits(1.5));
        assert_ne!(FloatBits(0.0), FloatBits(-0.0));
        assert_eq!(FloatBits(f32::NAN), FloatBits(f32::NAN));
    }

    #[test]
    fn test_usable_as_hash_key() {
        let mut set = HashSet::new();
        set.insert(FloatBits(0.25));
        set.insert(FloatBits(0.25));
        set.insert(FloatBits(0.5));
        assert_eq!(set.len(), 2);
    }
}
