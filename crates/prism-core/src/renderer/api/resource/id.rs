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

//! Process-unique resource identifiers.
//!
//! Every GPU-visible object gets an integer id from a per-category counter at
//! construction. Caches and redundant-state checks compare these ids, never object
//! addresses, because a backend may recreate the native object behind a logical
//! resource (e.g. on swap chain resize) and a remembered reference would go stale.

macro_rules! resource_id {
    ($(#[$attr:meta])* $name:ident, $prefix:literal) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name(pub u64);

        impl $name {
            /// Generates the next id of this category. Ids start at 1 and only grow.
            pub fn generate() -> Self {
                static NEXT: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(1);
                Self(NEXT.fetch_add(1, std::sync::atomic::Ordering::Relaxed))
            }

            /// Returns the raw integer value.
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

resource_id!(
    /// An opaque handle to a GPU buffer.
    BufferId,
    "buffer"
);
resource_id!(
    /// An opaque handle to a GPU texture.
    TextureId,
    "texture"
);
resource_id!(
    /// An opaque handle to a sampler.
    SamplerId,
    "sampler"
);
resource_id!(
    /// An opaque handle to a compiled shader module.
    ShaderId,
    "shader"
);
resource_id!(
    /// An opaque handle to a pipeline object created from a [`PipelineDescriptor`](crate::renderer::PipelineDescriptor).
    PipelineId,
    "pipeline"
);
resource_id!(
    /// Identifies a command list for its whole lifetime.
    CommandListId,
    "command-list"
);
resource_id!(
    /// Identifies a command queue. Used for command list ownership checks.
    QueueId,
    "queue"
);
resource_id!(
    /// Identifies a fence.
    FenceId,
    "fence"
);
resource_id!(
    /// Identifies a swap chain.
    SwapChainId,
    "swap-chain"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_monotonic_per_category() {
        let a = BufferId::generate();
        let b = BufferId::generate();
        assert!(b > a);
        assert_ne!(a.get(), 0);
    }

    #[test]
    fn test_categories_are_independent() {
        let texture = TextureId::generate();
        let sampler = SamplerId::generate();
        // Each category has its own counter, so both start from low values.
        assert!(texture.get() >= 1);
        assert!(sampler.get() >= 1);
    }

    #[test]
    fn test_display() {
        assert_eq!(BufferId(7).to_string(), "buffer#7");
        assert_eq!(PipelineId(3).to_string(), "pipeline#3");
    }
}
