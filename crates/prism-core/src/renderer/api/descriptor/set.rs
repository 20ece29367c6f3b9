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

//! Descriptor sets: one resource reference per layout element.

use super::layout::{DescriptorBinding, DescriptorClass, DescriptorLayout};
use crate::renderer::api::resource::{BufferId, SamplerId, TextureId};
use std::sync::Arc;

/// A resource referenced by a descriptor set, by id.
///
/// Sets never own their resources; binding the id of a destroyed resource is a
/// caller bug that is not checked at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingResource {
    /// A buffer (constant, read or read-write).
    Buffer(BufferId),
    /// A texture (read or read-write).
    Texture(TextureId),
    /// A sampler.
    Sampler(SamplerId),
}

impl BindingResource {
    /// Returns `true` if this resource may occupy a descriptor of `class`.
    pub const fn is_compatible_with(&self, class: DescriptorClass) -> bool {
        matches!(
            (class, self),
            (DescriptorClass::Constant, BindingResource::Buffer(_))
                | (DescriptorClass::Read, BindingResource::Buffer(_))
                | (DescriptorClass::Read, BindingResource::Texture(_))
                | (DescriptorClass::ReadWrite, BindingResource::Buffer(_))
                | (DescriptorClass::ReadWrite, BindingResource::Texture(_))
                | (DescriptorClass::Sampler, BindingResource::Sampler(_))
        )
    }
}

impl From<BufferId> for BindingResource {
    fn from(id: BufferId) -> Self {
        BindingResource::Buffer(id)
    }
}

impl From<TextureId> for BindingResource {
    fn from(id: TextureId) -> Self {
        BindingResource::Texture(id)
    }
}

impl From<SamplerId> for BindingResource {
    fn from(id: SamplerId) -> Self {
        BindingResource::Sampler(id)
    }
}

/// A flat table of resources laid out according to exactly one [`DescriptorLayout`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorSet {
    layout: Arc<DescriptorLayout>,
    resources: Vec<Option<BindingResource>>,
}

impl DescriptorSet {
    /// Creates an empty set for `layout`.
    pub fn new(layout: Arc<DescriptorLayout>) -> Self {
        let resources = vec![None; layout.len()];
        Self { layout, resources }
    }

    /// The layout this set conforms to.
    pub fn layout(&self) -> &Arc<DescriptorLayout> {
        &self.layout
    }

    /// Replaces the resource at `index`. `None` clears the slot.
    ///
    /// # Panics
    ///
    /// If `index` is outside the layout or the resource kind does not fit the
    /// element's class.
    pub fn set_resource(&mut self, index: usize, resource: Option<BindingResource>) {
        let binding = self.layout.binding(index).unwrap_or_else(|| {
            panic!(
                "Descriptor index {index} is out of range for a layout of {} elements",
                self.layout.len()
            )
        });
        if let Some(resource) = resource {
            assert!(
                resource.is_compatible_with(binding.class),
                "{resource:?} cannot be bound to a {:?} descriptor (index {index})",
                binding.class
            );
        }
        self.resources[index] = resource;
    }

    /// Builder-style variant of [`set_resource`](Self::set_resource).
    pub fn with_resource(mut self, index: usize, resource: impl Into<BindingResource>) -> Self {
        self.set_resource(index, Some(resource.into()));
        self
    }

    /// The resource at `index`, if any.
    pub fn resource(&self, index: usize) -> Option<BindingResource> {
        self.resources.get(index).copied().flatten()
    }

    /// Iterates over the populated elements with their layout binding.
    pub fn iter_populated(
        &self,
    ) -> impl Iterator<Item = (usize, &DescriptorBinding, BindingResource)> + '_ {
        self.layout
            .bindings()
            .iter()
            .zip(&self.resources)
            .enumerate()
            .filter_map(|(index, (binding, resource))| {
                (*resource).map(|resource| (index, binding, resource))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::api::descriptor::DescriptorLayoutElement;
    use crate::renderer::api::util::ShaderStageFlags;

    fn layout() -> Arc<DescriptorLayout> {
        Arc::new(DescriptorLayout::new([
            DescriptorLayoutElement::new(DescriptorClass::Constant, ShaderStageFlags::VERTEX),
            DescriptorLayoutElement::new(DescriptorClass::Read, ShaderStageFlags::PIXEL),
            DescriptorLayoutElement::new(DescriptorClass::Sampler, ShaderStageFlags::PIXEL),
        ]))
    }

    #[test]
    fn test_pointwise_replace_and_clear() {
        let mut set = DescriptorSet::new(layout());
        assert_eq!(set.iter_populated().count(), 0);

        set.set_resource(0, Some(BufferId(1).into()));
        set.set_resource(2, Some(SamplerId(4).into()));
        assert_eq!(set.resource(0), Some(BindingResource::Buffer(BufferId(1))));
        assert_eq!(set.iter_populated().count(), 2);

        set.set_resource(0, Some(BufferId(2).into()));
        assert_eq!(set.resource(0), Some(BindingResource::Buffer(BufferId(2))));

        set.set_resource(0, None);
        assert_eq!(set.resource(0), None);
        let populated: Vec<usize> = set.iter_populated().map(|(i, _, _)| i).collect();
        assert_eq!(populated, vec![2]);
    }

    #[test]
    #[should_panic(expected = "cannot be bound")]
    fn test_class_mismatch_is_fatal() {
        let mut set = DescriptorSet::new(layout());
        set.set_resource(2, Some(TextureId(1).into()));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_out_of_range_index_is_fatal() {
        let mut set = DescriptorSet::new(layout());
        set.set_resource(3, None);
    }

    #[test]
    fn test_compatibility_table() {
        let texture = BindingResource::Texture(TextureId(1));
        assert!(texture.is_compatible_with(DescriptorClass::Read));
        assert!(texture.is_compatible_with(DescriptorClass::ReadWrite));
        assert!(!texture.is_compatible_with(DescriptorClass::Constant));
        assert!(!texture.is_compatible_with(DescriptorClass::Sampler));
    }
}
