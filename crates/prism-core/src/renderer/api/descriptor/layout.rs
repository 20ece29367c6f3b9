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

//! Descriptor layouts and the layout-to-flat-binding offset algorithm.
//!
//! Slot-based backends have one flat binding space per resource class and stage
//! (constant buffer slots, shader resource slots, UAV slots, sampler slots). A
//! pipeline's descriptor layouts are laid out in that space one after another: the
//! first slot of class `C` used by layout `k` is the number of class-`C` elements
//! declared by layouts `0..k`.

use crate::renderer::api::util::ShaderStageFlags;
use std::ops::Add;
use std::sync::Arc;

/// The resource class of a descriptor. Each class has its own binding space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DescriptorClass {
    /// A constant (uniform) buffer.
    Constant,
    /// A read-only shader resource (texture or buffer).
    Read,
    /// A read-write (unordered access) resource.
    ReadWrite,
    /// A sampler.
    Sampler,
}

/// Per-class element counts, or per-class slot offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClassCounts {
    /// Constant buffer count.
    pub constants: u32,
    /// Read-only resource count.
    pub reads: u32,
    /// Read-write resource count.
    pub read_writes: u32,
    /// Sampler count.
    pub samplers: u32,
}

impl ClassCounts {
    /// The count for one class.
    pub const fn get(&self, class: DescriptorClass) -> u32 {
        match class {
            DescriptorClass::Constant => self.constants,
            DescriptorClass::Read => self.reads,
            DescriptorClass::ReadWrite => self.read_writes,
            DescriptorClass::Sampler => self.samplers,
        }
    }

    fn get_mut(&mut self, class: DescriptorClass) -> &mut u32 {
        match class {
            DescriptorClass::Constant => &mut self.constants,
            DescriptorClass::Read => &mut self.reads,
            DescriptorClass::ReadWrite => &mut self.read_writes,
            DescriptorClass::Sampler => &mut self.samplers,
        }
    }

    /// Increments the count of `class`, returning the value before the increment.
    fn bump(&mut self, class: DescriptorClass) -> u32 {
        let count = self.get_mut(class);
        let previous = *count;
        *count += 1;
        previous
    }
}

impl Add for ClassCounts {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            constants: self.constants + rhs.constants,
            reads: self.reads + rhs.reads,
            read_writes: self.read_writes + rhs.read_writes,
            samplers: self.samplers + rhs.samplers,
        }
    }
}

/// One element of a descriptor layout as declared by the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DescriptorLayoutElement {
    /// The element's resource class.
    pub class: DescriptorClass,
    /// The stages that can see the element.
    pub stages: ShaderStageFlags,
}

impl DescriptorLayoutElement {
    /// Shorthand constructor.
    pub const fn new(class: DescriptorClass, stages: ShaderStageFlags) -> Self {
        Self { class, stages }
    }
}

/// A layout element together with its precomputed slot within its class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DescriptorBinding {
    /// The element's resource class.
    pub class: DescriptorClass,
    /// The stages that can see the element.
    pub stages: ShaderStageFlags,
    /// Index of the element among the elements of the same class in this layout.
    pub slot: u32,
}

/// An immutable, ordered table of descriptor elements.
///
/// Class counts and per-element slots are computed once at construction so that
/// offset lookups while recording are O(1).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DescriptorLayout {
    bindings: Vec<DescriptorBinding>,
    counts: ClassCounts,
}

impl DescriptorLayout {
    /// Builds a layout from its elements, in declaration order.
    pub fn new(elements: impl IntoIterator<Item = DescriptorLayoutElement>) -> Self {
        let mut counts = ClassCounts::default();
        let bindings = elements
            .into_iter()
            .map(|element| DescriptorBinding {
                class: element.class,
                stages: element.stages,
                slot: counts.bump(element.class),
            })
            .collect();
        Self { bindings, counts }
    }

    /// The elements with their precomputed slots, in declaration order.
    pub fn bindings(&self) -> &[DescriptorBinding] {
        &self.bindings
    }

    /// The element at `index`.
    pub fn binding(&self, index: usize) -> Option<&DescriptorBinding> {
        self.bindings.get(index)
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns `true` if the layout declares no element.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Per-class element counts.
    pub fn counts(&self) -> ClassCounts {
        self.counts
    }
}

/// Computes the first flat slot of every class for each layout of a pipeline.
///
/// Entry `k` is the sum of the class counts of `layouts[0..k]`, so entry `0` is
/// always zero.
pub fn binding_offsets(layouts: &[Arc<DescriptorLayout>]) -> Vec<ClassCounts> {
    layouts
        .iter()
        .scan(ClassCounts::default(), |running, layout| {
            let offset = *running;
            *running = *running + layout.counts();
            Some(offset)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(class: DescriptorClass) -> DescriptorLayoutElement {
        DescriptorLayoutElement::new(class, ShaderStageFlags::VERTEX_PIXEL)
    }

    #[test]
    fn test_counts_and_slots_are_precomputed() {
        let layout = DescriptorLayout::new([
            element(DescriptorClass::Constant),
            element(DescriptorClass::Sampler),
            element(DescriptorClass::Constant),
            element(DescriptorClass::Read),
        ]);

        let counts = layout.counts();
        assert_eq!(counts.constants, 2);
        assert_eq!(counts.samplers, 1);
        assert_eq!(counts.reads, 1);
        assert_eq!(counts.read_writes, 0);

        let slots: Vec<u32> = layout.bindings().iter().map(|b| b.slot).collect();
        assert_eq!(slots, vec![0, 0, 1, 0]);
    }

    #[test]
    fn test_offsets_are_prefix_sums_of_class_counts() {
        let a = Arc::new(DescriptorLayout::new([
            element(DescriptorClass::Constant),
            element(DescriptorClass::Constant),
            element(DescriptorClass::Sampler),
        ]));
        let b = Arc::new(DescriptorLayout::new([
            element(DescriptorClass::Read),
            element(DescriptorClass::Read),
            element(DescriptorClass::ReadWrite),
        ]));
        let c = Arc::new(DescriptorLayout::new([
            element(DescriptorClass::Constant),
            element(DescriptorClass::Read),
            element(DescriptorClass::Sampler),
            element(DescriptorClass::Sampler),
        ]));

        let offsets = binding_offsets(&[a.clone(), b.clone(), c.clone()]);
        assert_eq!(offsets.len(), 3);
        assert_eq!(offsets[0], ClassCounts::default());
        assert_eq!(
            offsets[1],
            ClassCounts {
                constants: 2,
                reads: 0,
                read_writes: 0,
                samplers: 1
            }
        );
        assert_eq!(
            offsets[2],
            ClassCounts {
                constants: 2,
                reads: 2,
                read_writes: 1,
                samplers: 1
            }
        );

        // Each entry equals the sum of the counts of every lower layout, class by class.
        for (k, offset) in offsets.iter().enumerate() {
            let expected = [&a, &b, &c][..k]
                .iter()
                .fold(ClassCounts::default(), |acc, l| acc + l.counts());
            assert_eq!(*offset, expected);
        }
    }

    #[test]
    fn test_empty_layout_list() {
        assert!(binding_offsets(&[]).is_empty());
        assert!(DescriptorLayout::new([]).is_empty());
    }
}
