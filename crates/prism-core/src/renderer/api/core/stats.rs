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

//! Execution statistics accumulated by a backend's immediate context.

use crate::renderer::api::util::{PrimitiveKind, PrimitiveTopology};
use std::ops::AddAssign;

/// Counters of the work executed on a device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Command buffers executed.
    pub command_lists_executed: u64,
    /// Draw calls of any form.
    pub draw_calls: u64,
    /// Of which used the instanced form.
    pub instanced_draw_calls: u64,
    /// Compute dispatches.
    pub dispatches: u64,
    /// Points submitted.
    pub points: u64,
    /// Lines submitted.
    pub lines: u64,
    /// Triangles submitted.
    pub triangles: u64,
    /// Tessellation patches submitted.
    pub patches: u64,
    /// Render target and depth/stencil clears.
    pub clears: u64,
    /// Resource updates and copies.
    pub transfers: u64,
}

impl RenderStats {
    /// Accounts one draw of `vertex_count` vertices repeated `instance_count` times.
    pub fn record_draw(
        &mut self,
        topology: PrimitiveTopology,
        vertex_count: u32,
        instance_count: u32,
        instanced: bool,
    ) {
        self.draw_calls += 1;
        if instanced {
            self.instanced_draw_calls += 1;
        }
        let primitives =
            u64::from(topology.primitive_count(vertex_count)) * u64::from(instance_count);
        match topology.kind() {
            PrimitiveKind::Point => self.points += primitives,
            PrimitiveKind::Line => self.lines += primitives,
            PrimitiveKind::Triangle => self.triangles += primitives,
            PrimitiveKind::Patch => self.patches += primitives,
        }
    }

    /// Total primitives of every kind.
    pub fn primitives(&self) -> u64 {
        self.points + self.lines + self.triangles + self.patches
    }
}

impl AddAssign for RenderStats {
    fn add_assign(&mut self, rhs: Self) {
        self.command_lists_executed += rhs.command_lists_executed;
        self.draw_calls += rhs.draw_calls;
        self.instanced_draw_calls += rhs.instanced_draw_calls;
        self.dispatches += rhs.dispatches;
        self.points += rhs.points;
        self.lines += rhs.lines;
        self.triangles += rhs.triangles;
        self.patches += rhs.patches;
        self.clears += rhs.clears;
        self.transfers += rhs.transfers;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_counts_per_topology() {
        let mut stats = RenderStats::default();
        stats.record_draw(PrimitiveTopology::TriangleList, 30, 1, false);
        stats.record_draw(PrimitiveTopology::TriangleStrip, 6, 2, true);
        stats.record_draw(PrimitiveTopology::LineStrip, 5, 1, false);
        stats.record_draw(PrimitiveTopology::PointList, 7, 3, true);
        stats.record_draw(PrimitiveTopology::PatchList(4), 16, 1, false);

        assert_eq!(stats.triangles, 10 + 4 * 2);
        assert_eq!(stats.lines, 4);
        assert_eq!(stats.points, 21);
        assert_eq!(stats.patches, 4);
        assert_eq!(stats.draw_calls, 5);
        assert_eq!(stats.instanced_draw_calls, 2);
        assert_eq!(stats.primitives(), 18 + 4 + 21 + 4);
    }

    #[test]
    fn test_accumulation() {
        let mut total = RenderStats::default();
        let frame = RenderStats {
            draw_calls: 3,
            triangles: 12,
            ..RenderStats::default()
        };
        total += frame;
        total += frame;
        assert_eq!(total.draw_calls, 6);
        assert_eq!(total.triangles, 24);
    }
}
