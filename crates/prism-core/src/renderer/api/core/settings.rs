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

//! Device-wide settings: native binding limits and debugging toggles.

use crate::renderer::api::descriptor::DescriptorClass;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings a backend device is created with.
///
/// The defaults match the Direct3D 11 hardware limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceSettings {
    /// Number of vertex buffer input slots.
    pub max_vertex_buffers: u32,
    /// Number of viewports (and scissor rects) that can be bound at once.
    pub max_viewports: u32,
    /// Number of color render targets that can be bound at once.
    pub max_render_targets: u32,
    /// Constant buffer slots per shader stage.
    pub max_constant_buffers: u32,
    /// Read-only shader resource slots per shader stage.
    pub max_shader_resources: u32,
    /// Sampler slots per shader stage.
    pub max_samplers: u32,
    /// Unordered access slots.
    pub max_unordered_access: u32,
    /// Attaches debug labels to native objects.
    pub debug_labels: bool,
    /// Accumulates draw and primitive counts on the immediate context.
    pub collect_statistics: bool,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            max_vertex_buffers: 32,
            max_viewports: 16,
            max_render_targets: 8,
            max_constant_buffers: 14,
            max_shader_resources: 128,
            max_samplers: 16,
            max_unordered_access: 8,
            debug_labels: cfg!(debug_assertions),
            collect_statistics: true,
        }
    }
}

impl DeviceSettings {
    /// Load settings from a JSON string. Missing fields take their default value.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load settings from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&content)?)
    }

    /// Save settings to a JSON file.
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// The per-stage slot limit of a descriptor class.
    pub const fn class_limit(&self, class: DescriptorClass) -> u32 {
        match class {
            DescriptorClass::Constant => self.max_constant_buffers,
            DescriptorClass::Read => self.max_shader_resources,
            DescriptorClass::ReadWrite => self.max_unordered_access,
            DescriptorClass::Sampler => self.max_samplers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = DeviceSettings::from_json(r#"{ "max_viewports": 4 }"#).unwrap();
        assert_eq!(settings.max_viewports, 4);
        assert_eq!(settings.max_vertex_buffers, 32);
        assert_eq!(settings.class_limit(DescriptorClass::Sampler), 16);
    }

    #[test]
    fn test_file_round_trip() {
        let path = std::env::temp_dir().join(format!(
            "prism-settings-{}.json",
            std::process::id()
        ));
        let settings = DeviceSettings {
            collect_statistics: false,
            max_render_targets: 4,
            ..DeviceSettings::default()
        };
        settings.to_file(&path).unwrap();
        let loaded = DeviceSettings::from_file(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_invalid_json_is_rejected() {
        assert!(DeviceSettings::from_json("{ max_viewports: }").is_err());
    }
}
