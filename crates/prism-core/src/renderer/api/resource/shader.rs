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

//! Shader module descriptors.
//!
//! Cross-compilation happens upstream; a backend only receives bytecode for its
//! native shader model and an entry point.

use crate::renderer::api::util::ShaderStage;
use std::borrow::Cow;

/// A descriptor used to create a [`ShaderId`](super::ShaderId).
#[derive(Debug, Clone)]
pub struct ShaderDescriptor<'a> {
    /// An optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// The stage this shader runs in.
    pub stage: ShaderStage,
    /// Compiled bytecode for the backend's shader model.
    pub bytecode: Cow<'a, [u8]>,
    /// The entry point function name.
    pub entry_point: Cow<'a, str>,
}

impl<'a> ShaderDescriptor<'a> {
    /// Convenience constructor with the conventional `main` entry point.
    pub fn new(stage: ShaderStage, bytecode: impl Into<Cow<'a, [u8]>>) -> Self {
        Self {
            label: None,
            stage,
            bytecode: bytecode.into(),
            entry_point: Cow::Borrowed("main"),
        }
    }
}
