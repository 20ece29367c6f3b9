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

//! Defines the hierarchy of error types for the rendering subsystem.
//!
//! Only backend operation failures are reported through these types. Caller bugs
//! (invalid state transitions, foreign command lists, out-of-range indices) panic at
//! the call site instead.

use crate::renderer::api::resource::{GpuResource, ShaderId};
use crate::renderer::api::util::ShaderStage;
use std::fmt;

/// An error related to the creation of a shader module.
#[derive(Debug)]
pub enum ShaderError {
    /// The bytecode was rejected by the backend.
    CompilationError {
        /// A descriptive label for the shader, if available.
        label: String,
        /// Detailed error messages from the backend.
        details: String,
    },
    /// The requested shader module could not be found.
    NotFound {
        /// The ID of the shader module that was not found.
        id: ShaderId,
    },
    /// A shader was used in a pipeline slot of a different stage.
    StageMismatch {
        /// The shader used.
        id: ShaderId,
        /// The stage of the pipeline slot.
        expected: ShaderStage,
        /// The stage the shader was created for.
        actual: ShaderStage,
    },
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderError::CompilationError { label, details } => {
                write!(f, "Shader compilation failed for '{label}': {details}")
            }
            ShaderError::NotFound { id } => {
                write!(f, "Shader module not found for ID: {id:?}")
            }
            ShaderError::StageMismatch {
                id,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "Shader {id:?} was created for the {actual:?} stage but is used as a {expected:?} shader"
                )
            }
        }
    }
}

impl std::error::Error for ShaderError {}

/// An error related to the creation of a pipeline.
#[derive(Debug)]
pub enum PipelineError {
    /// A shader stage required by the pipeline kind is absent.
    MissingShaderStage {
        /// The missing stage.
        stage: ShaderStage,
    },
    /// A compute shader was combined with graphics stages.
    MixedComputeAndGraphics,
    /// Exactly one of the hull and domain shaders was provided.
    IncompleteTessellation,
    /// A patch list topology declared an invalid control point count.
    InvalidPatchControlPoints(u8),
    /// The backend failed to create a fixed-function state object.
    StateCreationFailed(String),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::MissingShaderStage { stage } => {
                write!(f, "Pipeline requires a {stage:?} shader")
            }
            PipelineError::MixedComputeAndGraphics => {
                write!(f, "A compute shader cannot be combined with graphics stages")
            }
            PipelineError::IncompleteTessellation => {
                write!(f, "Hull and domain shaders must be provided together")
            }
            PipelineError::InvalidPatchControlPoints(points) => {
                write!(f, "Invalid patch control point count: {points} (expected 1..=32)")
            }
            PipelineError::StateCreationFailed(msg) => {
                write!(f, "Fixed-function state creation failed: {msg}")
            }
        }
    }
}

impl std::error::Error for PipelineError {}

/// An error related to the creation or use of a GPU resource (buffers, textures, etc.).
#[derive(Debug)]
pub enum ResourceError {
    /// A shader-specific error occurred.
    Shader(ShaderError),
    /// A pipeline-specific error occurred.
    Pipeline(PipelineError),
    /// The descriptor passed to a create call is invalid.
    InvalidDescriptor(String),
    /// The resource does not allow the requested CPU access.
    NotMappable {
        /// The resource.
        resource: GpuResource,
        /// Description of the rejected access.
        requested: String,
    },
    /// An error originating from the specific graphics backend implementation.
    BackendError(String),
    /// An attempt was made to access a resource out of its bounds.
    OutOfBounds,
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::Shader(err) => write!(f, "Shader resource error: {err}"),
            ResourceError::Pipeline(err) => write!(f, "Pipeline resource error: {err}"),
            ResourceError::InvalidDescriptor(msg) => {
                write!(f, "Invalid resource descriptor: {msg}")
            }
            ResourceError::NotMappable {
                resource,
                requested,
            } => {
                write!(f, "{resource} cannot be mapped for {requested}")
            }
            ResourceError::BackendError(msg) => {
                write!(f, "Backend-specific resource error: {msg}")
            }
            ResourceError::OutOfBounds => {
                write!(f, "Resource access out of bounds.")
            }
        }
    }
}

impl std::error::Error for ResourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResourceError::Shader(err) => Some(err),
            ResourceError::Pipeline(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ShaderError> for ResourceError {
    fn from(err: ShaderError) -> Self {
        ResourceError::Shader(err)
    }
}

impl From<PipelineError> for ResourceError {
    fn from(err: PipelineError) -> Self {
        ResourceError::Pipeline(err)
    }
}

/// A high-level error that can occur within a graphics device.
#[derive(Debug)]
pub enum RenderError {
    /// A failure occurred during the initialization of the graphics backend.
    InitializationFailed(String),
    /// An error occurred while managing a GPU resource.
    ResourceError(ResourceError),
    /// The graphics device was lost and must be recreated.
    DeviceLost,
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::InitializationFailed(msg) => {
                write!(f, "Failed to initialize graphics backend: {msg}")
            }
            RenderError::ResourceError(err) => {
                write!(f, "Graphics resource operation failed: {err}")
            }
            RenderError::DeviceLost => write!(
                f,
                "The graphics device was lost and needs to be reinitialized."
            ),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::ResourceError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ResourceError> for RenderError {
    fn from(err: ResourceError) -> Self {
        RenderError::ResourceError(err)
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::*;
    use crate::renderer::api::resource::BufferId;

    #[test]
    fn shader_error_display() {
        let err = ShaderError::CompilationError {
            label: "MyShader".to_string(),
            details: "empty bytecode".to_string(),
        };
        assert_eq!(
            format!("{err}"),
            "Shader compilation failed for 'MyShader': empty bytecode"
        );
    }

    #[test]
    fn resource_error_display_wrapping_pipeline_error() {
        let res_err: ResourceError = PipelineError::MissingShaderStage {
            stage: ShaderStage::Pixel,
        }
        .into();
        assert_eq!(
            format!("{res_err}"),
            "Pipeline resource error: Pipeline requires a Pixel shader"
        );
        assert!(res_err.source().is_some());
    }

    #[test]
    fn render_error_display_wrapping_resource_error() {
        let shader_err = ShaderError::NotFound { id: ShaderId(101) };
        let res_err: ResourceError = shader_err.into();
        let render_err: RenderError = res_err.into();
        assert_eq!(
            format!("{render_err}"),
            "Graphics resource operation failed: Shader resource error: Shader module not found for ID: ShaderId(101)"
        );
        assert!(render_err.source().is_some());
        assert!(render_err.source().unwrap().source().is_some());
    }

    #[test]
    fn not_mappable_display() {
        let err = ResourceError::NotMappable {
            resource: GpuResource::Buffer(BufferId(3)),
            requested: "reading".to_string(),
        };
        assert_eq!(format!("{err}"), "buffer#3 cannot be mapped for reading");
    }
}
