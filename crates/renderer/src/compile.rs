//! Bundled GLSL assets plus the compile/link checks run before any GPU object
//! is created.
//!
//! Both stages go through naga's GLSL frontend and validator. A stage that
//! fails either step is a compile error; mismatched stage interfaces or a
//! missing `main` are link errors, mirroring what a GL driver would report.

use std::borrow::Cow;

use wgpu::naga::front::glsl;
use wgpu::naga::valid::{Capabilities, ValidationFlags, Validator};
use wgpu::naga::{self, Binding, Module, TypeInner};

use crate::error::{RenderError, StageKind};
use crate::types::Orientation;

/// Bumped whenever the bundled shader sources change behaviour.
pub const SHADER_ASSET_VERSION: u32 = 1;

/// Full-screen quad vertex shader; emits `v_texCoord` with a bottom-left origin.
pub const VERTEX_SHADER_GLSL: &str = r"#version 450
layout(location = 0) in vec2 a_position;
layout(location = 0) out vec2 v_texCoord;

void main() {
    gl_Position = vec4(a_position, 0.0, 1.0);
    v_texCoord = a_position * 0.5 + 0.5;
}
";

/// Side-by-side frames: colour left, matte right.
pub const HORIZONTAL_FRAGMENT_GLSL: &str = r"#version 450
layout(location = 0) in vec2 v_texCoord;
layout(location = 0) out vec4 outColor;

layout(set = 0, binding = 0) uniform texture2D u_frame;
layout(set = 0, binding = 1) uniform sampler u_frameSampler;

void main() {
    vec2 color_uv = vec2(v_texCoord.x * 0.5, 1.0 - v_texCoord.y);
    vec2 matte_uv = color_uv + vec2(0.5, 0.0);
    vec4 color = texture(sampler2D(u_frame, u_frameSampler), color_uv);
    vec4 matte = texture(sampler2D(u_frame, u_frameSampler), matte_uv);
    outColor = vec4(color.rgb, matte.r);
}
";

/// Stacked frames: colour on top, matte below.
pub const VERTICAL_FRAGMENT_GLSL: &str = r"#version 450
layout(location = 0) in vec2 v_texCoord;
layout(location = 0) out vec4 outColor;

layout(set = 0, binding = 0) uniform texture2D u_frame;
layout(set = 0, binding = 1) uniform sampler u_frameSampler;

void main() {
    vec2 color_uv = vec2(v_texCoord.x, (1.0 - v_texCoord.y) * 0.5);
    vec2 matte_uv = color_uv + vec2(0.0, 0.5);
    vec4 color = texture(sampler2D(u_frame, u_frameSampler), color_uv);
    vec4 matte = texture(sampler2D(u_frame, u_frameSampler), matte_uv);
    outColor = vec4(color.rgb, matte.r);
}
";

/// Vertex source plus one fragment variant per orientation.
#[derive(Debug, Clone)]
pub struct ShaderSources {
    pub vertex: Cow<'static, str>,
    pub horizontal: Cow<'static, str>,
    pub vertical: Cow<'static, str>,
}

impl ShaderSources {
    pub fn fragment(&self, orientation: Orientation) -> &str {
        match orientation {
            Orientation::Horizontal => &self.horizontal,
            Orientation::Vertical => &self.vertical,
        }
    }
}

impl Default for ShaderSources {
    fn default() -> Self {
        Self {
            vertex: Cow::Borrowed(VERTEX_SHADER_GLSL),
            horizontal: Cow::Borrowed(HORIZONTAL_FRAGMENT_GLSL),
            vertical: Cow::Borrowed(VERTICAL_FRAGMENT_GLSL),
        }
    }
}

/// Compiles and links a vertex/fragment pair without touching the GPU.
pub fn check_program(vertex: &str, fragment: &str) -> Result<(), RenderError> {
    let vertex_module = compile_stage(vertex, StageKind::Vertex)?;
    let fragment_module = compile_stage(fragment, StageKind::Fragment)?;
    link_stages(&vertex_module, &fragment_module)
}

pub(crate) fn compile_stage(source: &str, stage: StageKind) -> Result<Module, RenderError> {
    let mut frontend = glsl::Frontend::default();
    let module = frontend
        .parse(&glsl::Options::from(stage.to_naga()), source)
        .map_err(|errors| RenderError::ShaderCompile {
            stage,
            log: errors.emit_to_string(source),
        })?;

    Validator::new(ValidationFlags::all(), Capabilities::all())
        .validate(&module)
        .map_err(|error| RenderError::ShaderCompile {
            stage,
            log: error.emit_to_string(source),
        })?;

    tracing::trace!(%stage, "shader stage compiled");
    Ok(module)
}

#[derive(Debug)]
struct Varying {
    location: u32,
    ty: TypeInner,
}

fn link_stages(vertex: &Module, fragment: &Module) -> Result<(), RenderError> {
    let vertex_entry = entry_point(vertex, StageKind::Vertex)?;
    let fragment_entry = entry_point(fragment, StageKind::Fragment)?;

    let mut outputs = Vec::new();
    if let Some(result) = vertex_entry.function.result.as_ref() {
        collect_varyings(vertex, result.ty, result.binding.as_ref(), &mut outputs);
    }

    let mut inputs = Vec::new();
    for argument in &fragment_entry.function.arguments {
        collect_varyings(fragment, argument.ty, argument.binding.as_ref(), &mut inputs);
    }

    for input in &inputs {
        match outputs.iter().find(|output| output.location == input.location) {
            None => {
                return Err(RenderError::ShaderLink {
                    log: format!(
                        "fragment input at location {} ({:?}) is not written by the vertex stage",
                        input.location, input.ty
                    ),
                })
            }
            Some(output) if output.ty != input.ty => {
                return Err(RenderError::ShaderLink {
                    log: format!(
                        "location {} type mismatch: vertex writes {:?}, fragment reads {:?}",
                        input.location, output.ty, input.ty
                    ),
                })
            }
            Some(_) => {}
        }
    }

    Ok(())
}

fn entry_point(module: &Module, stage: StageKind) -> Result<&naga::EntryPoint, RenderError> {
    let wanted = stage.to_naga();
    module
        .entry_points
        .iter()
        .find(|entry| entry.stage == wanted && entry.name == "main")
        .ok_or_else(|| RenderError::ShaderLink {
            log: format!("{stage} shader has no `main` entry point"),
        })
}

fn collect_varyings(
    module: &Module,
    ty: naga::Handle<naga::Type>,
    binding: Option<&Binding>,
    out: &mut Vec<Varying>,
) {
    match binding {
        Some(Binding::Location { location, .. }) => out.push(Varying {
            location: *location,
            ty: module.types[ty].inner.clone(),
        }),
        Some(Binding::BuiltIn(_)) => {}
        None => {
            if let TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for member in members {
                    collect_varyings(module, member.ty, member.binding.as_ref(), out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_programs_link() {
        let sources = ShaderSources::default();
        for orientation in Orientation::ALL {
            check_program(&sources.vertex, sources.fragment(orientation))
                .unwrap_or_else(|err| panic!("{orientation} program: {err}"));
        }
    }

    #[test]
    fn syntax_error_reports_stage() {
        let broken = "#version 450\nvoid main() { this is not glsl }\n";
        let err = check_program(VERTEX_SHADER_GLSL, broken).unwrap_err();
        match err {
            RenderError::ShaderCompile { stage, log } => {
                assert_eq!(stage, StageKind::Fragment);
                assert!(!log.is_empty());
            }
            other => panic!("expected compile error, got {other:?}"),
        }

        let err = check_program(broken, HORIZONTAL_FRAGMENT_GLSL).unwrap_err();
        assert!(matches!(
            err,
            RenderError::ShaderCompile {
                stage: StageKind::Vertex,
                ..
            }
        ));
    }

    #[test]
    fn compile_failure_is_deterministic() {
        let broken = "#version 450\nvoid main() { undefined_call(); }\n";
        let first = check_program(VERTEX_SHADER_GLSL, broken).unwrap_err().to_string();
        let second = check_program(VERTEX_SHADER_GLSL, broken).unwrap_err().to_string();
        assert_eq!(first, second);
    }

    #[test]
    fn unmatched_varying_fails_to_link() {
        let fragment = r"#version 450
layout(location = 3) in vec2 v_elsewhere;
layout(location = 0) out vec4 outColor;

void main() {
    outColor = vec4(v_elsewhere, 0.0, 1.0);
}
";
        let err = check_program(VERTEX_SHADER_GLSL, fragment).unwrap_err();
        match err {
            RenderError::ShaderLink { log } => assert!(log.contains("location 3")),
            other => panic!("expected link error, got {other:?}"),
        }
    }

    #[test]
    fn mismatched_varying_type_fails_to_link() {
        let fragment = r"#version 450
layout(location = 0) in vec4 v_texCoord;
layout(location = 0) out vec4 outColor;

void main() {
    outColor = v_texCoord;
}
";
        let err = check_program(VERTEX_SHADER_GLSL, fragment).unwrap_err();
        assert!(matches!(err, RenderError::ShaderLink { .. }));
    }
}
