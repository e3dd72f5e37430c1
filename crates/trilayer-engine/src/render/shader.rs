//! Two-stage shader programs.
//!
//! A program is a WGSL vertex module plus a WGSL fragment module. Each stage is
//! parsed and validated on its own ("compile"), then the pair is checked for a
//! matching interface ("link") before any GPU object is created. Linking
//! requires every fragment input location to be written by the vertex stage
//! with the same type and interpolation, and resources bound in both stages to
//! be declared identically. Failures come back as [`ShaderError`] values
//! carrying the stage and a readable log instead of surfacing later as device
//! validation panics.

use std::collections::BTreeMap;
use std::fmt;

use naga::valid::{Capabilities, ValidationFlags, Validator};

/// Pipeline stage of a shader module.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    /// Entry point name every program uses for this stage.
    pub const fn entry_point(self) -> &'static str {
        match self {
            Self::Vertex => "vs_main",
            Self::Fragment => "fs_main",
        }
    }

    fn naga_stage(self) -> naga::ShaderStage {
        match self {
            Self::Vertex => naga::ShaderStage::Vertex,
            Self::Fragment => naga::ShaderStage::Fragment,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vertex => f.write_str("VERTEX"),
            Self::Fragment => f.write_str("FRAGMENT"),
        }
    }
}

/// Shader build failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShaderError {
    /// A single stage failed to parse or validate.
    Compile { stage: ShaderStage, log: String },
    /// Both stages compiled but do not form a usable program.
    Link { log: String },
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compile { stage, log } => write!(f, "{stage} shader compilation failed:\n{log}"),
            Self::Link { log } => write!(f, "shader program link failed:\n{log}"),
        }
    }
}

impl std::error::Error for ShaderError {}

/// A compiled and linked vertex + fragment pair.
///
/// Holds the validated sources; GPU modules are created from them by
/// [`ShaderProgram::create_modules`].
#[derive(Debug, Clone)]
pub struct ShaderProgram {
    label: String,
    vertex_src: String,
    fragment_src: String,
}

impl ShaderProgram {
    pub fn compile_and_link(
        label: impl Into<String>,
        vertex_src: &str,
        fragment_src: &str,
    ) -> Result<Self, ShaderError> {
        let vertex = compile_stage(ShaderStage::Vertex, vertex_src)?;
        let fragment = compile_stage(ShaderStage::Fragment, fragment_src)?;
        link(&vertex, &fragment)?;

        let label = label.into();
        log::debug!("shader program '{label}' linked");

        Ok(Self {
            label,
            vertex_src: vertex_src.to_string(),
            fragment_src: fragment_src.to_string(),
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Creates the `(vertex, fragment)` GPU shader modules.
    pub fn create_modules(&self, device: &wgpu::Device) -> (wgpu::ShaderModule, wgpu::ShaderModule) {
        let vs_label = format!("{} vs", self.label);
        let fs_label = format!("{} fs", self.label);

        let vertex = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&vs_label),
            source: wgpu::ShaderSource::Wgsl(self.vertex_src.as_str().into()),
        });
        let fragment = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&fs_label),
            source: wgpu::ShaderSource::Wgsl(self.fragment_src.as_str().into()),
        });

        (vertex, fragment)
    }
}

fn compile_stage(stage: ShaderStage, src: &str) -> Result<naga::Module, ShaderError> {
    let module = naga::front::wgsl::parse_str(src).map_err(|e| ShaderError::Compile {
        stage,
        log: e.emit_to_string(src),
    })?;

    Validator::new(ValidationFlags::all(), Capabilities::default())
        .validate(&module)
        .map_err(|e| ShaderError::Compile {
            stage,
            log: e.emit_to_string(src),
        })?;

    Ok(module)
}

fn link(vertex: &naga::Module, fragment: &naga::Module) -> Result<(), ShaderError> {
    let vs = find_entry(vertex, ShaderStage::Vertex)?;
    let fs = find_entry(fragment, ShaderStage::Fragment)?;

    let mut produced = BTreeMap::new();
    if let Some(result) = &vs.function.result {
        collect_varyings(vertex, result.ty, result.binding.as_ref(), &mut produced);
    }

    let mut consumed = BTreeMap::new();
    for arg in &fs.function.arguments {
        collect_varyings(fragment, arg.ty, arg.binding.as_ref(), &mut consumed);
    }

    let mut problems = Vec::new();
    for (location, input) in &consumed {
        match produced.get(location) {
            None => problems.push(format!(
                "fragment input @location({location}) is not written by the vertex stage"
            )),
            Some(output) if output != input => problems.push(format!(
                "@location({location}) mismatch: vertex writes {output}, fragment reads {input}"
            )),
            Some(_) => {}
        }
    }

    let vertex_resources = collect_resources(vertex);
    for ((group, binding), frag_ty) in collect_resources(fragment) {
        if let Some(vert_ty) = vertex_resources.get(&(group, binding)) {
            if *vert_ty != frag_ty {
                problems.push(format!(
                    "@group({group}) @binding({binding}) declared differently: \
                     vertex has {vert_ty}, fragment has {frag_ty}"
                ));
            }
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(ShaderError::Link { log: problems.join("\n") })
    }
}

fn find_entry(module: &naga::Module, stage: ShaderStage) -> Result<&naga::EntryPoint, ShaderError> {
    let name = stage.entry_point();
    module
        .entry_points
        .iter()
        .find(|ep| ep.name == name && ep.stage == stage.naga_stage())
        .ok_or_else(|| ShaderError::Link {
            log: format!("missing {stage} entry point `{name}`"),
        })
}

/// What one stage says about a user `@location` on the interface.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Varying {
    ty: String,
    interpolation: Option<naga::Interpolation>,
    sampling: Option<naga::Sampling>,
}

impl fmt::Display for Varying {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ty)?;
        if let Some(interpolation) = self.interpolation {
            write!(f, " {interpolation:?}")?;
        }
        if let Some(sampling) = self.sampling {
            write!(f, " {sampling:?}")?;
        }
        Ok(())
    }
}

/// Gathers user `@location`s of a stage interface value, looking through structs.
fn collect_varyings(
    module: &naga::Module,
    ty: naga::Handle<naga::Type>,
    binding: Option<&naga::Binding>,
    out: &mut BTreeMap<u32, Varying>,
) {
    match binding {
        Some(binding) => {
            // Unannotated floats default to perspective/center; normalize so an
            // explicit default on one side still matches.
            let mut binding = binding.clone();
            binding.apply_default_interpolation(&module.types[ty].inner);
            if let naga::Binding::Location { location, interpolation, sampling, .. } = binding {
                out.insert(
                    location,
                    Varying {
                        ty: describe_type(module, ty),
                        interpolation,
                        sampling,
                    },
                );
            }
        }
        None => {
            if let naga::TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for member in members {
                    if member.binding.is_some() {
                        collect_varyings(module, member.ty, member.binding.as_ref(), out);
                    }
                }
            }
        }
    }
}

/// Bound globals keyed by `(group, binding)`, with their address space and type.
fn collect_resources(module: &naga::Module) -> BTreeMap<(u32, u32), String> {
    module
        .global_variables
        .iter()
        .filter_map(|(_, global)| {
            let rb = global.binding.as_ref()?;
            let desc = format!("{:?} {}", global.space, describe_type(module, global.ty));
            Some(((rb.group, rb.binding), desc))
        })
        .collect()
}

/// Module-independent description of a type, so two modules can be compared.
///
/// Struct names are ignored; member names, offsets and types are not.
fn describe_type(module: &naga::Module, ty: naga::Handle<naga::Type>) -> String {
    match &module.types[ty].inner {
        naga::TypeInner::Scalar(scalar) => describe_scalar(*scalar),
        naga::TypeInner::Vector { size, scalar } => {
            format!("vec{}<{}>", *size as u8, describe_scalar(*scalar))
        }
        naga::TypeInner::Matrix { columns, rows, scalar } => {
            format!("mat{}x{}<{}>", *columns as u8, *rows as u8, describe_scalar(*scalar))
        }
        naga::TypeInner::Array { base, size, stride } => {
            format!("array<{}, {size:?}> stride {stride}", describe_type(module, *base))
        }
        naga::TypeInner::Struct { members, span } => {
            let fields: Vec<String> = members
                .iter()
                .map(|m| {
                    format!(
                        "{}@{}: {}",
                        m.name.as_deref().unwrap_or("_"),
                        m.offset,
                        describe_type(module, m.ty)
                    )
                })
                .collect();
            format!("struct {{ {} }} ({span} bytes)", fields.join(", "))
        }
        other => format!("{other:?}"),
    }
}

fn describe_scalar(scalar: naga::Scalar) -> String {
    format!("{:?}{}", scalar.kind, u32::from(scalar.width) * 8)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VS: &str = r#"
struct VsOut {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec3<f32>,
};

@vertex
fn vs_main(@location(0) position: vec3<f32>, @location(1) color: vec3<f32>) -> VsOut {
    var out: VsOut;
    out.clip_position = vec4<f32>(position, 1.0);
    out.color = color;
    return out;
}
"#;

    const FS: &str = r#"
@fragment
fn fs_main(@location(0) color: vec3<f32>) -> @location(0) vec4<f32> {
    return vec4<f32>(color, 1.0);
}
"#;

    // ── compile ───────────────────────────────────────────────────────────

    #[test]
    fn valid_pair_links() {
        let program = ShaderProgram::compile_and_link("test", VS, FS).unwrap();
        assert_eq!(program.label(), "test");
    }

    #[test]
    fn syntax_error_reports_vertex_stage() {
        let broken = VS.replace("return out;", "return out");
        match ShaderProgram::compile_and_link("test", &broken, FS).unwrap_err() {
            ShaderError::Compile { stage, log } => {
                assert_eq!(stage, ShaderStage::Vertex);
                assert!(!log.is_empty());
            }
            other => panic!("expected compile error, got {other:?}"),
        }
    }

    #[test]
    fn type_error_reports_fragment_stage() {
        let broken = FS.replace("vec4<f32>(color, 1.0)", "color");
        let err = ShaderProgram::compile_and_link("test", VS, &broken).unwrap_err();
        assert!(matches!(
            err,
            ShaderError::Compile { stage: ShaderStage::Fragment, .. }
        ));
    }

    // ── link ──────────────────────────────────────────────────────────────

    #[test]
    fn missing_fragment_entry_fails_link() {
        let renamed = FS.replace("fs_main", "main");
        let err = ShaderProgram::compile_and_link("test", VS, &renamed).unwrap_err();
        match err {
            ShaderError::Link { log } => assert!(log.contains("fs_main")),
            other => panic!("expected link error, got {other:?}"),
        }
    }

    #[test]
    fn vertex_entry_in_fragment_slot_fails_link() {
        let err = ShaderProgram::compile_and_link("test", VS, VS).unwrap_err();
        assert!(matches!(err, ShaderError::Link { .. }));
    }

    #[test]
    fn unwritten_fragment_input_fails_link() {
        let fs = r#"
@fragment
fn fs_main(@location(0) color: vec3<f32>, @location(3) extra: f32) -> @location(0) vec4<f32> {
    return vec4<f32>(color, extra);
}
"#;
        match ShaderProgram::compile_and_link("test", VS, fs).unwrap_err() {
            ShaderError::Link { log } => assert!(log.contains("@location(3)")),
            other => panic!("expected link error, got {other:?}"),
        }
    }

    #[test]
    fn mismatched_location_type_fails_link() {
        let fs = FS.replace("color: vec3<f32>", "color: vec4<f32>")
            .replace("vec4<f32>(color, 1.0)", "color");
        match ShaderProgram::compile_and_link("test", VS, &fs).unwrap_err() {
            ShaderError::Link { log } => {
                assert!(log.contains("@location(0)"), "{log}");
                assert!(log.contains("vec3") && log.contains("vec4"), "{log}");
            }
            other => panic!("expected link error, got {other:?}"),
        }
    }

    #[test]
    fn mismatched_interpolation_fails_link() {
        let vs = VS.replace(
            "@location(0) color: vec3<f32>,\n};",
            "@location(0) @interpolate(flat) color: vec3<f32>,\n};",
        );
        assert_ne!(vs, VS);
        let err = ShaderProgram::compile_and_link("test", &vs, FS).unwrap_err();
        assert!(matches!(err, ShaderError::Link { .. }), "{err}");
    }

    #[test]
    fn explicit_default_interpolation_still_links() {
        let fs = FS.replace(
            "@location(0) color: vec3<f32>)",
            "@location(0) @interpolate(perspective, center) color: vec3<f32>)",
        );
        assert_ne!(fs, FS);
        assert!(ShaderProgram::compile_and_link("test", VS, &fs).is_ok());
    }

    const UNIFORM_VS: &str = r#"
struct Params {
    offset: vec3<f32>,
    alpha: f32,
};

@group(0) @binding(0)
var<uniform> params: Params;

@vertex
fn vs_main(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
    return vec4<f32>(position + params.offset, 1.0);
}
"#;

    const UNIFORM_FS: &str = r#"
struct Params {
    offset: vec3<f32>,
    alpha: f32,
};

@group(0) @binding(0)
var<uniform> params: Params;

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(1.0, 1.0, 1.0, params.alpha);
}
"#;

    #[test]
    fn identical_uniform_blocks_link() {
        assert!(ShaderProgram::compile_and_link("test", UNIFORM_VS, UNIFORM_FS).is_ok());
    }

    #[test]
    fn uniform_block_layout_mismatch_fails_link() {
        let fs = UNIFORM_FS.replace("offset: vec3<f32>,", "offset: vec4<f32>,");
        match ShaderProgram::compile_and_link("test", UNIFORM_VS, &fs).unwrap_err() {
            ShaderError::Link { log } => assert!(log.contains("@group(0) @binding(0)"), "{log}"),
            other => panic!("expected link error, got {other:?}"),
        }
    }

    #[test]
    fn uniform_member_rename_fails_link() {
        let fs = UNIFORM_FS
            .replace("    alpha: f32,", "    opacity: f32,")
            .replace("params.alpha", "params.opacity");
        let err = ShaderProgram::compile_and_link("test", UNIFORM_VS, &fs).unwrap_err();
        assert!(matches!(err, ShaderError::Link { .. }), "{err}");
    }

    #[test]
    fn resource_used_by_one_stage_only_links() {
        let fs = r#"
@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(1.0);
}
"#;
        assert!(ShaderProgram::compile_and_link("test", UNIFORM_VS, fs).is_ok());
    }

    // ── display ───────────────────────────────────────────────────────────

    #[test]
    fn display_names_stage() {
        let e = ShaderError::Compile { stage: ShaderStage::Fragment, log: "bad".into() };
        assert_eq!(e.to_string(), "FRAGMENT shader compilation failed:\nbad");
    }
}
