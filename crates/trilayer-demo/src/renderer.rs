use anyhow::Result;
use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;

use trilayer_engine::device::Gpu;
use trilayer_engine::render::{RenderCtx, RenderTarget, ShaderProgram};

use crate::geometry::{EDGE_INDICES, Layer, VERTICES, Vertex};
use crate::params::{LayerParams, RasterMode, RenderParameters};

const VERTEX_SHADER: &str = include_str!("shaders/layer.vert.wgsl");
const FRAGMENT_SHADER: &str = include_str!("shaders/layer.frag.wgsl");

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// GPU layout of the shaders' `LayerUniforms` block (vec3 + f32 packs to 16 bytes).
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct ShapeUniforms {
    offset: [f32; 3],
    alpha: f32,
    color_mod: [f32; 3],
    _pad: f32,
}

impl From<&LayerParams> for ShapeUniforms {
    fn from(p: &LayerParams) -> Self {
        Self {
            offset: p.offset,
            alpha: p.alpha,
            color_mod: p.color_mod,
            _pad: 0.0,
        }
    }
}

/// How outlines are rasterized.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum WireframeMode {
    /// Triangles with `PolygonMode::Line`.
    PolygonLine,
    /// Line list over `EDGE_INDICES`; works without any device feature.
    EdgeList,
}

impl WireframeMode {
    fn for_features(features: wgpu::Features) -> Self {
        if features.contains(wgpu::Features::POLYGON_MODE_LINE) {
            Self::PolygonLine
        } else {
            Self::EdgeList
        }
    }
}

struct LayerBinding {
    ubo: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

struct DepthTarget {
    size: PhysicalSize<u32>,
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

/// Draws the two triangles, far first, with depth test and alpha blending.
///
/// All resources are created up front by [`LayeredRenderer::new`]; only the
/// depth target follows the surface size.
pub struct LayeredRenderer {
    fill_pipeline: wgpu::RenderPipeline,
    wire_pipeline: wgpu::RenderPipeline,
    wireframe: WireframeMode,

    vertex_buffer: wgpu::Buffer,
    edge_buffer: wgpu::Buffer,

    /// Indexed by `Layer::index`.
    layers: [LayerBinding; 2],

    depth: Option<DepthTarget>,
}

impl LayeredRenderer {
    /// Compiles the shaders, builds both pipelines and uploads the geometry.
    ///
    /// Shader compile and link failures are returned as `ShaderError`.
    pub fn new(gpu: &Gpu<'_>) -> Result<Self> {
        let device = gpu.device();

        let program = ShaderProgram::compile_and_link("trilayer layer", VERTEX_SHADER, FRAGMENT_SHADER)?;
        let (vs, fs) = program.create_modules(device);

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("trilayer layer bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<ShapeUniforms>() as u64,
                    ),
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("trilayer layer pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let wireframe = WireframeMode::for_features(gpu.features());
        log::info!(
            "wireframe rendering via {wireframe:?} on '{}'",
            gpu.adapter_info().name
        );

        let format = gpu.surface_format();
        let fill_pipeline = create_pipeline(
            device,
            &pipeline_layout,
            (&vs, &fs),
            format,
            "trilayer fill pipeline",
            wgpu::PrimitiveTopology::TriangleList,
            wgpu::PolygonMode::Fill,
        );
        let wire_pipeline = match wireframe {
            WireframeMode::PolygonLine => create_pipeline(
                device,
                &pipeline_layout,
                (&vs, &fs),
                format,
                "trilayer wireframe pipeline",
                wgpu::PrimitiveTopology::TriangleList,
                wgpu::PolygonMode::Line,
            ),
            WireframeMode::EdgeList => create_pipeline(
                device,
                &pipeline_layout,
                (&vs, &fs),
                format,
                "trilayer edge pipeline",
                wgpu::PrimitiveTopology::LineList,
                wgpu::PolygonMode::Fill,
            ),
        };

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("trilayer vbo"),
            contents: bytemuck::cast_slice(&VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let edge_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("trilayer edge ibo"),
            contents: bytemuck::cast_slice(&EDGE_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });

        let layers = [Layer::Near, Layer::Far].map(|layer| {
            let label = format!("trilayer {layer:?} ubo");
            let ubo = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(&label),
                size: std::mem::size_of::<ShapeUniforms>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("trilayer layer bind group"),
                layout: &bind_group_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: ubo.as_entire_binding(),
                }],
            });
            LayerBinding { ubo, bind_group }
        });

        Ok(Self {
            fill_pipeline,
            wire_pipeline,
            wireframe,
            vertex_buffer,
            edge_buffer,
            layers,
            depth: None,
        })
    }

    /// Records one frame into `target`.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        params: &RenderParameters,
    ) {
        if ctx.surface_size.width == 0 || ctx.surface_size.height == 0 {
            return;
        }
        self.ensure_depth_target(ctx);
        let Some(depth) = self.depth.as_ref() else { return };

        let draws = params.draw_sequence();
        for (layer, p) in &draws {
            let u = ShapeUniforms::from(*p);
            ctx.queue
                .write_buffer(&self.layers[layer.index()].ubo, 0, bytemuck::bytes_of(&u));
        }

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("trilayer layer pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &depth.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        // Raster mode is fixed for the whole frame.
        let edges = match params.raster {
            RasterMode::Fill => {
                rpass.set_pipeline(&self.fill_pipeline);
                false
            }
            RasterMode::Wireframe => {
                rpass.set_pipeline(&self.wire_pipeline);
                self.wireframe == WireframeMode::EdgeList
            }
        };

        rpass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        if edges {
            rpass.set_index_buffer(self.edge_buffer.slice(..), wgpu::IndexFormat::Uint16);
        }

        for (layer, _) in &draws {
            rpass.set_bind_group(0, &self.layers[layer.index()].bind_group, &[]);
            if edges {
                rpass.draw_indexed(layer.edge_indices(), 0, 0..1);
            } else {
                rpass.draw(layer.vertices(), 0..1);
            }
        }
    }

    /// Frees GPU memory: buffers and depth target first, then the pipelines.
    pub fn release(self) {
        let Self {
            fill_pipeline,
            wire_pipeline,
            vertex_buffer,
            edge_buffer,
            layers,
            depth,
            ..
        } = self;

        vertex_buffer.destroy();
        edge_buffer.destroy();
        for binding in &layers {
            binding.ubo.destroy();
        }
        if let Some(depth) = &depth {
            depth.texture.destroy();
        }
        drop((vertex_buffer, edge_buffer, layers, depth));
        log::debug!("geometry buffers released");

        drop((fill_pipeline, wire_pipeline));
        log::debug!("shader pipelines released");
    }

    fn ensure_depth_target(&mut self, ctx: &RenderCtx<'_>) {
        if self.depth.as_ref().is_some_and(|d| d.size == ctx.surface_size) {
            return;
        }

        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("trilayer depth"),
            size: wgpu::Extent3d {
                width: ctx.surface_size.width,
                height: ctx.surface_size.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        if let Some(old) = self.depth.take() {
            old.texture.destroy();
        }
        self.depth = Some(DepthTarget {
            size: ctx.surface_size,
            texture,
            view,
        });
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    (vs, fs): (&wgpu::ShaderModule, &wgpu::ShaderModule),
    format: wgpu::TextureFormat,
    label: &str,
    topology: wgpu::PrimitiveTopology,
    polygon_mode: wgpu::PolygonMode,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),

        vertex: wgpu::VertexState {
            module: vs,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[Vertex::layout()],
        },

        fragment: Some(wgpu::FragmentState {
            module: fs,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),

        primitive: wgpu::PrimitiveState {
            topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode,
            unclipped_depth: false,
            conservative: false,
        },

        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),

        multiview_mask: None,
        cache: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use trilayer_engine::render::ShaderError;

    #[test]
    fn layer_shaders_compile_and_link() {
        match ShaderProgram::compile_and_link("test", VERTEX_SHADER, FRAGMENT_SHADER) {
            Ok(program) => assert_eq!(program.label(), "test"),
            Err(ShaderError::Compile { stage, log }) => panic!("{stage} stage rejected: {log}"),
            Err(ShaderError::Link { log }) => panic!("link rejected: {log}"),
        }
    }

    #[test]
    fn uniform_block_matches_wgsl_layout() {
        // vec3 offset + f32 alpha, vec3 color_mod + f32 pad.
        assert_eq!(std::mem::size_of::<ShapeUniforms>(), 32);
        let u = ShapeUniforms::from(&LayerParams {
            offset: [1.0, 2.0, 3.0],
            alpha: 0.5,
            color_mod: [0.1, 0.2, 0.3],
        });
        let floats: &[f32] = bytemuck::cast_slice(bytemuck::bytes_of(&u));
        assert_eq!(floats, &[1.0, 2.0, 3.0, 0.5, 0.1, 0.2, 0.3, 0.0]);
    }

    #[test]
    fn wireframe_mode_follows_device_features() {
        assert_eq!(
            WireframeMode::for_features(wgpu::Features::POLYGON_MODE_LINE),
            WireframeMode::PolygonLine
        );
        assert_eq!(
            WireframeMode::for_features(wgpu::Features::empty()),
            WireframeMode::EdgeList
        );
    }

    // ── fragment shader ───────────────────────────────────────────────────

    fn fragment_entry(module: &naga::Module) -> &naga::Function {
        &module
            .entry_points
            .iter()
            .find(|ep| ep.name == "fs_main")
            .expect("fs_main entry point")
            .function
    }

    /// Value of a scalar literal, or of a vector whose lanes are all the same literal.
    fn uniform_constant(
        module: &naga::Module,
        exprs: &naga::Arena<naga::Expression>,
        h: naga::Handle<naga::Expression>,
    ) -> Option<f64> {
        use naga::Expression as E;
        match &exprs[h] {
            E::Literal(naga::Literal::F32(v)) => Some(*v as f64),
            E::Literal(naga::Literal::AbstractFloat(v)) => Some(*v),
            E::ZeroValue(_) => Some(0.0),
            E::Splat { value, .. } => uniform_constant(module, exprs, *value),
            E::Compose { components, .. } => {
                let mut lanes = components.iter().map(|c| uniform_constant(module, exprs, *c));
                let first = lanes.next()??;
                lanes.all(|v| v == Some(first)).then_some(first)
            }
            E::Constant(c) => {
                uniform_constant(module, &module.global_expressions, module.constants[*c].init)
            }
            _ => None,
        }
    }

    /// Member of the `shape` uniform block that `h` loads, if it is such a load.
    fn uniform_member<'m>(
        module: &'m naga::Module,
        func: &naga::Function,
        h: naga::Handle<naga::Expression>,
    ) -> Option<&'m str> {
        use naga::Expression as E;
        let E::Load { pointer } = &func.expressions[h] else { return None };
        let E::AccessIndex { base, index } = &func.expressions[*pointer] else { return None };
        let E::GlobalVariable(g) = &func.expressions[*base] else { return None };

        let global = &module.global_variables[*g];
        if global.name.as_deref() != Some("shape") {
            return None;
        }
        let naga::TypeInner::Struct { members, .. } = &module.types[global.ty].inner else {
            return None;
        };
        members.get(*index as usize)?.name.as_deref()
    }

    #[test]
    fn fragment_stage_clamps_tinted_colour_to_unit_range() {
        use naga::Expression as E;

        let module = naga::front::wgsl::parse_str(FRAGMENT_SHADER).expect("fragment shader parses");
        let func = fragment_entry(&module);
        let exprs = &func.expressions;

        let returned = func
            .body
            .iter()
            .find_map(|s| match s {
                naga::Statement::Return { value } => *value,
                _ => None,
            })
            .expect("fs_main returns a value");

        let E::Compose { components, .. } = &exprs[returned] else {
            panic!("fs_main must return vec4(rgb, alpha), got {:?}", exprs[returned]);
        };
        assert_eq!(components.len(), 2);
        let (rgb, alpha) = (components[0], components[1]);

        assert_eq!(uniform_member(&module, func, alpha), Some("alpha"));

        let E::Math {
            fun: naga::MathFunction::Clamp,
            arg,
            arg1: Some(lo),
            arg2: Some(hi),
            ..
        } = &exprs[rgb]
        else {
            panic!("rgb must be a clamp, got {:?}", exprs[rgb]);
        };
        assert_eq!(uniform_constant(&module, exprs, *lo), Some(0.0));
        assert_eq!(uniform_constant(&module, exprs, *hi), Some(1.0));

        let E::Binary { op: naga::BinaryOperator::Add, left, right } = &exprs[*arg] else {
            panic!("clamped value must be a sum, got {:?}", exprs[*arg]);
        };
        // Either operand order is the same sum.
        let (colour, tint) = if matches!(exprs[*left], E::FunctionArgument(0)) {
            (*left, *right)
        } else {
            (*right, *left)
        };
        assert!(matches!(exprs[colour], E::FunctionArgument(0)));
        assert_eq!(uniform_member(&module, func, tint), Some("color_mod"));
    }
}
