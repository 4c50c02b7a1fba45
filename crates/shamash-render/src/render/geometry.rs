use anyhow::Result;

use crate::camera::CameraBinding;
use crate::scene::{Material, Node, Primitive, Scene, SceneLayouts, SceneVisitor, Vertex};

use super::gbuffer::{formats, COLOR_CLEAR, DEPTH_CLEAR};
use super::{binding, GBuffer};

/// G-buffer fill pass.
///
/// Rasterizes every opaque primitive with depth test/write enabled, emitting
/// world position, world normal and albedo to the three color attachments.
/// Reads nothing back; occluded fragments are rejected by the depth test so
/// each pixel ends up holding exactly the nearest surface.
pub struct GeometryPass {
    pipeline: wgpu::RenderPipeline,
    scene_bind_group: wgpu::BindGroup,
}

impl GeometryPass {
    /// Color target formats this pipeline renders to, in attachment order.
    ///
    /// Must agree with the G-buffer's actual texture formats; the renderer
    /// cross-checks the two at construction and refuses to start otherwise.
    pub const TARGET_FORMATS: [wgpu::TextureFormat; 3] = formats::COLOR;

    pub fn new(
        device: &wgpu::Device,
        camera: &CameraBinding,
        layouts: &SceneLayouts,
    ) -> Result<Self> {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("shamash geometry shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/geometry.wgsl").into()),
        });

        let scene_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("shamash geometry scene bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: Some(CameraBinding::min_binding_size()),
                },
                count: None,
            }],
        });

        let scene_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("shamash geometry scene bind group"),
            layout: &scene_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera.buffer().as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("shamash geometry pipeline layout"),
            bind_group_layouts: &[&scene_bgl, &layouts.model, &layouts.material],
            immediate_size: 0,
        });

        let targets: Vec<Option<wgpu::ColorTargetState>> = Self::TARGET_FORMATS
            .iter()
            .map(|&format| {
                Some(wgpu::ColorTargetState {
                    format,
                    // Opaque geometry only; float targets do not blend anyway.
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })
            })
            .collect();

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("shamash geometry pipeline"),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[Vertex::layout()],
            },

            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &targets,
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: Some(wgpu::DepthStencilState {
                format: formats::DEPTH,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),

            multiview_mask: None,
            cache: None,
        });

        Ok(Self {
            pipeline,
            scene_bind_group,
        })
    }

    /// Records the pass: clear all channels to the neutral value, depth to
    /// far, then draw the scene in traversal order.
    pub fn record(&self, encoder: &mut wgpu::CommandEncoder, gbuffer: &GBuffer, scene: &Scene) {
        let color_attachment = |view| {
            Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(COLOR_CLEAR),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })
        };

        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("shamash geometry pass"),
            color_attachments: &[
                color_attachment(&gbuffer.position_view),
                color_attachment(&gbuffer.normal_view),
                color_attachment(&gbuffer.albedo_view),
            ],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &gbuffer.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(DEPTH_CLEAR),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(binding::GROUP_SCENE, &self.scene_bind_group, &[]);

        scene.visit(&mut DrawVisitor { rpass: &mut rpass });
    }
}

/// Issues the per-draw binding discipline as the traversal proceeds:
/// model group per node, material group per material, buffers + indexed
/// draw per primitive.
struct DrawVisitor<'a, 'p> {
    rpass: &'a mut wgpu::RenderPass<'p>,
}

impl SceneVisitor for DrawVisitor<'_, '_> {
    fn node(&mut self, node: &Node) {
        self.rpass
            .set_bind_group(binding::GROUP_MODEL, node.bind_group(), &[]);
    }

    fn material(&mut self, material: &Material) {
        self.rpass
            .set_bind_group(binding::GROUP_MATERIAL, material.bind_group(), &[]);
    }

    fn primitive(&mut self, primitive: &Primitive) {
        self.rpass
            .set_vertex_buffer(0, primitive.vertex_buffer.slice(..));
        self.rpass
            .set_index_buffer(primitive.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.rpass.draw_indexed(0..primitive.index_count, 0, 0..1);
    }
}
