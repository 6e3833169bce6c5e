//! シーン描画パイプラインモジュール
//!
//! 建物モデルの描画パイプラインとサーフェスごとのGPUバッファ

use wgpu::util::DeviceExt;

use super::depth::DEPTH_FORMAT;
use super::gpu_context::GpuContext;
use crate::shaders;

use viewer_core::{Color, ModelUniform};
use viewer_renderer::{LightUniform, MaterialUniform, Mesh, Vertex};

/// 1サーフェス分のGPUリソース
pub struct SurfaceBuffers {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_indices: u32,
    pub double_sided: bool,
    pub material_buffer: wgpu::Buffer,
    pub material_bind_group: wgpu::BindGroup,
}

/// シーン描画パイプライン
pub struct ScenePipeline {
    pipeline: wgpu::RenderPipeline,
    double_sided_pipeline: wgpu::RenderPipeline,
    pub camera_buffer: wgpu::Buffer,
    pub light_buffer: wgpu::Buffer,
    pub frame_bind_group: wgpu::BindGroup,
    pub model_buffer: wgpu::Buffer,
    pub model_bind_group: wgpu::BindGroup,
    material_bind_group_layout: wgpu::BindGroupLayout,
}

fn uniform_layout_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

impl ScenePipeline {
    /// 新しいシーンパイプラインを作成
    pub fn new(ctx: &GpuContext, camera_uniform: &[u8], light: &LightUniform) -> Self {
        // Camera / Light Uniform Buffer
        let camera_buffer = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: camera_uniform,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let light_buffer = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Light Buffer"),
            contents: bytemuck::bytes_of(light),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        // group(0): フレーム単位（カメラ + ライト）
        let frame_bind_group_layout =
            ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Frame Bind Group Layout"),
                entries: &[
                    uniform_layout_entry(0, wgpu::ShaderStages::VERTEX_FRAGMENT),
                    uniform_layout_entry(1, wgpu::ShaderStages::FRAGMENT),
                ],
            });

        let frame_bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Bind Group"),
            layout: &frame_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: light_buffer.as_entire_binding(),
                },
            ],
        });

        // group(1): モデル行列
        let model_uniform = ModelUniform::identity();
        let model_buffer = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Model Buffer"),
            contents: bytemuck::bytes_of(&model_uniform),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let model_bind_group_layout =
            ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Model Bind Group Layout"),
                entries: &[uniform_layout_entry(0, wgpu::ShaderStages::VERTEX)],
            });

        let model_bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Model Bind Group"),
            layout: &model_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: model_buffer.as_entire_binding(),
            }],
        });

        // group(2): サーフェスごとのマテリアル色
        let material_bind_group_layout =
            ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Material Bind Group Layout"),
                entries: &[uniform_layout_entry(0, wgpu::ShaderStages::FRAGMENT)],
            });

        // シェーダーモジュール作成
        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::MAIN_SHADER.into()),
        });

        let render_pipeline_layout =
            ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Render Pipeline Layout"),
                bind_group_layouts: &[
                    &frame_bind_group_layout,
                    &model_bind_group_layout,
                    &material_bind_group_layout,
                ],
                push_constant_ranges: &[],
            });

        // 片面用（裏面カリング）と両面用の2本
        let pipeline = create_pipeline(ctx, &render_pipeline_layout, &shader, Some(wgpu::Face::Back));
        let double_sided_pipeline = create_pipeline(ctx, &render_pipeline_layout, &shader, None);

        Self {
            pipeline,
            double_sided_pipeline,
            camera_buffer,
            light_buffer,
            frame_bind_group,
            model_buffer,
            model_bind_group,
            material_bind_group_layout,
        }
    }

    /// サーフェスの面設定に合うパイプライン
    pub fn pipeline_for(&self, surface: &SurfaceBuffers) -> &wgpu::RenderPipeline {
        if surface.double_sided {
            &self.double_sided_pipeline
        } else {
            &self.pipeline
        }
    }

    /// サーフェスの頂点/インデックス/マテリアルバッファを作成
    pub fn create_surface_buffers(
        &self,
        ctx: &GpuContext,
        label: &str,
        mesh: &Mesh,
        color: Color,
    ) -> SurfaceBuffers {
        let vertex_buffer = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Vertex Buffer")),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Index Buffer")),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let material = MaterialUniform::from_color(color);
        let material_buffer = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Material Buffer")),
            contents: bytemuck::bytes_of(&material),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let material_bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{label} Material Bind Group")),
            layout: &self.material_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: material_buffer.as_entire_binding(),
            }],
        });

        SurfaceBuffers {
            vertex_buffer,
            index_buffer,
            num_indices: mesh.index_count() as u32,
            double_sided: mesh.cull_mode().is_none(),
            material_buffer,
            material_bind_group,
        }
    }
}

fn create_pipeline(
    ctx: &GpuContext,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    cull_mode: Option<wgpu::Face>,
) -> wgpu::RenderPipeline {
    let label = if cull_mode.is_some() {
        "Render Pipeline"
    } else {
        "Double Sided Render Pipeline"
    };
    ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[Vertex::desc()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: ctx.config.format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode,
            polygon_mode: wgpu::PolygonMode::Fill,
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
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
        cache: None,
    })
}
