//! Rendererモジュール
//!
//! wgpuを使用したレンダリング機能を提供

mod depth;
mod gpu_context;
mod scene_pipeline;

pub use gpu_context::GpuContext;

use glam::Mat4;
use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;

use viewer_core::{Color, Model, ModelUniform, ViewerConfig};
use viewer_renderer::{Camera, LightUniform, MaterialUniform, Mesh};

use scene_pipeline::{ScenePipeline, SurfaceBuffers};

/// Renderer構造体
pub struct Renderer {
    ctx: GpuContext,
    scene: ScenePipeline,

    // モデルのサーフェスと同じ順序（空メッシュはNone）
    surfaces: Vec<Option<SurfaceBuffers>>,
    clear_color: wgpu::Color,

    // Depth buffer
    #[allow(dead_code)]
    depth_texture: wgpu::Texture,
    depth_view: wgpu::TextureView,
}

impl Renderer {
    /// 新しいRendererを作成（非同期）
    pub async fn create(canvas: HtmlCanvasElement, config: &ViewerConfig) -> Result<Renderer, JsValue> {
        let ctx = GpuContext::new(canvas).await?;

        let camera_uniform = Camera::from_config(&config.camera, 1.0).uniform();
        let light = LightUniform::from_config(&config.lighting);
        let scene = ScenePipeline::new(&ctx, bytemuck::bytes_of(&camera_uniform), &light);

        // Depth Texture 作成
        let (depth_texture, depth_view) = depth::create_texture(&ctx.device, ctx.width(), ctx.height());

        let clear = config.clear_color;
        let clear_color = wgpu::Color {
            r: f64::from(clear.r),
            g: f64::from(clear.g),
            b: f64::from(clear.b),
            a: 1.0,
        };

        tracing::info!("renderer initialized");

        Ok(Self {
            ctx,
            scene,
            surfaces: Vec::new(),
            clear_color,
            depth_texture,
            depth_view,
        })
    }

    /// モデルの全サーフェスをGPUへアップロード
    pub fn upload_model(&mut self, model: &Model) {
        self.surfaces = model
            .surfaces()
            .iter()
            .enumerate()
            .map(|(i, surface)| {
                let mesh = Mesh::from_surface(surface);
                if mesh.is_empty() {
                    return None;
                }
                let label = if surface.name.is_empty() {
                    format!("surface#{i}")
                } else {
                    surface.name.clone()
                };
                Some(self.scene.create_surface_buffers(&self.ctx, &label, &mesh, surface.color))
            })
            .collect();
        tracing::debug!(surfaces = self.surfaces.len(), "uploaded model buffers");
    }

    /// 1フレーム描画
    /// モデル未ロード時は背景のみ
    pub fn render(&self, camera: &Camera, scene: Option<(Mat4, &Model)>) -> Result<(), JsValue> {
        let output = self
            .ctx
            .surface
            .get_current_texture()
            .map_err(|e| JsValue::from_str(&format!("Failed to get surface texture: {:?}", e)))?;

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        // Camera uniform更新
        self.ctx.queue.write_buffer(
            &self.scene.camera_buffer,
            0,
            bytemuck::bytes_of(&camera.uniform()),
        );

        if let Some((matrix, model)) = scene {
            self.ctx.queue.write_buffer(
                &self.scene.model_buffer,
                0,
                bytemuck::bytes_of(&ModelUniform::from_matrix(matrix)),
            );
            // ハイライトの切り替えを反映
            for (buffers, surface) in self.surfaces.iter().zip(model.surfaces()) {
                if let Some(buffers) = buffers {
                    self.write_material(buffers, surface.color);
                }
            }
        }

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if scene.is_some() {
                render_pass.set_bind_group(0, &self.scene.frame_bind_group, &[]);
                render_pass.set_bind_group(1, &self.scene.model_bind_group, &[]);
                for buffers in self.surfaces.iter().flatten() {
                    render_pass.set_pipeline(self.scene.pipeline_for(buffers));
                    render_pass.set_bind_group(2, &buffers.material_bind_group, &[]);
                    render_pass.set_vertex_buffer(0, buffers.vertex_buffer.slice(..));
                    render_pass.set_index_buffer(buffers.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                    render_pass.draw_indexed(0..buffers.num_indices, 0, 0..1);
                }
            }
        }

        self.ctx.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    fn write_material(&self, buffers: &SurfaceBuffers, color: Color) {
        self.ctx.queue.write_buffer(
            &buffers.material_buffer,
            0,
            bytemuck::bytes_of(&MaterialUniform::from_color(color)),
        );
    }

    /// Canvas サイズ変更
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.ctx.resize(width, height);

            // Depth Texture再作成
            let (depth_texture, depth_view) = depth::create_texture(&self.ctx.device, width, height);
            self.depth_texture = depth_texture;
            self.depth_view = depth_view;

            tracing::debug!(width, height, "resized");
        }
    }

    /// 現在のサイズ取得
    pub fn width(&self) -> u32 {
        self.ctx.width()
    }

    pub fn height(&self) -> u32 {
        self.ctx.height()
    }
}
