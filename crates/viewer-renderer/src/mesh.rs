use bytemuck::{Pod, Zeroable};
use viewer_core::Surface;
use wgpu::{BufferAddress, Face, VertexAttribute, VertexBufferLayout, VertexFormat, VertexStepMode};

/// 頂点構造体
/// 位置と法線を含む（色はサーフェス単位のUniformで渡す）
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    /// 新しい頂点を作成
    pub fn new(position: [f32; 3], normal: [f32; 3]) -> Self {
        Self { position, normal }
    }

    /// 頂点バッファレイアウトを取得
    pub fn desc() -> VertexBufferLayout<'static> {
        VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as BufferAddress,
            step_mode: VertexStepMode::Vertex,
            attributes: &[
                // position
                VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: VertexFormat::Float32x3,
                },
                // normal
                VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as BufferAddress,
                    shader_location: 1,
                    format: VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// メッシュ構造体
/// 頂点とインデックスを含む
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub double_sided: bool,
}

impl Mesh {
    /// サーフェスからGPUアップロード用のメッシュを作成
    pub fn from_surface(surface: &Surface) -> Self {
        let vertices = surface
            .positions
            .iter()
            .zip(&surface.normals)
            .map(|(p, n)| Vertex::new(p.to_array(), n.to_array()))
            .collect();

        Self {
            vertices,
            indices: surface.indices.clone(),
            double_sided: surface.double_sided,
        }
    }

    /// 片面サーフェスは裏面をカリング（ピッキングで裏面を無視するのと揃える）
    pub fn cull_mode(&self) -> Option<Face> {
        if self.double_sided { None } else { Some(Face::Back) }
    }

    /// インデックス数を取得
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}
