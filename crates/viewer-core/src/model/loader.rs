//! glTF / GLB loader
//!
//! Flattens the node hierarchy of the default scene into a list of surfaces
//! whose positions are already expressed in model space.

use gltf::mesh::{Mode, Semantic};

use super::{Model, Surface};
use crate::color::Color;
use crate::error::{Result, ViewerError};
use crate::math::{Mat3, Mat4, Vec3};

impl Model {
    /// Parse a binary glTF (or glTF JSON with embedded buffers) into a model
    pub fn from_glb(bytes: &[u8]) -> Result<Self> {
        let gltf::Gltf { document, blob } = gltf::Gltf::from_slice(bytes)?;
        let buffers = gltf::import_buffers(&document, None, blob)?;

        let Some(scene) = document.default_scene().or_else(|| document.scenes().next()) else {
            return Err(ViewerError::EmptyModel);
        };

        let mut surfaces = Vec::new();
        for node in scene.nodes() {
            collect_node(&node, Mat4::IDENTITY, &buffers, &mut surfaces)?;
        }

        tracing::debug!(surfaces = surfaces.len(), "flattened glTF scene");
        Model::new(surfaces)
    }
}

fn collect_node(
    node: &gltf::Node,
    parent: Mat4,
    buffers: &[gltf::buffer::Data],
    out: &mut Vec<Surface>,
) -> Result<()> {
    let world = parent * Mat4::from_cols_array_2d(&node.transform().matrix());

    if let Some(mesh) = node.mesh() {
        let count = mesh.primitives().len();
        for (index, primitive) in mesh.primitives().enumerate() {
            let name = surface_name(node, &mesh, index, count);
            if let Some(surface) = read_primitive(&name, &primitive, world, buffers)? {
                out.push(surface);
            }
        }
    }

    for child in node.children() {
        collect_node(&child, world, buffers, out)?;
    }
    Ok(())
}

/// 単一プリミティブはノード名（なければメッシュ名）。
/// 複数プリミティブのメッシュではノード名はグループ側に付き、
/// 各プリミティブは `<mesh>`, `<mesh>_1`, `<mesh>_2` ... となる
fn surface_name(node: &gltf::Node, mesh: &gltf::Mesh, index: usize, count: usize) -> String {
    if count <= 1 {
        return node.name().or(mesh.name()).unwrap_or_default().to_owned();
    }
    let base = mesh
        .name()
        .map(str::to_owned)
        .unwrap_or_else(|| format!("mesh_{}", mesh.index()));
    if index == 0 {
        base
    } else {
        format!("{base}_{index}")
    }
}

fn read_primitive(
    name: &str,
    primitive: &gltf::Primitive,
    world: Mat4,
    buffers: &[gltf::buffer::Data],
) -> Result<Option<Surface>> {
    if primitive.mode() != Mode::Triangles {
        tracing::debug!(name, mode = ?primitive.mode(), "skipping non-triangle primitive");
        return Ok(None);
    }

    let Some(accessor) = primitive.get(&Semantic::Positions) else {
        return Ok(None);
    };
    if let Some(view) = accessor.view() {
        let index = view.buffer().index();
        if buffers.get(index).is_none() {
            return Err(ViewerError::UnsupportedBuffer(index));
        }
    }

    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| data.0.as_slice()));

    let Some(positions) = reader.read_positions() else {
        return Ok(None);
    };
    let positions: Vec<Vec3> = positions
        .map(|p| world.transform_point3(Vec3::from(p)))
        .collect();

    let normal_matrix = Mat3::from_mat4(world).inverse().transpose();
    let normals: Vec<Vec3> = reader
        .read_normals()
        .map(|iter| {
            iter.map(|n| (normal_matrix * Vec3::from(n)).normalize_or_zero())
                .collect()
        })
        .unwrap_or_default();

    let mut indices: Vec<u32> = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..positions.len() as u32).collect(),
    };
    // 鏡像変換では巻き順が反転する
    if world.determinant() < 0.0 {
        for tri in indices.chunks_exact_mut(3) {
            tri.swap(1, 2);
        }
    }

    let material = primitive.material();
    let [r, g, b, _] = material.pbr_metallic_roughness().base_color_factor();

    Ok(Some(
        Surface::new(name, Color::new(r, g, b), positions, normals, indices)
            .with_double_sided(material.double_sided()),
    ))
}
