//! 建物モデル
//!
//! ロード時にシーングラフを平坦化し、ピック可能なサーフェスのリストとして保持する

mod loader;

use crate::color::Color;
use crate::components::Transform;
use crate::error::{Result, ViewerError};
use crate::math::{AABB, Vec3};

/// 個別にハイライト可能なメッシュ単位
#[derive(Debug, Clone)]
pub struct Surface {
    /// 識別子（レイアウト画像の検索キー）
    pub name: String,
    /// 現在のマテリアル色
    pub color: Color,
    /// 裏面もピック対象にするか
    pub double_sided: bool,
    /// モデル空間の頂点位置（ノード変換適用済み）
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub indices: Vec<u32>,
    /// モデル空間のバウンディングボックス
    pub bounds: AABB,
}

impl Surface {
    /// 新しいサーフェスを作成
    /// 法線が頂点数と一致しない場合は面法線から再計算する
    pub fn new(
        name: impl Into<String>,
        color: Color,
        positions: Vec<Vec3>,
        normals: Vec<Vec3>,
        indices: Vec<u32>,
    ) -> Self {
        let bounds = AABB::from_points(positions.iter().copied());
        let normals = if normals.len() == positions.len() {
            normals
        } else {
            compute_normals(&positions, &indices)
        };

        Self {
            name: name.into(),
            color,
            double_sided: false,
            positions,
            normals,
            indices,
            bounds,
        }
    }

    pub fn with_double_sided(mut self, double_sided: bool) -> Self {
        self.double_sided = double_sided;
        self
    }

    /// 三角形を頂点座標の組で列挙（範囲外インデックスの三角形は無視）
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.chunks_exact(3).filter_map(|tri| {
            Some([
                *self.positions.get(tri[0] as usize)?,
                *self.positions.get(tri[1] as usize)?,
                *self.positions.get(tri[2] as usize)?,
            ])
        })
    }
}

/// 面法線を頂点ごとに加算して正規化
fn compute_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        if a >= positions.len() || b >= positions.len() || c >= positions.len() {
            continue;
        }
        let face = (positions[b] - positions[a]).cross(positions[c] - positions[a]);
        normals[a] += face;
        normals[b] += face;
        normals[c] += face;
    }
    normals
        .into_iter()
        .map(|n| n.try_normalize().unwrap_or(Vec3::Y))
        .collect()
}

/// ロード済みモデル
/// 一度だけロードされ、以後は回転のみ変化する
#[derive(Debug, Clone)]
pub struct Model {
    surfaces: Vec<Surface>,
    bounds: AABB,
    pub transform: Transform,
}

impl Model {
    /// サーフェスのリストからモデルを作成
    pub fn new(surfaces: Vec<Surface>) -> Result<Self> {
        if surfaces.is_empty() {
            return Err(ViewerError::EmptyModel);
        }
        let bounds = surfaces
            .iter()
            .fold(AABB::empty(), |acc, s| acc.union(&s.bounds));

        Ok(Self {
            surfaces,
            bounds,
            transform: Transform::identity(),
        })
    }

    /// モデル中心を原点に移動し、対角線長を返す
    pub fn center_at_origin(&mut self) -> f32 {
        self.transform.position = -self.bounds.center();
        self.bounds.diagonal()
    }

    pub fn surfaces(&self) -> &[Surface] {
        &self.surfaces
    }

    pub fn surface(&self, index: usize) -> Option<&Surface> {
        self.surfaces.get(index)
    }

    pub fn surface_mut(&mut self, index: usize) -> Option<&mut Surface> {
        self.surfaces.get_mut(index)
    }

    pub fn surface_count(&self) -> usize {
        self.surfaces.len()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// 原点中心、一辺sizeの正方形（Z=z平面、+Z向き）
    pub(crate) fn quad(name: &str, size: f32, z: f32) -> Surface {
        let h = size * 0.5;
        Surface::new(
            name,
            Color::WHITE,
            vec![
                Vec3::new(-h, -h, z),
                Vec3::new(h, -h, z),
                Vec3::new(h, h, z),
                Vec3::new(-h, h, z),
            ],
            Vec::new(),
            vec![0, 1, 2, 0, 2, 3],
        )
    }

    #[test]
    fn test_surface_bounds_and_normals() {
        let s = quad("o_glass", 2.0, 1.0);
        assert_eq!(s.bounds.min, Vec3::new(-1.0, -1.0, 1.0));
        assert_eq!(s.bounds.max, Vec3::new(1.0, 1.0, 1.0));
        assert_eq!(s.normals.len(), 4);
        assert!(s.normals.iter().all(|n| (*n - Vec3::Z).length() < 1e-6));
        assert_eq!(s.triangles().count(), 2);
    }

    #[test]
    fn test_triangles_skip_out_of_range() {
        let mut s = quad("a", 1.0, 0.0);
        s.indices.extend_from_slice(&[0, 1, 99]);
        assert_eq!(s.triangles().count(), 2);
    }

    #[test]
    fn test_empty_model_is_error() {
        assert!(matches!(Model::new(Vec::new()), Err(ViewerError::EmptyModel)));
    }

    #[test]
    fn test_center_at_origin() {
        let mut a = quad("a", 2.0, 0.0);
        for p in &mut a.positions {
            *p += Vec3::new(10.0, 0.0, 0.0);
        }
        a.bounds = AABB::from_points(a.positions.iter().copied());
        let mut model = Model::new(vec![a, quad("b", 2.0, 2.0)]).unwrap();

        let size = model.center_at_origin();
        // bounds: x [-1, 11], y [-1, 1], z [0, 2]
        assert_eq!(model.transform.position, Vec3::new(-5.0, 0.0, -1.0));
        let expected = Vec3::new(12.0, 2.0, 2.0).length();
        assert!((size - expected).abs() < 1e-5);
    }

    #[test]
    fn test_surfaces_keep_order() {
        let model = Model::new(vec![quad("o_glass", 1.0, 0.0), quad("o_concrete_01", 1.0, 1.0)])
            .unwrap();
        assert_eq!(model.surface_count(), 2);
        assert_eq!(model.surface(1).map(|s| s.name.as_str()), Some("o_concrete_01"));
        assert!(model.surface(2).is_none());
    }
}
