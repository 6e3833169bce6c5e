use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3, Vec4};
use viewer_core::CameraConfig;

use crate::picking::Ray;

/// GPU用カメラUniform
/// View-Projection行列を列優先形式で格納
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    /// ライティング計算用のカメラ位置（w未使用）
    pub position: [f32; 4],
}

impl CameraUniform {
    /// Mat4からCameraUniformを作成
    pub fn from_mat4(mat: Mat4) -> Self {
        Self {
            view_proj: mat.to_cols_array_2d(),
            position: [0.0; 4],
        }
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::from_mat4(Mat4::IDENTITY)
    }
}

/// 3Dカメラ
/// 位置、注視点、上方向ベクトルを持つ透視投影カメラ
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    /// 設定値からカメラを作成（モデルのロード前は原点の手前に置く）
    pub fn from_config(config: &CameraConfig, aspect: f32) -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 5.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov: config.fov_degrees.to_radians(),
            aspect,
            near: config.near,
            far: config.far,
        }
    }

    /// モデル全体が見える位置へ移動
    /// 対角線長 × distance_factor だけZ方向に離し、原点のやや下を注視する
    pub fn frame(&mut self, model_size: f32, config: &CameraConfig) {
        self.position = Vec3::new(0.0, 0.0, model_size * config.distance_factor);
        self.target = Vec3::new(0.0, config.look_at_y, 0.0);
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    /// View-Projection行列を構築
    pub fn build_view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// GPU用のCameraUniformを取得
    pub fn uniform(&self) -> CameraUniform {
        let mut uniform = CameraUniform::from_mat4(self.build_view_projection_matrix());
        uniform.position = self.position.extend(1.0).to_array();
        uniform
    }

    /// 正規化デバイス座標（x, y ∈ [-1, 1]）を通るワールド空間のレイ
    pub fn ndc_to_ray(&self, ndc: Vec2) -> Ray {
        let inv = self.build_view_projection_matrix().inverse();
        let unproject = |z: f32| {
            let p = inv * Vec4::new(ndc.x, ndc.y, z, 1.0);
            p.truncate() / p.w
        };
        // wgpuの深度範囲は0..1
        let near = unproject(0.0);
        let far = unproject(1.0);
        Ray::new(self.position, far - near)
    }

    /// アスペクト比を設定
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }
}

/// スクリーン座標（左上原点、px）を正規化デバイス座標へ変換
/// yはスクリーンと逆向き（上が+1）
pub fn screen_to_ndc(point: Vec2, viewport: Vec2) -> Vec2 {
    Vec2::new(
        (point.x / viewport.x) * 2.0 - 1.0,
        -(point.y / viewport.y) * 2.0 + 1.0,
    )
}

/// ポインタ座標と同じCSSピクセル単位のビューポートサイズ
/// Canvasのwidth/heightはデバイスピクセルなので、レイアウト前（clientサイズが0）は
/// devicePixelRatioで割って求める
pub fn css_viewport(client: Vec2, device: Vec2, device_pixel_ratio: f32) -> Vec2 {
    if client.x > 0.0 && client.y > 0.0 {
        return client;
    }
    let ratio = if device_pixel_ratio > 0.0 { device_pixel_ratio } else { 1.0 };
    device / ratio
}
