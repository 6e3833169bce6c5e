//! ビューア設定
//!
//! 全フィールドにデフォルト値があり、JSONで部分的に上書きできる

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::{Result, ViewerError};
use crate::math::Vec3;

/// ビューア全体の設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// ドラッグ1pxあたりの回転量（ラジアン）
    pub rotate_sensitivity: f32,
    /// この値未満の移動量で離したらタップとみなす（px）
    pub tap_threshold: f32,
    /// 選択中サーフェスの色
    pub highlight_color: Color,
    pub camera: CameraConfig,
    pub lighting: LightingConfig,
    pub overlay: OverlayConfig,
    /// 背景色
    pub clear_color: Color,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            rotate_sensitivity: 0.0002,
            tap_threshold: 5.0,
            highlight_color: Color::from_hex(0xffff00),
            camera: CameraConfig::default(),
            lighting: LightingConfig::default(),
            overlay: OverlayConfig::default(),
            clear_color: Color::new(0.0, 0.0, 0.0),
        }
    }
}

impl ViewerConfig {
    /// JSON文字列から読み込む（省略フィールドはデフォルト値）
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(ViewerError::Config)
    }
}

/// カメラの初期設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// 垂直画角（度）
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// モデル対角線長に対するカメラ距離の倍率
    pub distance_factor: f32,
    /// 注視点のY座標（原点よりわずかに下）
    pub look_at_y: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 45.0,
            near: 0.1,
            far: 1000.0,
            distance_factor: 1.5,
            look_at_y: -0.5,
        }
    }
}

/// 環境光 + 平行光源
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    pub ambient_color: Color,
    pub ambient_intensity: f32,
    pub directional_color: Color,
    pub directional_intensity: f32,
    /// 光源の位置（原点に向かって照らす）
    pub directional_position: Vec3,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            ambient_color: Color::WHITE,
            ambient_intensity: 1.2,
            directional_color: Color::WHITE,
            directional_intensity: 0.8,
            directional_position: Vec3::new(1.0, 3.0, 2.0),
        }
    }
}

/// オーバーレイ画像ビューの寸法とズーム範囲
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// 表示領域の高さ（画面高さに対する比率）
    pub crop_height_fraction: f32,
    /// 画像の幅（画面幅に対する比率）
    pub image_width_fraction: f32,
    /// 画像の高さ（画面高さに対する比率）
    pub image_height_fraction: f32,
    pub min_scale: f32,
    pub max_scale: f32,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            crop_height_fraction: 0.5,
            image_width_fraction: 0.45,
            image_height_fraction: 0.9,
            min_scale: 0.6,
            max_scale: 10.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ViewerConfig::default();
        assert_eq!(config.rotate_sensitivity, 0.0002);
        assert_eq!(config.tap_threshold, 5.0);
        assert_eq!(config.highlight_color, Color::YELLOW);
        assert_eq!(config.camera.distance_factor, 1.5);
        assert_eq!(config.lighting.directional_position, Vec3::new(1.0, 3.0, 2.0));
    }

    #[test]
    fn test_partial_json() {
        let config = ViewerConfig::from_json(
            r#"{ "tap_threshold": 8.0, "camera": { "fov_degrees": 60.0 } }"#,
        )
        .unwrap();
        assert_eq!(config.tap_threshold, 8.0);
        assert_eq!(config.camera.fov_degrees, 60.0);
        // 省略したフィールドはデフォルトのまま
        assert_eq!(config.camera.near, 0.1);
        assert_eq!(config.rotate_sensitivity, 0.0002);
    }

    #[test]
    fn test_empty_json() {
        let config = ViewerConfig::from_json("{}").unwrap();
        assert_eq!(config, ViewerConfig::default());
    }

    #[test]
    fn test_invalid_json() {
        let err = ViewerConfig::from_json("{ tap_threshold: }").unwrap_err();
        assert!(matches!(err, ViewerError::Config(_)));
    }
}
