//! ライト・マテリアルのGPU Uniform

use bytemuck::{Pod, Zeroable};
use viewer_core::{Color, LightingConfig};

/// 環境光 + 平行光源1灯
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct LightUniform {
    /// 強度を掛けた環境光（w未使用）
    pub ambient: [f32; 4],
    /// 強度を掛けた平行光源の色（w未使用）
    pub directional: [f32; 4],
    /// 光源へ向かう正規化ベクトル（w未使用）
    pub direction: [f32; 4],
}

impl LightUniform {
    pub fn from_config(config: &LightingConfig) -> Self {
        let direction = config.directional_position.normalize_or_zero();
        Self {
            ambient: config
                .ambient_color
                .scaled(config.ambient_intensity)
                .to_vec4_array(),
            directional: config
                .directional_color
                .scaled(config.directional_intensity)
                .to_vec4_array(),
            direction: direction.extend(0.0).to_array(),
        }
    }
}

/// サーフェスごとのベースカラー
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct MaterialUniform {
    pub color: [f32; 4],
}

impl MaterialUniform {
    pub fn from_color(color: Color) -> Self {
        Self {
            color: color.to_vec4_array(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_light_uniform_from_default() {
        let light = LightUniform::from_config(&LightingConfig::default());
        assert_eq!(light.ambient, [1.2, 1.2, 1.2, 1.0]);
        assert_eq!(light.directional[..3], [0.8, 0.8, 0.8]);
        let len: f32 = light.direction[..3].iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((len - 1.0).abs() < 1e-5);
        assert_eq!(light.direction[3], 0.0);
    }

    #[test]
    fn test_uniform_sizes() {
        assert_eq!(std::mem::size_of::<LightUniform>(), 48);
        assert_eq!(std::mem::size_of::<MaterialUniform>(), 16);
    }
}
