use serde::{Deserialize, Serialize};

/// マテリアル色（リニアRGB）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0);
    pub const YELLOW: Color = Color::new(1.0, 1.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// 0xRRGGBB形式から作成
    pub fn from_hex(hex: u32) -> Self {
        let channel = |shift: u32| ((hex >> shift) & 0xFF) as f32 / 255.0;
        Self::new(channel(16), channel(8), channel(0))
    }

    /// 強度を掛けた値
    pub fn scaled(self, intensity: f32) -> Self {
        Self::new(self.r * intensity, self.g * intensity, self.b * intensity)
    }

    /// GPU uniform用（w = 1.0）
    pub fn to_vec4_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, 1.0]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex() {
        assert_eq!(Color::from_hex(0xffff00), Color::YELLOW);
        assert_eq!(Color::from_hex(0xffffff), Color::WHITE);
        assert_eq!(Color::from_hex(0x000000), Color::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_scaled() {
        let c = Color::WHITE.scaled(0.8);
        assert_eq!(c.to_vec4_array(), [0.8, 0.8, 0.8, 1.0]);
    }
}
