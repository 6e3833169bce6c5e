//! オーバーレイ画像のパン/ズーム状態
//!
//! 画像は表示領域（crop）の中央に置かれ、offsetは中央からの移動量（px）

use serde::Serialize;

use crate::config::OverlayConfig;
use crate::math::Vec2;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayViewport {
    /// 表示領域のサイズ
    crop: Vec2,
    /// 等倍時の画像サイズ
    image: Vec2,
    scale: f32,
    offset: Vec2,
    min_scale: f32,
    max_scale: f32,
}

impl OverlayViewport {
    /// 画面サイズから表示領域と画像サイズを決める
    pub fn new(screen_width: f32, screen_height: f32, config: &OverlayConfig) -> Self {
        Self {
            crop: Vec2::new(screen_width, screen_height * config.crop_height_fraction),
            image: Vec2::new(
                screen_width * config.image_width_fraction,
                screen_height * config.image_height_fraction,
            ),
            scale: 1.0,
            offset: Vec2::ZERO,
            min_scale: config.min_scale,
            max_scale: config.max_scale,
        }
    }

    pub fn crop_size(&self) -> Vec2 {
        self.crop
    }

    pub fn image_size(&self) -> Vec2 {
        self.image
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    /// 等倍・中央に戻す
    pub fn reset(&mut self) {
        self.scale = 1.0;
        self.offset = Vec2::ZERO;
    }

    /// ドラッグ量だけ移動（画像が表示領域からはみ出す範囲に制限）
    pub fn pan(&mut self, dx: f32, dy: f32) {
        self.offset += Vec2::new(dx, dy);
        self.clamp_offset();
    }

    /// 表示領域中央からの相対位置`focus`を固定点として拡大縮小
    pub fn zoom_at(&mut self, factor: f32, focus: Vec2) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let new_scale = (self.scale * factor).clamp(self.min_scale, self.max_scale);
        let ratio = new_scale / self.scale;
        self.offset = focus - (focus - self.offset) * ratio;
        self.scale = new_scale;
        self.clamp_offset();
    }

    fn clamp_offset(&mut self) {
        let limit = ((self.image * self.scale - self.crop) * 0.5).max(Vec2::ZERO);
        self.offset = self.offset.clamp(-limit, limit);
    }

    /// 画像要素に適用するCSS transform
    pub fn css_transform(&self) -> String {
        format!(
            "translate({:.1}px, {:.1}px) scale({:.3})",
            self.offset.x, self.offset.y, self.scale
        )
    }
}
