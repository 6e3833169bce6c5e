//! ジェスチャー判定
//!
//! 1回のタッチ操作をドラッグ（回転）とタップ（ピック）に振り分ける状態機械

use glam::Vec2;
use serde::Serialize;

/// ホストから渡されるポインタ移動量（px）
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerDelta {
    pub dx: f32,
    pub dy: f32,
}

impl PointerDelta {
    pub fn new(dx: f32, dy: f32) -> Self {
        Self { dx, dy }
    }
}

/// モデルの回転角（ラジアン）
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RotationState {
    /// 垂直軸まわり（描画に反映される）
    pub y: f32,
    /// 水平軸まわり（保持のみで描画には反映しない）
    pub x: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GesturePhase {
    #[default]
    Idle,
    Dragging,
}

/// 指を離した時の判定結果
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureOutcome {
    /// ほとんど動いていない：この位置でピックする
    Tap(Vec2),
    /// 回転操作として消費済み
    Rotation,
}

#[derive(Debug, Clone)]
pub struct GestureController {
    phase: GesturePhase,
    sensitivity: f32,
    tap_threshold: f32,
}

impl GestureController {
    pub fn new(sensitivity: f32, tap_threshold: f32) -> Self {
        Self {
            phase: GesturePhase::Idle,
            sensitivity,
            tap_threshold,
        }
    }

    pub fn phase(&self) -> GesturePhase {
        self.phase
    }

    /// 移動イベント
    /// オーバーレイ表示中は回転しない
    pub fn on_move(&mut self, delta: PointerDelta, overlay_open: bool, rotation: &mut RotationState) {
        self.phase = GesturePhase::Dragging;
        if !overlay_open {
            rotation.y += delta.dx * self.sensitivity;
        }
    }

    /// 離したイベント
    /// 判定はこのイベントの移動量のみで行う（経路全体は見ない）
    pub fn on_release(&mut self, point: Vec2, delta: PointerDelta) -> GestureOutcome {
        self.phase = GesturePhase::Idle;
        if delta.dx.abs() < self.tap_threshold && delta.dy.abs() < self.tap_threshold {
            GestureOutcome::Tap(point)
        } else {
            GestureOutcome::Rotation
        }
    }
}

impl Default for GestureController {
    fn default() -> Self {
        Self::new(0.0002, 5.0)
    }
}
