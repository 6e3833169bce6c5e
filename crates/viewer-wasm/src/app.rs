//! アプリケーション本体
//!
//! ViewerState（操作/選択の状態）、Renderer、オーバーレイDOMをまとめる。
//! Viewer・描画ループ・ボタンのクロージャから Rc<RefCell<App>> で共有される。

use glam::Vec2;
use web_sys::HtmlCanvasElement;

use viewer_core::{Model, ViewerError};
use viewer_renderer::{PickOutcome, PointerDelta, ViewerState, css_viewport};

use crate::overlay::OverlayView;
use crate::renderer::Renderer;

pub struct App {
    pub state: ViewerState,
    canvas: HtmlCanvasElement,
    renderer: Renderer,
    overlay: OverlayView,
}

/// Canvasのページ上のサイズ（CSSピクセル）
/// ポインタ座標とオーバーレイのスタイルはこの単位で扱う
pub fn canvas_css_size(canvas: &HtmlCanvasElement) -> Vec2 {
    let ratio = web_sys::window().map_or(1.0, |w| w.device_pixel_ratio()) as f32;
    css_viewport(
        Vec2::new(canvas.client_width() as f32, canvas.client_height() as f32),
        Vec2::new(canvas.width() as f32, canvas.height() as f32),
        ratio,
    )
}

impl App {
    pub fn new(
        state: ViewerState,
        canvas: HtmlCanvasElement,
        renderer: Renderer,
        overlay: OverlayView,
    ) -> Self {
        Self {
            state,
            canvas,
            renderer,
            overlay,
        }
    }

    pub fn overlay_mut(&mut self) -> &mut OverlayView {
        &mut self.overlay
    }

    /// モデルを配置してGPUへ転送
    pub fn install_model(&mut self, model: Model) {
        self.state.install_model(model);
        if let Some(model) = self.state.model() {
            self.renderer.upload_model(model);
        }
        // 差し替え時に開いていたオーバーレイを閉じる
        self.sync_overlay();
    }

    pub fn model_load_failed(&self, error: &ViewerError) {
        self.state.model_load_failed(error);
    }

    /// 1フレーム分の更新と描画
    pub fn frame(&mut self) {
        let matrix = self.state.update_frame();
        let scene = matrix.zip(self.state.model());
        if let Err(err) = self.renderer.render(self.state.camera(), scene) {
            tracing::warn!(?err, "frame skipped");
        }
    }

    pub fn pointer_move(&mut self, dx: f32, dy: f32) {
        self.state.pointer_move(PointerDelta::new(dx, dy));
    }

    pub fn pointer_release(&mut self, point: Vec2, delta: PointerDelta) -> Option<PickOutcome> {
        let outcome = self.state.pointer_release(point, delta);
        if matches!(outcome, Some(PickOutcome::Hit { .. })) {
            self.sync_overlay();
        }
        outcome
    }

    pub fn close_layout(&mut self) {
        self.state.close_overlay();
        self.sync_overlay();
    }

    pub fn cast_layout(&self) {
        self.state.cast_overlay();
    }

    pub fn overlay_pan(&mut self, dx: f32, dy: f32) {
        self.state.overlay_pan(dx, dy);
        self.sync_overlay();
    }

    pub fn overlay_zoom(&mut self, factor: f32, focus: Vec2) {
        self.state.overlay_zoom(factor, focus);
        self.sync_overlay();
    }

    /// `width`/`height`はCanvasの描画バッファサイズ（デバイスピクセル）
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.renderer.resize(width, height);
        let css = canvas_css_size(&self.canvas);
        self.state.resize(css.x, css.y);
        self.sync_overlay();
    }

    /// オーバーレイDOMを状態に合わせる
    pub fn sync_overlay(&mut self) {
        let result = self
            .overlay
            .sync(self.state.selected_layout(), self.state.overlay());
        if let Err(err) = result {
            tracing::warn!(?err, "failed to update overlay");
        }
    }

    pub fn width(&self) -> u32 {
        self.renderer.width()
    }

    pub fn height(&self) -> u32 {
        self.renderer.height()
    }
}
