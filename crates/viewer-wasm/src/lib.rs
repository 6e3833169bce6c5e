// crates/viewer-wasm/src/lib.rs

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use glam::Vec2;
use js_sys::Promise;
use wasm_bindgen::prelude::*;
use web_sys::{Element, HtmlCanvasElement};

use viewer_core::{LayoutMap, Model, ViewerConfig, ViewerError};
use viewer_renderer::{PickOutcome, PointerDelta, ViewerState};

mod app;
mod asset;
mod frame_loop;
mod overlay;
mod renderer;
mod shaders;

use app::App;
use frame_loop::RenderLoop;
use overlay::OverlayView;
use renderer::Renderer;

/// 建物モデルのパッケージ内パス
pub const DEFAULT_MODEL_URL: &str = "assets/models/building.glb";

// パニック時のスタックトレース表示とログ出力の初期化
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();
    tracing::info!("building viewer initialized");
}

fn to_js(err: ViewerError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Viewer構造体
/// 描画ループ・ジェスチャー・オーバーレイを統合し、JSから操作可能なAPIを提供
#[wasm_bindgen]
pub struct Viewer {
    app: Rc<RefCell<App>>,
    render_loop: RenderLoop,
}

#[wasm_bindgen]
impl Viewer {
    /// 新しいViewerを作成（非同期）
    /// `layout_json`: サーフェス名 → 画像パスの表（省略時は建物の既定値）
    /// `config_json`: ViewerConfigの一部または全部
    pub async fn create(
        canvas: HtmlCanvasElement,
        layout_json: Option<String>,
        config_json: Option<String>,
    ) -> Result<Viewer, JsValue> {
        tracing::info!("creating viewer");

        let config = match config_json.as_deref() {
            Some(json) => ViewerConfig::from_json(json).map_err(to_js)?,
            None => ViewerConfig::default(),
        };
        let layouts = match layout_json.as_deref() {
            Some(json) => LayoutMap::from_json(json).map_err(to_js)?,
            None => LayoutMap::building_default(),
        };

        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let parent: Element = match canvas.parent_element() {
            Some(parent) => parent,
            None => document
                .body()
                .ok_or_else(|| JsValue::from_str("no document body"))?
                .into(),
        };
        let overlay = OverlayView::new(&document, &parent)?;

        if layouts.is_empty() {
            tracing::warn!("layout map is empty, taps will only highlight surfaces");
        }

        // GPUサーフェスはデバイスピクセル、ピッキングとオーバーレイはCSSピクセル
        let css = app::canvas_css_size(&canvas);
        let renderer = Renderer::create(canvas.clone(), &config).await?;
        let state = ViewerState::new(config, layouts, css.x, css.y);

        let app = Rc::new(RefCell::new(App::new(state, canvas, renderer, overlay)));
        bind_overlay_controls(&app)?;

        let viewer = Self {
            app,
            render_loop: RenderLoop::new(),
        };
        viewer.start()?;
        tracing::info!("viewer created");
        Ok(viewer)
    }

    /// URLからモデルを読み込む
    /// Promiseは成功でtrue、失敗でfalseに解決される（失敗はログのみ）
    pub fn load_model_from_url(&self, url: Option<String>) -> Promise {
        let app = Rc::downgrade(&self.app);
        let url = url.unwrap_or_else(|| DEFAULT_MODEL_URL.to_owned());
        wasm_bindgen_futures::future_to_promise(async move {
            let loaded = asset::fetch_bytes(&url)
                .await
                .and_then(|bytes| Model::from_glb(&bytes));
            let Some(app) = app.upgrade() else {
                return Ok(JsValue::FALSE);
            };
            Ok(JsValue::from_bool(install(&app, loaded)))
        })
    }

    /// 取得済みのGLB/glTFバイト列からモデルを読み込む
    pub fn load_model_bytes(&self, bytes: &[u8]) -> bool {
        install(&self.app, Model::from_glb(bytes))
    }

    /// ドラッグ中の移動（ホストが報告した変位）
    pub fn pointer_move(&self, dx: f32, dy: f32) {
        self.app.borrow_mut().pointer_move(dx, dy);
    }

    /// 指を離した位置と変位（Canvas左上からのCSSピクセル）。
    /// タップならピッキングを行い、ヒットしたらtrue
    pub fn pointer_release(&self, x: f32, y: f32, dx: f32, dy: f32) -> bool {
        let outcome = self
            .app
            .borrow_mut()
            .pointer_release(Vec2::new(x, y), PointerDelta::new(dx, dy));
        matches!(outcome, Some(PickOutcome::Hit { .. }))
    }

    /// レイアウトを閉じてハイライトを戻す
    pub fn close_layout(&self) {
        self.app.borrow_mut().close_layout();
    }

    pub fn cast_layout(&self) {
        self.app.borrow().cast_layout();
    }

    /// 表示中のレイアウト画像
    pub fn selected_layout(&self) -> Option<String> {
        self.app
            .borrow()
            .state
            .selected_layout()
            .map(|image| image.as_str().to_owned())
    }

    /// ハイライト中のサーフェス名
    pub fn selected_surface(&self) -> Option<String> {
        self.app
            .borrow()
            .state
            .selected_surface_name()
            .map(str::to_owned)
    }

    /// 累積した縦軸回転（ラジアン）
    pub fn rotation_y(&self) -> f32 {
        self.app.borrow().state.rotation().y
    }

    /// 状態のスナップショット（JSオブジェクト）
    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        let snapshot = self.app.borrow().state.snapshot();
        serde_wasm_bindgen::to_value(&snapshot).map_err(JsValue::from)
    }

    /// オーバーレイ画像のパン（px）
    pub fn overlay_pan(&self, dx: f32, dy: f32) {
        self.app.borrow_mut().overlay_pan(dx, dy);
    }

    /// オーバーレイ画像のズーム（focusはクロップ領域中心からの相対位置）
    pub fn overlay_zoom(&self, factor: f32, focus_x: f32, focus_y: f32) {
        self.app
            .borrow_mut()
            .overlay_zoom(factor, Vec2::new(focus_x, focus_y));
    }

    /// 描画ループ開始
    pub fn start(&self) -> Result<(), JsValue> {
        let app = Rc::downgrade(&self.app);
        self.render_loop.start(move |_timestamp| {
            if let Some(app) = app.upgrade() {
                app.borrow_mut().frame();
            }
        })
    }

    /// 描画ループ停止
    pub fn stop(&self) {
        self.render_loop.stop();
    }

    pub fn is_running(&self) -> bool {
        self.render_loop.is_running()
    }

    /// Canvasリサイズ（描画バッファのデバイスピクセルサイズ）
    pub fn resize(&self, width: u32, height: u32) {
        self.app.borrow_mut().resize(width, height);
    }

    /// 幅取得
    pub fn width(&self) -> u32 {
        self.app.borrow().width()
    }

    /// 高さ取得
    pub fn height(&self) -> u32 {
        self.app.borrow().height()
    }
}

impl Drop for Viewer {
    fn drop(&mut self) {
        self.render_loop.stop();
    }
}

fn install(app: &Rc<RefCell<App>>, loaded: viewer_core::Result<Model>) -> bool {
    let mut app = app.borrow_mut();
    match loaded {
        Ok(model) => {
            app.install_model(model);
            true
        }
        Err(err) => {
            app.model_load_failed(&err);
            false
        }
    }
}

// ボタンのクロージャはAppが所有するため、Appへは弱参照で戻る
fn bind_overlay_controls(app: &Rc<RefCell<App>>) -> Result<(), JsValue> {
    let on_close = with_app(Rc::downgrade(app), App::close_layout);
    let on_cast = with_app(Rc::downgrade(app), |app: &mut App| app.cast_layout());
    app.borrow_mut().overlay_mut().bind_controls(on_close, on_cast)
}

fn with_app(app: Weak<RefCell<App>>, action: impl Fn(&mut App) + 'static) -> impl FnMut() + 'static {
    move || {
        let Some(app) = app.upgrade() else {
            return;
        };
        match app.try_borrow_mut() {
            Ok(mut app) => action(&mut app),
            Err(_) => tracing::warn!("viewer busy, control ignored"),
        };
    }
}
