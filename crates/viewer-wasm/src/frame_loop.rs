//! requestAnimationFrameによる描画ループ
//!
//! 毎フレーム自身を再登録し、stop()で保留中のフレームを取り消す

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

type FrameCallback = Closure<dyn FnMut(f64)>;

#[derive(Default)]
struct LoopState {
    handle: Option<i32>,
    callback: Option<FrameCallback>,
}

/// 描画ループ
#[derive(Default)]
pub struct RenderLoop {
    state: Rc<RefCell<LoopState>>,
}

impl RenderLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.state.borrow().callback.is_some()
    }

    /// ループを開始（実行中なら何もしない）
    /// `tick`には requestAnimationFrame のタイムスタンプ（ms）が渡される
    pub fn start<F>(&self, mut tick: F) -> Result<(), JsValue>
    where
        F: FnMut(f64) + 'static,
    {
        if self.is_running() {
            return Ok(());
        }

        let weak = Rc::downgrade(&self.state);
        let callback = FrameCallback::new(move |timestamp: f64| {
            tick(timestamp);

            let Some(state) = weak.upgrade() else {
                return;
            };
            // tick中にstop()された場合は再登録しない
            let next = state.borrow().callback.as_ref().map(request_frame);
            match next {
                Some(Ok(handle)) => state.borrow_mut().handle = Some(handle),
                Some(Err(err)) => {
                    tracing::error!(?err, "failed to schedule next frame");
                    state.borrow_mut().handle = None;
                }
                None => {}
            }
        });

        let handle = request_frame(&callback)?;
        let mut state = self.state.borrow_mut();
        state.handle = Some(handle);
        state.callback = Some(callback);
        tracing::debug!("render loop started");
        Ok(())
    }

    /// 保留中のフレームを取り消し、コールバックを破棄
    pub fn stop(&self) {
        let mut state = self.state.borrow_mut();
        if let Some(handle) = state.handle.take() {
            if let Some(window) = web_sys::window() {
                if let Err(err) = window.cancel_animation_frame(handle) {
                    tracing::warn!(?err, "failed to cancel animation frame");
                }
            }
        }
        if state.callback.take().is_some() {
            tracing::debug!("render loop stopped");
        }
    }
}

impl Drop for RenderLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

fn request_frame(callback: &FrameCallback) -> Result<i32, JsValue> {
    web_sys::window()
        .ok_or_else(|| JsValue::from_str("no window"))?
        .request_animation_frame(callback.as_ref().unchecked_ref())
}
