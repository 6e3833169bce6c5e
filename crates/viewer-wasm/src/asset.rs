//! アセット取得
//!
//! パッケージ済みのモデルファイルをURLから読み込む

use js_sys::Uint8Array;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::Response;

use viewer_core::{Result, ViewerError};

/// URLの内容をバイト列として取得
pub async fn fetch_bytes(url: &str) -> Result<Vec<u8>> {
    let fail = |reason: String| ViewerError::AssetFetch {
        url: url.to_owned(),
        reason,
    };
    let describe = |value: JsValue| value.as_string().unwrap_or_else(|| format!("{value:?}"));

    let window = web_sys::window().ok_or_else(|| fail("no window".into()))?;
    let response = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(|e| fail(describe(e)))?;
    let response: Response = response
        .dyn_into()
        .map_err(|_| fail("fetch did not return a Response".into()))?;

    if !response.ok() {
        return Err(fail(format!("HTTP {}", response.status())));
    }

    let buffer = response.array_buffer().map_err(|e| fail(describe(e)))?;
    let buffer = JsFuture::from(buffer).await.map_err(|e| fail(describe(e)))?;
    let bytes = Uint8Array::new(&buffer).to_vec();

    tracing::debug!(url, bytes = bytes.len(), "asset fetched");
    Ok(bytes)
}
