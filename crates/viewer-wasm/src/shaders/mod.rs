//! シェーダーモジュール
//!
//! WGSLシェーダーを外部ファイルから読み込む

/// メインシェーダー（建物モデル描画用）
pub const MAIN_SHADER: &str = include_str!("main.wgsl");
