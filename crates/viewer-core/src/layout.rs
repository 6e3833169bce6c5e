//! サーフェス名 → レイアウト画像の対応表

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ViewerError};

/// オーバーレイに表示する画像リソース（URLまたはパッケージ内パス）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayoutImage(String);

impl LayoutImage {
    pub fn new(source: impl Into<String>) -> Self {
        Self(source.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LayoutImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 静的な対応表（実行中は参照のみ）
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayoutMap {
    entries: HashMap<String, LayoutImage>,
}

impl LayoutMap {
    /// 同梱の建物モデル用の対応表
    pub fn building_default() -> Self {
        [
            ("o_glass", "assets/models/layout_1.png"),
            ("o_concrete_01", "assets/models/layout_2.jpeg"),
        ]
        .into_iter()
        .collect()
    }

    /// `{ "surfaceId": "imageResource" }` 形式のJSONから作成
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(ViewerError::LayoutMap)
    }

    pub fn get(&self, surface: &str) -> Option<&LayoutImage> {
        self.entries.get(surface)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>, I: Into<String>> FromIterator<(S, I)> for LayoutMap {
    fn from_iter<T: IntoIterator<Item = (S, I)>>(iter: T) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(surface, image)| (surface.into(), LayoutImage::new(image)))
                .collect(),
        }
    }
}
