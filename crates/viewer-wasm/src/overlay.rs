//! レイアウト画像のオーバーレイ表示（DOM）
//!
//! 要素とボタンのクロージャは一度だけ作成し、表示/非表示の切り替えで使い回す。
//! クリック中のクロージャを破棄しないため、unmountでは要素を削除しない。

use glam::Vec2;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement, HtmlImageElement};

use viewer_core::{LayoutImage, OverlayViewport};

type ClickHandler = Closure<dyn FnMut(web_sys::Event)>;

pub struct OverlayView {
    root: HtmlElement,
    crop: HtmlElement,
    image: HtmlImageElement,
    close_button: HtmlElement,
    cast_button: HtmlElement,
    handlers: Vec<ClickHandler>,
    current: Option<LayoutImage>,
    crop_size: Vec2,
}

fn create_html(document: &Document, tag: &str) -> Result<HtmlElement, JsValue> {
    document.create_element(tag)?.dyn_into::<HtmlElement>().map_err(JsValue::from)
}

fn set_styles(element: &HtmlElement, styles: &[(&str, &str)]) -> Result<(), JsValue> {
    let style = element.style();
    for (name, value) in styles {
        style.set_property(name, value)?;
    }
    Ok(())
}

impl OverlayView {
    /// `parent`の末尾に非表示のオーバーレイを作成
    pub fn new(document: &Document, parent: &Element) -> Result<Self, JsValue> {
        let root = create_html(document, "div")?;
        root.set_class_name("layout-overlay");
        set_styles(
            &root,
            &[
                ("position", "absolute"),
                ("left", "0"),
                ("bottom", "0"),
                ("width", "100%"),
                ("display", "none"),
                ("flex-direction", "column"),
            ],
        )?;

        let buttons = create_html(document, "div")?;
        set_styles(
            &buttons,
            &[("display", "flex"), ("justify-content", "flex-end")],
        )?;

        let close_button = create_html(document, "button")?;
        close_button.set_class_name("layout-overlay-close");
        close_button.set_text_content(Some("close"));
        set_styles(&close_button, &[("background-color", "red"), ("color", "white")])?;

        let cast_button = create_html(document, "button")?;
        cast_button.set_class_name("layout-overlay-cast");
        cast_button.set_text_content(Some("cast"));
        set_styles(&cast_button, &[("background-color", "blue"), ("color", "white")])?;

        buttons.append_child(&close_button)?;
        buttons.append_child(&cast_button)?;

        let crop = create_html(document, "div")?;
        set_styles(
            &crop,
            &[
                ("overflow", "hidden"),
                ("display", "flex"),
                ("align-items", "center"),
                ("justify-content", "center"),
                ("touch-action", "none"),
            ],
        )?;

        let image = document
            .create_element("img")?
            .dyn_into::<HtmlImageElement>()
            .map_err(JsValue::from)?;
        set_styles(
            &image,
            &[
                ("object-fit", "contain"),
                ("flex-shrink", "0"),
                ("transform-origin", "center center"),
            ],
        )?;
        crop.append_child(&image)?;

        root.append_child(&buttons)?;
        root.append_child(&crop)?;
        parent.append_child(&root)?;

        Ok(Self {
            root,
            crop,
            image,
            close_button,
            cast_button,
            handlers: Vec::new(),
            current: None,
            crop_size: Vec2::ZERO,
        })
    }

    /// close / cast ボタンにハンドラを登録
    pub fn bind_controls<C, K>(&mut self, on_close: C, on_cast: K) -> Result<(), JsValue>
    where
        C: FnMut() + 'static,
        K: FnMut() + 'static,
    {
        let close = Self::click_handler(on_close);
        self.close_button
            .add_event_listener_with_callback("click", close.as_ref().unchecked_ref())?;
        let cast = Self::click_handler(on_cast);
        self.cast_button
            .add_event_listener_with_callback("click", cast.as_ref().unchecked_ref())?;
        self.handlers.push(close);
        self.handlers.push(cast);
        Ok(())
    }

    fn click_handler(mut action: impl FnMut() + 'static) -> ClickHandler {
        ClickHandler::new(move |event: web_sys::Event| {
            event.stop_propagation();
            action();
        })
    }

    /// 状態に合わせて表示を更新
    pub fn sync(&mut self, layout: Option<&LayoutImage>, viewport: &OverlayViewport) -> Result<(), JsValue> {
        match layout {
            Some(image) => {
                // 画像の切り替えか画面サイズの変更時のみ再配置
                if self.current.as_ref() != Some(image) || self.crop_size != viewport.crop_size() {
                    self.mount(image, viewport)?;
                }
                self.apply_transform(viewport)
            }
            None => self.unmount(),
        }
    }

    fn mount(&mut self, layout: &LayoutImage, viewport: &OverlayViewport) -> Result<(), JsValue> {
        let crop = viewport.crop_size();
        let size = viewport.image_size();
        let (crop_w, crop_h) = (format!("{}px", crop.x), format!("{}px", crop.y));
        let (image_w, image_h) = (format!("{}px", size.x), format!("{}px", size.y));
        set_styles(&self.crop, &[("width", &crop_w), ("height", &crop_h)])?;
        set_styles(&self.image, &[("width", &image_w), ("height", &image_h)])?;
        self.image.set_src(layout.as_str());
        self.root.style().set_property("display", "flex")?;
        self.current = Some(layout.clone());
        self.crop_size = crop;
        tracing::debug!(layout = %layout, "overlay mounted");
        Ok(())
    }

    fn unmount(&mut self) -> Result<(), JsValue> {
        if self.current.take().is_some() {
            self.root.style().set_property("display", "none")?;
            self.image.remove_attribute("src")?;
            tracing::debug!("overlay unmounted");
        }
        Ok(())
    }

    fn apply_transform(&self, viewport: &OverlayViewport) -> Result<(), JsValue> {
        self.image
            .style()
            .set_property("transform", &viewport.css_transform())
    }
}

impl Drop for OverlayView {
    fn drop(&mut self) {
        self.root.remove();
    }
}
