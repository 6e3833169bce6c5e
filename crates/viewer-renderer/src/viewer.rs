//! Viewer state and interaction controller.
//!
//! Owns everything the gesture, picking and render paths share: the model,
//! camera, rotation, current selection and the overlay that a selection may
//! open. All access happens on the UI thread.

use glam::{Mat4, Vec2};
use serde::Serialize;
use viewer_core::{
    Color, LayoutImage, LayoutMap, Model, OverlayViewport, ViewerConfig, ViewerError,
};

use crate::camera::{Camera, screen_to_ndc};
use crate::gesture::{GestureController, GestureOutcome, PointerDelta, RotationState};
use crate::picking::pick_surface;

/// The highlighted surface and the color it had before highlighting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectedSurface {
    pub index: usize,
    pub original_color: Color,
}

/// Result of a pick attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum PickOutcome {
    /// No model yet, or an overlay is open.
    Ignored,
    Miss,
    Hit {
        surface: usize,
        layout: Option<LayoutImage>,
    },
}

/// Serializable view of the state, handed to the host page.
#[derive(Debug, Clone, Serialize)]
pub struct ViewerSnapshot {
    pub model_loaded: bool,
    pub rotation: RotationState,
    pub selected_surface: Option<String>,
    pub selected_layout: Option<LayoutImage>,
    pub overlay: Option<OverlayViewport>,
}

pub struct ViewerState {
    config: ViewerConfig,
    layouts: LayoutMap,
    camera: Camera,
    model: Option<Model>,
    rotation: RotationState,
    gesture: GestureController,
    selection: Option<SelectedSurface>,
    selected_layout: Option<LayoutImage>,
    overlay: OverlayViewport,
    viewport: Vec2,
}

impl ViewerState {
    /// `width`/`height` are the canvas size in CSS pixels, the unit the host
    /// reports pointer positions in (not the device-pixel backing size).
    pub fn new(config: ViewerConfig, layouts: LayoutMap, width: f32, height: f32) -> Self {
        let camera = Camera::from_config(&config.camera, width / height.max(1.0));
        let gesture = GestureController::new(config.rotate_sensitivity, config.tap_threshold);
        let overlay = OverlayViewport::new(width, height, &config.overlay);

        Self {
            config,
            layouts,
            camera,
            model: None,
            rotation: RotationState::default(),
            gesture,
            selection: None,
            selected_layout: None,
            overlay,
            viewport: Vec2::new(width, height),
        }
    }

    /// Center the model on the origin and frame it with the camera.
    ///
    /// A selection refers to surfaces of the model it was made on, so any
    /// selection and open overlay are dropped when a model is replaced.
    pub fn install_model(&mut self, mut model: Model) {
        if self.model.is_some() {
            tracing::info!("replacing loaded model");
            self.selection = None;
            self.selected_layout = None;
            self.overlay.reset();
        }
        let size = model.center_at_origin();
        self.camera.frame(size, &self.config.camera);
        tracing::info!(
            surfaces = model.surface_count(),
            size,
            "model loaded"
        );
        self.model = Some(model);
    }

    /// A failed load leaves the viewer without a model; rotation and
    /// picking stay no-ops for the rest of the session.
    pub fn model_load_failed(&self, error: &ViewerError) {
        tracing::error!(%error, "error loading model");
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        if width <= 0.0 || height <= 0.0 {
            return;
        }
        self.viewport = Vec2::new(width, height);
        self.camera.set_aspect(width / height);
        self.overlay = OverlayViewport::new(width, height, &self.config.overlay);
    }

    // ========================================================================
    // Gestures
    // ========================================================================

    pub fn pointer_move(&mut self, delta: PointerDelta) {
        let overlay_open = self.overlay_open();
        self.gesture.on_move(delta, overlay_open, &mut self.rotation);
    }

    /// Finish the gesture; a tap is forwarded to picking.
    pub fn pointer_release(&mut self, point: Vec2, delta: PointerDelta) -> Option<PickOutcome> {
        match self.gesture.on_release(point, delta) {
            GestureOutcome::Tap(point) => Some(self.pick(point)),
            GestureOutcome::Rotation => None,
        }
    }

    // ========================================================================
    // Picking / highlight
    // ========================================================================

    pub fn pick(&mut self, point: Vec2) -> PickOutcome {
        if self.overlay_open() {
            return PickOutcome::Ignored;
        }
        let Some(model) = self.model.as_mut() else {
            return PickOutcome::Ignored;
        };

        let ndc = screen_to_ndc(point, self.viewport);
        let ray = self.camera.ndc_to_ray(ndc);
        let Some(hit) = pick_surface(model, &ray) else {
            tracing::debug!(x = point.x, y = point.y, "tap missed the model");
            return PickOutcome::Miss;
        };

        if let Some(previous) = self.selection.take() {
            if let Some(surface) = model.surface_mut(previous.index) {
                surface.color = previous.original_color;
            }
        }

        let Some(surface) = model.surface_mut(hit.surface) else {
            return PickOutcome::Miss;
        };
        self.selection = Some(SelectedSurface {
            index: hit.surface,
            original_color: surface.color,
        });
        surface.color = self.config.highlight_color;

        let layout = self.layouts.get(&surface.name).cloned();
        match &layout {
            Some(image) => {
                tracing::info!(surface = %surface.name, layout = %image, "opening layout");
                self.overlay.reset();
                self.selected_layout = Some(image.clone());
            }
            None => tracing::debug!(surface = %surface.name, "no layout mapped for surface"),
        }

        PickOutcome::Hit {
            surface: hit.surface,
            layout,
        }
    }

    // ========================================================================
    // Overlay
    // ========================================================================

    /// Restore the highlighted surface and hide the overlay. Safe to call
    /// when nothing is selected.
    pub fn close_overlay(&mut self) {
        if let Some(selection) = self.selection.take() {
            if let Some(surface) = self
                .model
                .as_mut()
                .and_then(|m| m.surface_mut(selection.index))
            {
                surface.color = selection.original_color;
            }
        }
        self.selected_layout = None;
        self.overlay.reset();
        tracing::debug!("layout closed");
    }

    /// Casting is not implemented; the control only logs.
    pub fn cast_overlay(&self) {
        tracing::info!(layout = ?self.selected_layout.as_ref().map(LayoutImage::as_str), "cast requested");
    }

    pub fn overlay_pan(&mut self, dx: f32, dy: f32) {
        if self.overlay_open() {
            self.overlay.pan(dx, dy);
        }
    }

    pub fn overlay_zoom(&mut self, factor: f32, focus: Vec2) {
        if self.overlay_open() {
            self.overlay.zoom_at(factor, focus);
        }
    }

    // ========================================================================
    // Frame
    // ========================================================================

    /// Apply the current rotation to the model and return the matrix to draw
    /// it with. Only the vertical-axis angle is applied.
    pub fn update_frame(&mut self) -> Option<Mat4> {
        let model = self.model.as_mut()?;
        model.transform.set_rotation_y(self.rotation.y);
        Some(model.transform.to_matrix())
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn overlay_open(&self) -> bool {
        self.selected_layout.is_some()
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn model(&self) -> Option<&Model> {
        self.model.as_ref()
    }

    pub fn rotation(&self) -> RotationState {
        self.rotation
    }

    pub fn selection(&self) -> Option<SelectedSurface> {
        self.selection
    }

    pub fn selected_layout(&self) -> Option<&LayoutImage> {
        self.selected_layout.as_ref()
    }

    pub fn selected_surface_name(&self) -> Option<&str> {
        let selection = self.selection?;
        self.model
            .as_ref()?
            .surface(selection.index)
            .map(|s| s.name.as_str())
    }

    pub fn overlay(&self) -> &OverlayViewport {
        &self.overlay
    }

    pub fn snapshot(&self) -> ViewerSnapshot {
        ViewerSnapshot {
            model_loaded: self.model.is_some(),
            rotation: self.rotation,
            selected_surface: self.selected_surface_name().map(str::to_owned),
            selected_layout: self.selected_layout.clone(),
            overlay: self.overlay_open().then(|| self.overlay.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use viewer_core::Surface;

    use crate::camera::css_viewport;

    const WIDTH: f32 = 400.0;
    const HEIGHT: f32 = 400.0;
    const CENTER: Vec2 = Vec2::new(200.0, 200.0);

    /// Upright quad in the XY plane facing +Z.
    fn quad(name: &str, min: Vec3, max: Vec3, color: Color) -> Surface {
        Surface::new(
            name,
            color,
            vec![
                Vec3::new(min.x, min.y, max.z),
                Vec3::new(max.x, min.y, max.z),
                Vec3::new(max.x, max.y, max.z),
                Vec3::new(min.x, max.y, max.z),
            ],
            Vec::new(),
            vec![0, 1, 2, 0, 2, 3],
        )
    }

    /// Glass on the left half, concrete on the right, an unmapped roof on top.
    /// The camera looks slightly below the origin, so each part is placed
    /// comfortably around the screen center.
    fn building() -> Model {
        Model::new(vec![
            quad(
                "o_glass",
                Vec3::new(-4.0, -3.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
                Color::new(0.2, 0.6, 0.9),
            ),
            quad(
                "o_concrete_01",
                Vec3::new(0.0, -3.0, 0.0),
                Vec3::new(4.0, 1.0, 0.0),
                Color::new(0.5, 0.5, 0.5),
            ),
            quad(
                "o_roof",
                Vec3::new(-4.0, 1.0, 0.0),
                Vec3::new(4.0, 3.0, 0.0),
                Color::new(0.6, 0.1, 0.1),
            ),
        ])
        .unwrap()
    }

    fn viewer_with_model() -> ViewerState {
        let mut viewer = ViewerState::new(
            ViewerConfig::default(),
            LayoutMap::building_default(),
            WIDTH,
            HEIGHT,
        );
        viewer.install_model(building());
        viewer
    }

    fn left() -> Vec2 {
        Vec2::new(120.0, 215.0)
    }

    fn right() -> Vec2 {
        Vec2::new(280.0, 215.0)
    }

    fn top() -> Vec2 {
        Vec2::new(200.0, 120.0)
    }

    fn highlight() -> Color {
        ViewerConfig::default().highlight_color
    }

    fn color_of(viewer: &ViewerState, name: &str) -> Color {
        let model = viewer.model().unwrap();
        model.surfaces().iter().find(|s| s.name == name).unwrap().color
    }

    #[test]
    fn test_install_model_frames_camera() {
        let viewer = viewer_with_model();
        let model = viewer.model().unwrap();
        // 8 x 6 x 0 → diagonal 10
        assert!((viewer.camera().position.z - 15.0).abs() < 1e-4);
        assert_eq!(viewer.camera().target, Vec3::new(0.0, -0.5, 0.0));
        // bounds: x [-4, 4], y [-3, 3] → centered already
        assert_eq!(model.transform.position, Vec3::ZERO);
    }

    #[test]
    fn test_tap_on_glass_opens_layout_one() {
        let mut viewer = viewer_with_model();
        let outcome = viewer.pick(left());

        assert_eq!(
            outcome,
            PickOutcome::Hit {
                surface: 0,
                layout: Some(LayoutImage::new("assets/models/layout_1.png")),
            }
        );
        assert_eq!(viewer.selected_surface_name(), Some("o_glass"));
        assert_eq!(color_of(&viewer, "o_glass"), highlight());
        assert!(viewer.overlay_open());
    }

    #[test]
    fn test_second_model_drops_stale_selection() {
        let mut viewer = viewer_with_model();
        viewer.pick(left());
        assert!(viewer.overlay_open());

        let wall = quad(
            "o_wall",
            Vec3::new(-2.0, -2.0, 0.0),
            Vec3::new(2.0, 2.0, 0.0),
            Color::new(0.3, 0.3, 0.3),
        );
        viewer.install_model(Model::new(vec![wall]).unwrap());

        assert!(viewer.selection().is_none());
        assert!(viewer.selected_layout().is_none());
        assert!(viewer.selected_surface_name().is_none());
        assert!(!viewer.overlay_open());

        viewer.close_overlay();
        assert_eq!(color_of(&viewer, "o_wall"), Color::new(0.3, 0.3, 0.3));
        // 新しいモデルはそのままピックできる
        assert!(matches!(viewer.pick(CENTER), PickOutcome::Hit { surface: 0, .. }));
    }

    #[test]
    fn test_tap_in_css_pixels_on_high_density_canvas() {
        // devicePixelRatio 2: 800x800 backing store, 400x400 on the page
        let viewport = css_viewport(Vec2::ZERO, Vec2::new(800.0, 800.0), 2.0);
        let mut viewer = ViewerState::new(
            ViewerConfig::default(),
            LayoutMap::building_default(),
            viewport.x,
            viewport.y,
        );
        viewer.install_model(building());

        let outcome = viewer.pointer_release(right(), PointerDelta::default());
        assert!(matches!(outcome, Some(PickOutcome::Hit { surface: 1, .. })));
        assert_eq!(viewer.selected_surface_name(), Some("o_concrete_01"));
    }

    #[test]
    fn test_tap_with_no_model_is_noop() {
        let mut viewer = ViewerState::new(
            ViewerConfig::default(),
            LayoutMap::building_default(),
            WIDTH,
            HEIGHT,
        );
        assert_eq!(viewer.pick(CENTER), PickOutcome::Ignored);
        assert!(viewer.selection().is_none());
        assert!(viewer.selected_layout().is_none());
        assert!(viewer.update_frame().is_none());
    }

    #[test]
    fn test_miss_leaves_state_unchanged() {
        let mut viewer = viewer_with_model();
        // 未マップの屋根を選択した状態から空白部分をタップ
        viewer.pick(top());
        let before = viewer.selection();

        assert_eq!(viewer.pick(Vec2::new(5.0, 5.0)), PickOutcome::Miss);
        assert_eq!(viewer.selection(), before);
        assert!(viewer.selected_layout().is_none());
        assert_eq!(color_of(&viewer, "o_roof"), highlight());
    }

    #[test]
    fn test_unmapped_surface_stays_highlighted_without_overlay() {
        let mut viewer = viewer_with_model();
        let outcome = viewer.pick(top());

        assert_eq!(
            outcome,
            PickOutcome::Hit {
                surface: 2,
                layout: None
            }
        );
        assert!(!viewer.overlay_open());
        assert_eq!(color_of(&viewer, "o_roof"), highlight());
    }

    #[test]
    fn test_new_pick_restores_previous_color() {
        let mut viewer = viewer_with_model();
        viewer.pick(top());
        let outcome = viewer.pick(right());

        assert_eq!(
            outcome,
            PickOutcome::Hit {
                surface: 1,
                layout: Some(LayoutImage::new("assets/models/layout_2.jpeg")),
            }
        );
        assert_eq!(color_of(&viewer, "o_roof"), Color::new(0.6, 0.1, 0.1));
        assert_eq!(color_of(&viewer, "o_concrete_01"), highlight());
        assert_eq!(
            viewer.selection().map(|s| s.original_color),
            Some(Color::new(0.5, 0.5, 0.5))
        );
    }

    #[test]
    fn test_repeated_pick_of_same_surface_keeps_original() {
        let mut viewer = viewer_with_model();
        viewer.pick(top());
        viewer.pick(top());
        assert_eq!(
            viewer.selection().map(|s| s.original_color),
            Some(Color::new(0.6, 0.1, 0.1))
        );
        viewer.close_overlay();
        assert_eq!(color_of(&viewer, "o_roof"), Color::new(0.6, 0.1, 0.1));
    }

    #[test]
    fn test_picking_disabled_while_overlay_open() {
        let mut viewer = viewer_with_model();
        viewer.pick(left());
        assert_eq!(viewer.pick(right()), PickOutcome::Ignored);
        assert_eq!(viewer.selected_surface_name(), Some("o_glass"));
        assert_eq!(color_of(&viewer, "o_concrete_01"), Color::new(0.5, 0.5, 0.5));
    }

    #[test]
    fn test_close_restores_and_clears() {
        let mut viewer = viewer_with_model();
        for _ in 0..3 {
            viewer.pick(left());
            assert!(viewer.overlay_open());
            viewer.close_overlay();
            assert!(viewer.selection().is_none());
            assert!(viewer.selected_layout().is_none());
            assert_eq!(color_of(&viewer, "o_glass"), Color::new(0.2, 0.6, 0.9));
        }
        // 何も選択していない状態でも安全
        viewer.close_overlay();
        viewer.close_overlay();
        assert!(viewer.selection().is_none());
    }

    #[test]
    fn test_drag_disabled_while_overlay_open() {
        let mut viewer = viewer_with_model();
        viewer.pick(left());
        viewer.pointer_move(PointerDelta::new(120.0, 0.0));
        assert_eq!(viewer.rotation().y, 0.0);

        viewer.close_overlay();
        viewer.pointer_move(PointerDelta::new(50.0, 0.0));
        assert!((viewer.rotation().y - 0.01).abs() < 1e-7);
    }

    #[test]
    fn test_drag_scenario_is_rotation_not_tap() {
        let mut viewer = viewer_with_model();
        viewer.pointer_move(PointerDelta::new(50.0, 2.0));
        let outcome = viewer.pointer_release(left(), PointerDelta::new(50.0, 2.0));

        assert!(outcome.is_none());
        assert!((viewer.rotation().y - 0.01).abs() < 1e-7);
        assert!(viewer.selection().is_none());
    }

    #[test]
    fn test_release_tap_picks() {
        let mut viewer = viewer_with_model();
        let outcome = viewer.pointer_release(left(), PointerDelta::new(1.0, 2.0));
        assert!(matches!(outcome, Some(PickOutcome::Hit { surface: 0, .. })));
    }

    #[test]
    fn test_update_frame_applies_only_vertical_rotation() {
        let mut viewer = viewer_with_model();
        viewer.pointer_move(PointerDelta::new(5000.0, 0.0));
        viewer.rotation.x = 0.7;

        let matrix = viewer.update_frame().unwrap();
        let expected = Mat4::from_rotation_y(1.0);
        assert!(matrix.abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn test_overlay_pan_only_when_open() {
        let mut viewer = viewer_with_model();
        viewer.overlay_zoom(4.0, Vec2::new(10.0, 10.0));
        assert_eq!(viewer.overlay().scale(), 1.0);

        viewer.pick(left());
        viewer.overlay_zoom(4.0, Vec2::ZERO);
        viewer.overlay_pan(0.0, 30.0);
        assert_eq!(viewer.overlay().scale(), 4.0);
        assert_eq!(viewer.overlay().offset(), Vec2::new(0.0, 30.0));

        viewer.close_overlay();
        assert_eq!(viewer.overlay().scale(), 1.0);
    }

    #[test]
    fn test_snapshot() {
        let mut viewer = viewer_with_model();
        viewer.pick(left());
        let snapshot = viewer.snapshot();
        assert!(snapshot.model_loaded);
        assert_eq!(snapshot.selected_surface.as_deref(), Some("o_glass"));
        assert!(snapshot.overlay.is_some());

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["selected_layout"], "assets/models/layout_1.png");
    }

    #[test]
    fn test_resize_updates_aspect() {
        let mut viewer = viewer_with_model();
        viewer.resize(800.0, 400.0);
        assert_eq!(viewer.camera().aspect, 2.0);
        viewer.resize(0.0, 400.0);
        assert_eq!(viewer.camera().aspect, 2.0);
    }
}
