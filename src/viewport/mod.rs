// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Fabflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Fabflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Diagram transform engine.
//!
//! Owns the pan/zoom/pinch state of one rendered diagram as a 2D affine
//! transform and recomputes it from pointer, wheel, and touch input. The
//! shared invariant of every zoom path: the content point under the anchor
//! (cursor, viewport center, or pinch midpoint) stays visually fixed.

pub const SCALE_MIN: f64 = 0.1;
pub const SCALE_MAX: f64 = 5.0;

const ZOOM_IN_STEP: f64 = 1.2;
const ZOOM_OUT_STEP: f64 = 0.8;
const WHEEL_WINDOW_MS: u64 = 200;
const WHEEL_SENSITIVITY: f64 = 0.002;
const FIT_MARGIN: f64 = 0.9;

/// The affine map from diagram content space to viewport space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    scale: f64,
    translate_x: f64,
    translate_y: f64,
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            scale: 1.0,
            translate_x: 0.0,
            translate_y: 0.0,
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn translate_x(&self) -> f64 {
        self.translate_x
    }

    pub fn translate_y(&self) -> f64 {
        self.translate_y
    }

    /// Maps a viewport point back to content coordinates.
    pub fn content_point(&self, viewport_point: (f64, f64)) -> (f64, f64) {
        (
            (viewport_point.0 - self.translate_x) / self.scale,
            (viewport_point.1 - self.translate_y) / self.scale,
        )
    }

    /// Maps a content point into viewport coordinates.
    pub fn viewport_point(&self, content_point: (f64, f64)) -> (f64, f64) {
        (
            content_point.0 * self.scale + self.translate_x,
            content_point.1 * self.scale + self.translate_y,
        )
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Visual treatment of one transform update: eased for zoom paths, immediate
/// for drags (transitions on drags read as lag).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Easing {
    Immediate,
    Eased,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct DragState {
    offset_x: f64,
    offset_y: f64,
    press_x: f64,
    press_y: f64,
    current_x: f64,
    current_y: f64,
}

/// Pan/zoom/pinch state machine for one rendered diagram.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    transform: Transform,
    drag: Option<DragState>,
    wheel_last_ms: Option<u64>,
    wheel_accumulator: f64,
    pinch_distance: Option<f64>,
}

impl Viewport {
    pub fn new() -> Self {
        Self {
            transform: Transform::identity(),
            drag: None,
            wheel_last_ms: None,
            wheel_accumulator: 0.0,
            pinch_distance: None,
        }
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Linear remap of the scale from `[SCALE_MIN, SCALE_MAX]` to `[0, 100]`.
    pub fn zoom_percent(&self) -> f64 {
        (self.transform.scale - SCALE_MIN) / (SCALE_MAX - SCALE_MIN) * 100.0
    }

    /// Fits content to the viewport: `min(width ratio, height ratio) * 0.9`,
    /// centered. This is the initial "identity-ish" state on first render.
    pub fn fit(&mut self, content: (f64, f64), viewport: (f64, f64)) -> Easing {
        let (content_w, content_h) = content;
        let (view_w, view_h) = viewport;
        if content_w <= 0.0 || content_h <= 0.0 {
            return Easing::Eased;
        }

        let scale = (view_w / content_w).min(view_h / content_h) * FIT_MARGIN;
        let scale = scale.clamp(SCALE_MIN, SCALE_MAX);
        self.transform = Transform {
            scale,
            translate_x: (view_w - content_w * scale) / 2.0,
            translate_y: (view_h - content_h * scale) / 2.0,
        };
        Easing::Eased
    }

    /// Button zoom: a fixed multiplicative step anchored at the viewport
    /// center.
    pub fn zoom_step(&mut self, zoom_in: bool, viewport: (f64, f64)) -> Easing {
        let factor = if zoom_in { ZOOM_IN_STEP } else { ZOOM_OUT_STEP };
        let clamped = (self.transform.scale * factor).clamp(SCALE_MIN, SCALE_MAX);
        if clamped != self.transform.scale {
            self.zoom_to(clamped, (viewport.0 / 2.0, viewport.1 / 2.0));
        }
        Easing::Eased
    }

    /// Slider zoom: sets the scale from a 0–100 level (inverse of
    /// [`Self::zoom_percent`]), anchored at the viewport center.
    pub fn set_zoom_level(&mut self, level: f64, viewport: (f64, f64)) -> Easing {
        let scale = SCALE_MIN + (level / 100.0) * (SCALE_MAX - SCALE_MIN);
        let clamped = scale.clamp(SCALE_MIN, SCALE_MAX);
        if clamped != self.transform.scale {
            self.zoom_to(clamped, (viewport.0 / 2.0, viewport.1 / 2.0));
        }
        Easing::Eased
    }

    /// Wheel zoom anchored at the cursor.
    ///
    /// Signed deltas accumulate within a 200 ms window to damp rapid scroll
    /// bursts; the accumulated delta converts to a multiplicative factor via
    /// an exponential of sensitivity 0.002. Hitting either clamp bound
    /// resets the accumulator.
    pub fn wheel(&mut self, delta: f64, cursor: (f64, f64), now_ms: u64) -> Easing {
        let window_expired = self
            .wheel_last_ms
            .map_or(true, |last| now_ms.saturating_sub(last) > WHEEL_WINDOW_MS);
        if window_expired {
            self.wheel_accumulator = 0.0;
        }
        self.wheel_last_ms = Some(now_ms);
        self.wheel_accumulator += delta;

        let factor = (-self.wheel_accumulator * WHEEL_SENSITIVITY).exp();
        let clamped = (self.transform.scale * factor).clamp(SCALE_MIN, SCALE_MAX);
        if clamped == SCALE_MIN || clamped == SCALE_MAX {
            self.wheel_accumulator = 0.0;
        }

        self.zoom_to(clamped, cursor);
        Easing::Eased
    }

    /// Primary-button press (or single-finger touch): records the pointer
    /// offset relative to the current translate.
    pub fn begin_drag(&mut self, point: (f64, f64)) {
        self.drag = Some(DragState {
            offset_x: point.0 - self.transform.translate_x,
            offset_y: point.1 - self.transform.translate_y,
            press_x: point.0,
            press_y: point.1,
            current_x: point.0,
            current_y: point.1,
        });
    }

    /// Pointer move while dragging: translate follows the pointer, scale
    /// untouched.
    pub fn drag_to(&mut self, point: (f64, f64)) -> Easing {
        if let Some(drag) = self.drag.as_mut() {
            drag.current_x = point.0;
            drag.current_y = point.1;
            self.transform.translate_x = point.0 - drag.offset_x;
            self.transform.translate_y = point.1 - drag.offset_y;
        }
        Easing::Immediate
    }

    /// Ends the drag and returns the total pointer travel since the press,
    /// so callers can tell a click from the end of a drag.
    pub fn end_drag(&mut self) -> f64 {
        match self.drag.take() {
            Some(drag) => {
                let dx = drag.current_x - drag.press_x;
                let dy = drag.current_y - drag.press_y;
                dx.hypot(dy)
            }
            None => 0.0,
        }
    }

    /// Two-finger touch start: records the inter-finger distance.
    pub fn begin_pinch(&mut self, distance: f64) {
        self.pinch_distance = Some(distance);
    }

    /// Two-finger move: scales by the ratio of current to previous distance,
    /// anchored at the finger midpoint.
    pub fn pinch(&mut self, distance: f64, midpoint: (f64, f64)) -> Easing {
        if let Some(previous) = self.pinch_distance {
            if previous > 0.0 {
                let clamped =
                    (self.transform.scale * (distance / previous)).clamp(SCALE_MIN, SCALE_MAX);
                self.zoom_to(clamped, midpoint);
            }
        }
        self.pinch_distance = Some(distance);
        Easing::Eased
    }

    pub fn end_pinch(&mut self) {
        self.pinch_distance = None;
    }

    /// Shared anchoring step: the content point under `anchor` before the
    /// zoom maps back to `anchor` after it.
    fn zoom_to(&mut self, new_scale: f64, anchor: (f64, f64)) {
        let (content_x, content_y) = self.transform.content_point(anchor);
        self.transform = Transform {
            scale: new_scale,
            translate_x: anchor.0 - content_x * new_scale,
            translate_y: anchor.1 - content_y * new_scale,
        };
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{Easing, Viewport, SCALE_MAX, SCALE_MIN};

    const VIEW: (f64, f64) = (800.0, 600.0);
    const EPSILON: f64 = 1e-9;

    fn assert_close(left: (f64, f64), right: (f64, f64)) {
        assert!(
            (left.0 - right.0).abs() < EPSILON && (left.1 - right.1).abs() < EPSILON,
            "{left:?} != {right:?}"
        );
    }

    #[test]
    fn scale_never_leaves_the_clamp_range() {
        let mut viewport = Viewport::new();
        for _ in 0..60 {
            viewport.zoom_step(true, VIEW);
        }
        assert!(viewport.transform().scale() <= SCALE_MAX);

        for _ in 0..120 {
            viewport.zoom_step(false, VIEW);
        }
        assert!(viewport.transform().scale() >= SCALE_MIN);

        let mut now = 0;
        for _ in 0..50 {
            now += 10;
            viewport.wheel(-500.0, (10.0, 10.0), now);
        }
        assert!(viewport.transform().scale() <= SCALE_MAX);

        viewport.begin_pinch(10.0);
        viewport.pinch(10_000.0, (0.0, 0.0));
        assert!(viewport.transform().scale() <= SCALE_MAX);
    }

    #[test]
    fn button_zoom_keeps_the_center_content_point_fixed() {
        let mut viewport = Viewport::new();
        viewport.fit((200.0, 100.0), VIEW);
        let center = (VIEW.0 / 2.0, VIEW.1 / 2.0);
        let before = viewport.transform().content_point(center);

        viewport.zoom_step(true, VIEW);
        assert_close(viewport.transform().content_point(center), before);

        viewport.zoom_step(false, VIEW);
        assert_close(viewport.transform().content_point(center), before);
    }

    #[rstest]
    #[case::near_origin((3.0, 7.0))]
    #[case::mid_view((123.0, 456.0))]
    #[case::far_corner((799.0, 599.0))]
    fn wheel_zoom_keeps_the_cursor_content_point_fixed(#[case] cursor: (f64, f64)) {
        let mut viewport = Viewport::new();
        viewport.fit((320.0, 240.0), VIEW);
        let before = viewport.transform().content_point(cursor);

        viewport.wheel(-120.0, cursor, 1_000);
        assert_close(viewport.transform().content_point(cursor), before);
    }

    #[test]
    fn pinch_zoom_keeps_the_midpoint_content_point_fixed() {
        let mut viewport = Viewport::new();
        viewport.fit((320.0, 240.0), VIEW);
        let midpoint = (210.0, 330.0);
        let before = viewport.transform().content_point(midpoint);

        viewport.begin_pinch(80.0);
        viewport.pinch(120.0, midpoint);
        assert_close(viewport.transform().content_point(midpoint), before);

        let ratio = viewport.transform().scale();
        viewport.pinch(60.0, midpoint);
        assert!(viewport.transform().scale() < ratio);
    }

    #[test]
    fn wheel_bursts_accumulate_within_the_window_and_reset_after_it() {
        let mut burst = Viewport::new();
        burst.wheel(-100.0, (0.0, 0.0), 0);
        burst.wheel(-100.0, (0.0, 0.0), 100);
        let burst_scale = burst.transform().scale();

        let mut spaced = Viewport::new();
        spaced.wheel(-100.0, (0.0, 0.0), 0);
        spaced.wheel(-100.0, (0.0, 0.0), 500);
        let spaced_scale = spaced.transform().scale();

        // Within the window the second event sees the accumulated delta.
        assert!(burst_scale > spaced_scale);
    }

    #[test]
    fn hitting_a_clamp_bound_resets_the_wheel_accumulator() {
        let mut viewport = Viewport::new();
        viewport.wheel(-10_000.0, (0.0, 0.0), 0);
        assert_eq!(viewport.transform().scale(), SCALE_MAX);

        // A tiny opposite delta right after must act on a fresh accumulator,
        // not fight the huge stale one.
        viewport.wheel(50.0, (0.0, 0.0), 50);
        assert!(viewport.transform().scale() < SCALE_MAX);
        assert!(viewport.transform().scale() > SCALE_MAX * 0.8);
    }

    #[test]
    fn drag_sets_translate_to_pointer_minus_recorded_offset() {
        let mut viewport = Viewport::new();
        viewport.begin_drag((100.0, 100.0));
        let easing = viewport.drag_to((130.0, 60.0));

        assert_eq!(easing, Easing::Immediate);
        assert_eq!(viewport.transform().translate_x(), 30.0);
        assert_eq!(viewport.transform().translate_y(), -40.0);
        assert_eq!(viewport.transform().scale(), 1.0);

        assert_eq!(viewport.end_drag(), 50.0);
        assert!(!viewport.is_dragging());
    }

    #[test]
    fn drag_moves_are_ignored_without_a_press() {
        let mut viewport = Viewport::new();
        viewport.drag_to((500.0, 500.0));
        assert_eq!(viewport.transform().translate_x(), 0.0);
        assert_eq!(viewport.end_drag(), 0.0);
    }

    #[test]
    fn zoom_percent_remaps_the_clamp_range_to_0_100() {
        let mut viewport = Viewport::new();
        viewport.set_zoom_level(0.0, VIEW);
        assert!((viewport.transform().scale() - SCALE_MIN).abs() < EPSILON);
        assert!(viewport.zoom_percent().abs() < EPSILON);

        viewport.set_zoom_level(100.0, VIEW);
        assert!((viewport.transform().scale() - SCALE_MAX).abs() < EPSILON);
        assert!((viewport.zoom_percent() - 100.0).abs() < EPSILON);

        viewport.set_zoom_level(50.0, VIEW);
        assert!((viewport.zoom_percent() - 50.0).abs() < EPSILON);
    }

    #[test]
    fn fit_centers_content_with_a_margin() {
        let mut viewport = Viewport::new();
        viewport.fit((100.0, 100.0), (200.0, 400.0));

        // Width is the limiting ratio: 200/100 * 0.9.
        assert!((viewport.transform().scale() - 1.8).abs() < EPSILON);
        assert!((viewport.transform().translate_x() - 10.0).abs() < EPSILON);
        assert!((viewport.transform().translate_y() - 110.0).abs() < EPSILON);
    }

    #[test]
    fn fit_with_degenerate_content_is_a_no_op() {
        let mut viewport = Viewport::new();
        viewport.fit((0.0, 0.0), VIEW);
        assert_eq!(viewport.transform().scale(), 1.0);
    }
}
