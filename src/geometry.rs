//! Rectangles and ICCCM size-hints negotiation.
//!
//! Every monitor, view and client position is expressed as a [`Rect`]. X
//! coordinates are signed: a multi-head Xinerama layout can legitimately
//! place a monitor's origin to the left of or above the primary monitor.

/// An absolute on-screen rectangle: top-left corner plus extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Rect {
        Rect { x, y, w, h }
    }

    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    pub fn center(&self) -> (i32, i32) {
        (self.x + self.w / 2, self.y + self.h / 2)
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }
}

/// ICCCM `WM_NORMAL_HINTS` constraints for a client.
///
/// `0` means "unset" for every field except the aspect ratios, which use
/// `0.0` for the same purpose, matching the wire encoding (a client that
/// never set a hint gets zeroes out of `XGetWMNormalHints`).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SizeHints {
    pub base_w: i32,
    pub base_h: i32,
    pub inc_w: i32,
    pub inc_h: i32,
    pub min_w: i32,
    pub min_h: i32,
    pub max_w: i32,
    pub max_h: i32,
    pub min_aspect: f32,
    pub max_aspect: f32,
}

impl Default for SizeHints {
    fn default() -> Self {
        SizeHints {
            base_w: 0,
            base_h: 0,
            inc_w: 0,
            inc_h: 0,
            min_w: 0,
            min_h: 0,
            max_w: 0,
            max_h: 0,
            min_aspect: 0.0,
            max_aspect: 0.0,
        }
    }
}

impl SizeHints {
    /// A client is `fixed` (always floating) when min and max agree on both axes.
    pub fn is_fixed(&self) -> bool {
        self.max_w > 0 && self.max_h > 0 && self.max_w == self.min_w && self.max_h == self.min_h
    }
}

/// Clamp `proposed` against a client's size hints, per spec.md §4.1 /
/// ICCCM 4.1.2.3. Returns the clamped rectangle and whether it differs from
/// `current`.
///
/// `bounds` is the display rectangle when `interactive` and the owning
/// monitor's screen rectangle otherwise (the caller picks which to pass, per
/// spec.md §4.1 step 2).
#[allow(clippy::too_many_arguments)]
pub fn apply_size_hints(
    current: Rect,
    mut proposed: Rect,
    bw: i32,
    hints: &SizeHints,
    floating: bool,
    respect_resize_hints: bool,
    interactive: bool,
    bounds: Rect,
    bar_height: i32,
) -> (Rect, bool) {
    proposed.w = proposed.w.max(1);
    proposed.h = proposed.h.max(1);

    if interactive {
        if proposed.x > bounds.right() {
            proposed.x = bounds.right() - proposed.w;
        }
        if proposed.y > bounds.bottom() {
            proposed.y = bounds.bottom() - proposed.h;
        }
        if proposed.x + proposed.w + 2 * bw < bounds.x {
            proposed.x = bounds.x;
        }
        if proposed.y + proposed.h + 2 * bw < bounds.y {
            proposed.y = bounds.y;
        }
    } else {
        if proposed.x >= bounds.right() {
            proposed.x = bounds.right() - proposed.w;
        }
        if proposed.y >= bounds.bottom() {
            proposed.y = bounds.bottom() - proposed.h;
        }
        if proposed.x + proposed.w + 2 * bw <= bounds.x {
            proposed.x = bounds.x;
        }
        if proposed.y + proposed.h + 2 * bw <= bounds.y {
            proposed.y = bounds.y;
        }
    }

    proposed.w = proposed.w.max(bar_height);
    proposed.h = proposed.h.max(bar_height);

    if floating || respect_resize_hints {
        let base_is_min = hints.base_w == hints.min_w && hints.base_h == hints.min_h;
        let mut w = proposed.w;
        let mut h = proposed.h;

        if !base_is_min {
            w -= hints.base_w;
            h -= hints.base_h;
        }

        if hints.min_aspect > 0.0 && hints.max_aspect > 0.0 {
            if hints.max_aspect < w as f32 / h as f32 {
                w = (h as f32 * hints.max_aspect + 0.5) as i32;
            } else if hints.min_aspect < h as f32 / w as f32 {
                h = (w as f32 * hints.min_aspect + 0.5) as i32;
            }
        }

        if base_is_min {
            w -= hints.base_w;
            h -= hints.base_h;
        }

        if hints.inc_w != 0 {
            w -= w % hints.inc_w;
        }
        if hints.inc_h != 0 {
            h -= h % hints.inc_h;
        }

        proposed.w = (w + hints.base_w).max(hints.min_w);
        proposed.h = (h + hints.base_h).max(hints.min_h);
        if hints.max_w > 0 {
            proposed.w = proposed.w.min(hints.max_w);
        }
        if hints.max_h > 0 {
            proposed.h = proposed.h.min(hints.max_h);
        }
    }

    let changed = proposed != current;
    (proposed, changed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor() -> Rect {
        Rect::new(0, 14, 1920, 1066)
    }

    #[test]
    fn minimum_size_is_enforced() {
        let (r, changed) = apply_size_hints(
            Rect::new(0, 0, 100, 100),
            Rect::new(0, 0, 0, 0),
            1,
            &SizeHints::default(),
            false,
            false,
            false,
            monitor(),
            14,
        );
        assert_eq!(r.w, 14);
        assert_eq!(r.h, 14);
        assert!(changed);
    }

    #[test]
    fn floating_client_snaps_to_increment() {
        let hints = SizeHints {
            base_w: 10,
            base_h: 10,
            inc_w: 10,
            inc_h: 10,
            min_w: 20,
            min_h: 20,
            ..Default::default()
        };
        let (r, _) = apply_size_hints(
            Rect::new(0, 0, 100, 100),
            Rect::new(0, 0, 57, 63),
            0,
            &hints,
            true,
            false,
            false,
            monitor(),
            14,
        );
        // base-subtracted (47, 53) snapped down to multiples of 10 -> (40, 50), then
        // base re-added -> (50, 60).
        assert_eq!((r.w, r.h), (50, 60));
    }

    #[test]
    fn non_floating_tiled_ignores_hints_without_resize_hints_flag() {
        let hints = SizeHints {
            inc_w: 10,
            inc_h: 10,
            ..Default::default()
        };
        let (r, _) = apply_size_hints(
            Rect::new(0, 0, 100, 100),
            Rect::new(0, 0, 57, 63),
            0,
            &hints,
            false,
            false,
            false,
            monitor(),
            14,
        );
        assert_eq!((r.w, r.h), (57, 63));
    }

    #[test]
    fn offscreen_rescue_against_monitor_when_not_interactive() {
        let (r, _) = apply_size_hints(
            Rect::new(0, 0, 100, 100),
            Rect::new(5000, 5000, 100, 100),
            1,
            &SizeHints::default(),
            false,
            false,
            false,
            monitor(),
            14,
        );
        assert_eq!(r.x, monitor().right() - 100);
        assert_eq!(r.y, monitor().bottom() - 100);
    }

    #[test]
    fn aspect_ratio_clamped_to_max() {
        let hints = SizeHints {
            min_aspect: 0.5,
            max_aspect: 0.5,
            ..Default::default()
        };
        let (r, _) = apply_size_hints(
            Rect::new(0, 0, 100, 100),
            Rect::new(0, 0, 200, 200),
            0,
            &hints,
            true,
            false,
            false,
            monitor(),
            14,
        );
        // mina == maxa == 0.5 means h/w must equal 0.5: w=200,h=100.
        assert_eq!((r.w, r.h), (200, 100));
    }

    use simple_test_case::test_case;

    #[test_case(100, 100, 100, 100, true; "min equals max on both axes")]
    #[test_case(100, 200, 100, 100, false; "width free")]
    #[test_case(0, 0, 0, 0, false; "unset hints")]
    #[test_case(100, 100, 50, 50, false; "max below min never happens but isn't fixed")]
    #[test]
    fn is_fixed_agrees_with_min_max(min_w: i32, max_w: i32, min_h: i32, max_h: i32, expect: bool) {
        let hints = SizeHints { min_w, max_w, min_h, max_h, ..Default::default() };
        assert_eq!(hints.is_fixed(), expect);
    }

    #[test_case(Rect::new(0, 0, 10, 10), 5, 5, true; "center inside")]
    #[test_case(Rect::new(0, 0, 10, 10), 0, 0, true; "top left corner")]
    #[test_case(Rect::new(0, 0, 10, 10), 10, 10, false; "bottom right corner is exclusive")]
    #[test_case(Rect::new(0, 0, 10, 10), -1, 5, false; "left of rect")]
    #[test]
    fn rect_contains_matches_half_open_bounds(r: Rect, x: i32, y: i32, expect: bool) {
        assert_eq!(r.contains(x, y), expect);
    }
}
