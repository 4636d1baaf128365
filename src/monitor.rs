//! A physical output (Xinerama screen) and its nine views.

use crate::client::WinId;
use crate::geometry::Rect;
use crate::view::{View, NUM_VIEWS};

#[derive(Debug, Clone)]
pub struct Monitor {
    /// Full screen geometry, as reported by Xinerama/RandR.
    pub rect: Rect,
    pub show_bar: bool,
    pub top_bar: bool,
    pub bar_height: i32,
    /// The bar's own X window, once created.
    pub bar_window: Option<WinId>,
    pub views: [View; NUM_VIEWS],
    pub selected_view: usize,
    /// The view selected before the most recent `toggle_view`, for flipping
    /// back and forth between two tags.
    pub prev_view: usize,
}

impl Monitor {
    pub fn new(rect: Rect, show_bar: bool, top_bar: bool, bar_height: i32, mfact: f32) -> Monitor {
        let views = std::array::from_fn(|_| View::new(mfact));
        Monitor {
            rect,
            show_bar,
            top_bar,
            bar_height,
            bar_window: None,
            views,
            selected_view: 0,
            prev_view: 0,
        }
    }

    /// The rectangle clients are tiled into: the monitor's full rectangle
    /// minus the bar strip, when the bar is shown.
    pub fn window_area(&self) -> Rect {
        if !self.show_bar {
            return self.rect;
        }
        if self.top_bar {
            Rect::new(self.rect.x, self.rect.y + self.bar_height, self.rect.w, self.rect.h - self.bar_height)
        } else {
            Rect::new(self.rect.x, self.rect.y, self.rect.w, self.rect.h - self.bar_height)
        }
    }

    /// Rectangle the bar window itself occupies.
    pub fn bar_rect(&self) -> Rect {
        let y = if self.top_bar { self.rect.y } else { self.rect.y + self.rect.h - self.bar_height };
        Rect::new(self.rect.x, y, self.rect.w, self.bar_height)
    }

    pub fn current_view(&self) -> &View {
        &self.views[self.selected_view]
    }

    pub fn current_view_mut(&mut self) -> &mut View {
        &mut self.views[self.selected_view]
    }

    /// Switch to `tag` (0..9), remembering the previous tag so it can be
    /// toggled back to.
    pub fn select_view(&mut self, tag: usize) {
        debug_assert!(tag < NUM_VIEWS);
        if tag == self.selected_view {
            return;
        }
        self.prev_view = self.selected_view;
        self.selected_view = tag;
    }

    /// Flip back to whichever tag was selected before the current one.
    pub fn toggle_view(&mut self) {
        self.select_view(self.prev_view);
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.rect.contains(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor() -> Monitor {
        Monitor::new(Rect::new(0, 0, 1920, 1080), true, true, 14, 0.55)
    }

    #[test]
    fn window_area_reserves_top_bar() {
        let m = monitor();
        assert_eq!(m.window_area(), Rect::new(0, 14, 1920, 1066));
    }

    #[test]
    fn window_area_reserves_bottom_bar() {
        let mut m = monitor();
        m.top_bar = false;
        assert_eq!(m.window_area(), Rect::new(0, 0, 1920, 1066));
    }

    #[test]
    fn window_area_is_full_rect_without_bar() {
        let mut m = monitor();
        m.show_bar = false;
        assert_eq!(m.window_area(), Rect::new(0, 0, 1920, 1080));
    }

    #[test]
    fn toggle_view_flips_back_and_forth() {
        let mut m = monitor();
        m.select_view(3);
        assert_eq!(m.selected_view, 3);
        m.toggle_view();
        assert_eq!(m.selected_view, 0);
        m.toggle_view();
        assert_eq!(m.selected_view, 3);
    }
}
