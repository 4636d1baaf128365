//! What a monitor's bar *should* show (spec §4.11). Pixels are somebody
//! else's problem: this module only tracks content and a dirty flag, handed
//! to a `BarRenderer` collaborator.

use crate::monitor::Monitor;
use crate::view::NUM_VIEWS;

/// Per-tag indicator state for the bar's tag labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagState {
    /// The tag has at least one client.
    pub occupied: bool,
    /// The tag is the monitor's selected tag and its selected client is
    /// focused.
    pub filled: bool,
    /// The tag has at least one urgent client (rendered inverted).
    pub urgent: bool,
}

/// A leading indicator for the selected client's title: whether it's fixed
/// (always floating), floating, or tiled (spec §4.11).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleIndicator {
    Tiled,
    Floating,
    Fixed,
}

/// Everything a draw collaborator needs to repaint one monitor's bar.
#[derive(Debug, Clone)]
pub struct BarState {
    pub tags: [TagState; NUM_VIEWS],
    pub tag_labels: [String; NUM_VIEWS],
    pub layout_symbol: String,
    /// Only populated on the selected monitor (spec §4.11).
    pub status_text: Option<String>,
    pub selected_title: Option<String>,
    pub title_indicator: TitleIndicator,
}

impl BarState {
    #[allow(clippy::too_many_arguments)]
    pub fn for_monitor(
        monitor: &Monitor,
        tag_labels: &[String; NUM_VIEWS],
        layout_symbol: String,
        is_selected_monitor: bool,
        status_text: &str,
        selected_client_urgent_per_tag: impl Fn(usize) -> bool,
        any_client_per_tag: impl Fn(usize) -> bool,
        focused_client_is_on_selected_tag: bool,
        selected_title: Option<(String, TitleIndicator)>,
    ) -> BarState {
        let mut tags = [TagState { occupied: false, filled: false, urgent: false }; NUM_VIEWS];
        for (i, tag) in tags.iter_mut().enumerate() {
            tag.occupied = any_client_per_tag(i);
            tag.urgent = selected_client_urgent_per_tag(i);
            tag.filled = i == monitor.selected_view && focused_client_is_on_selected_tag;
        }

        let (title, indicator) = match selected_title {
            Some((t, i)) => (Some(t), i),
            None => (None, TitleIndicator::Tiled),
        };

        BarState {
            tags,
            tag_labels: tag_labels.clone(),
            layout_symbol,
            status_text: is_selected_monitor.then(|| status_text.to_string()),
            selected_title: title,
            title_indicator: indicator,
        }
    }
}

/// Tracks, per monitor, whether its bar needs repainting. The dispatcher
/// only flips this; `Expose` (count == 0) and an explicit redraw request are
/// what actually trigger a repaint.
#[derive(Debug, Default)]
pub struct BarDirty {
    dirty: Vec<bool>,
}

impl BarDirty {
    pub fn new(monitor_count: usize) -> BarDirty {
        BarDirty { dirty: vec![true; monitor_count] }
    }

    pub fn mark(&mut self, monitor: usize) {
        if let Some(flag) = self.dirty.get_mut(monitor) {
            *flag = true;
        }
    }

    pub fn mark_all(&mut self) {
        self.dirty.iter_mut().for_each(|f| *f = true);
    }

    pub fn take(&mut self, monitor: usize) -> bool {
        self.dirty.get_mut(monitor).map(|f| std::mem::replace(f, false)).unwrap_or(false)
    }

    pub fn resize(&mut self, monitor_count: usize) {
        self.dirty.resize(monitor_count, true);
    }
}

/// Pixel backend for bar content, kept outside this crate's core per spec
/// §1 ("drawing primitives ... are external collaborators").
pub trait BarRenderer {
    fn redraw(&self, monitor: &Monitor, state: &BarState);
}

/// Classification of a `ButtonPress` landing on a bar window into the region
/// it hit, used by the event dispatcher's click-region classification
/// (spec §4.8). `tag_count` and `layout_symbol_width`/label widths are
/// supplied by the draw collaborator since only it knows glyph metrics.
pub fn classify_bar_click(
    x: i32,
    tag_label_widths: &[i32; NUM_VIEWS],
    layout_symbol_width: i32,
    status_text_width: i32,
    bar_width: i32,
) -> (crate::bindings::ClickArea, Option<usize>) {
    let mut cursor = 0;
    for (i, w) in tag_label_widths.iter().enumerate() {
        if x < cursor + w {
            return (crate::bindings::ClickArea::TagLabel, Some(i));
        }
        cursor += w;
    }
    if x < cursor + layout_symbol_width {
        return (crate::bindings::ClickArea::LayoutSymbol, None);
    }
    if x >= bar_width - status_text_width {
        return (crate::bindings::ClickArea::StatusText, None);
    }
    (crate::bindings::ClickArea::WindowTitle, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::ClickArea;

    #[test]
    fn classify_click_on_tag_label() {
        let widths = [20; NUM_VIEWS];
        let (area, tag) = classify_bar_click(5, &widths, 30, 100, 1000);
        assert_eq!(area, ClickArea::TagLabel);
        assert_eq!(tag, Some(0));
    }

    #[test]
    fn classify_click_on_layout_symbol() {
        let widths = [20; NUM_VIEWS];
        let after_tags = 20 * NUM_VIEWS as i32;
        let (area, _) = classify_bar_click(after_tags + 5, &widths, 30, 100, 1000);
        assert_eq!(area, ClickArea::LayoutSymbol);
    }

    #[test]
    fn classify_click_on_status_text() {
        let widths = [20; NUM_VIEWS];
        let (area, _) = classify_bar_click(995, &widths, 30, 100, 1000);
        assert_eq!(area, ClickArea::StatusText);
    }

    #[test]
    fn bar_dirty_tracks_per_monitor() {
        let mut dirty = BarDirty::new(2);
        assert!(dirty.take(0));
        assert!(!dirty.take(0));
        dirty.mark(1);
        assert!(dirty.take(1));
    }
}
