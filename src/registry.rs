//! Client and monitor lookup by X window handle or pointer position.
//!
//! The arena redesign (client records keyed by `WinId` in a `HashMap`,
//! SPEC_FULL.md §3) turns what spec §4.2 describes as a linear scan into a
//! direct hash lookup; `window_to_monitor` and `pointer_to_monitor` keep the
//! fallback chain spec §4.2 describes since they still have to reason about
//! bar windows and pointer position, not just client membership.

use crate::client::{Client, WinId};
use crate::wm::WindowManager;

pub fn window_to_client(wm: &WindowManager, w: WinId) -> Option<&Client> {
    wm.clients.get(&w)
}

pub fn window_to_client_mut(wm: &mut WindowManager, w: WinId) -> Option<&mut Client> {
    wm.clients.get_mut(&w)
}

/// Resolve a window handle to the monitor it logically belongs to: the root
/// window maps to whichever monitor is under the pointer, a bar window maps
/// to the monitor that owns it, and anything else is resolved through the
/// client registry.
pub fn window_to_monitor(wm: &WindowManager, w: WinId, pointer: (i32, i32)) -> Option<usize> {
    if w == wm.root {
        return Some(pointer_to_monitor(wm, pointer.0, pointer.1));
    }
    if let Some(idx) = wm.monitors.iter().position(|m| m.bar_window == Some(w)) {
        return Some(idx);
    }
    wm.clients.get(&w).map(|c| c.monitor)
}

/// The first monitor whose window rectangle contains `(x, y)`, falling back
/// to the selected monitor when the point is over no monitor (e.g. between
/// heads, or a stale coordinate during reconciliation).
pub fn pointer_to_monitor(wm: &WindowManager, x: i32, y: i32) -> usize {
    wm.monitors
        .iter()
        .position(|m| m.window_area().contains(x, y))
        .unwrap_or(wm.selected_monitor)
}
