//! The window manager engine: owns every client and monitor, and turns X
//! events and bound actions into calls against an `XConn`.
//!
//! Grounded on `core/manager/mod.rs`'s `WindowManager` — a concrete state
//! struct driven by a trait-object connection, rather than a process split
//! across threads. Ordering that the original kept as intrusive linked
//! lists lives here as plain `Vec<WinId>`s inside each `View` instead
//! (Design Note 1).

use std::collections::HashMap;

use tracing::{info, warn};

use crate::bar::{BarDirty, BarState, TitleIndicator};
use crate::bindings::Action;
use crate::client::{Client, WinId};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::geometry::{apply_size_hints, Rect};
use crate::keys::{clean_mask, lock_combinations};
use crate::layout::{self, monocle_symbol};
use crate::monitor::Monitor;
use crate::registry;
use crate::view::{Layout, NUM_VIEWS};
use crate::xconn::{
    Atom, ConfigureRequestMask, CursorKind, EnterDetail, EnterMode, ErrorHandlerGuard, ServerGrab,
    StackMode, WmState, XConn, XEvent,
};

/// The running engine. Fields are `pub(crate)` so `registry.rs`'s free
/// functions can resolve windows to clients/monitors without a pile of
/// single-purpose accessors.
pub struct WindowManager {
    pub(crate) conn: Box<dyn XConn>,
    pub(crate) config: Config,
    pub(crate) clients: HashMap<WinId, Client>,
    pub(crate) monitors: Vec<Monitor>,
    pub(crate) selected_monitor: usize,
    pub(crate) root: WinId,
    status_text: String,
    running: bool,
    numlock_mask: u16,
    bar_dirty: BarDirty,
}

fn dedup_rects(rects: Vec<Rect>) -> Vec<Rect> {
    let mut out: Vec<Rect> = Vec::new();
    for r in rects {
        if !out.contains(&r) {
            out.push(r);
        }
    }
    out
}

fn tag_index_from_mask(mask: u16) -> Option<usize> {
    if mask == 0 {
        None
    } else {
        Some(mask.trailing_zeros() as usize)
    }
}

impl WindowManager {
    /// Builds one monitor per distinct screen rectangle the connection
    /// reports and scans for windows that already exist (spec §3 Lifecycle).
    pub fn new(conn: Box<dyn XConn>, config: Config) -> Result<WindowManager> {
        let root = conn.root();
        let screens = dedup_rects(conn.screens()?);
        if screens.is_empty() {
            return Err(Error::Fatal("no screens reported by the X connection".to_string()));
        }

        let default_layout = config.layouts.first().copied().unwrap_or(Layout::Tile);
        let monitors: Vec<Monitor> = screens
            .into_iter()
            .map(|rect| {
                let mut monitor = Monitor::new(rect, config.show_bar, config.top_bar, config.bar_height, config.mfact);
                for view in monitor.views.iter_mut() {
                    view.layout = default_layout;
                }
                monitor
            })
            .collect();
        let bar_dirty = BarDirty::new(monitors.len());

        conn.select_root_events()?;
        conn.advertise_net_supported();

        let mut wm = WindowManager {
            conn,
            config,
            clients: HashMap::new(),
            monitors,
            selected_monitor: 0,
            root,
            status_text: String::new(),
            running: true,
            // Which modifier bit NumLock landed on is a property of the
            // running keyboard mapping that `XConn` has no query for; without
            // it every lock-combination regrab collapses to the same mask
            // twice, which is exactly the redundant-grab case the `BadAccess`
            // entry in spec §7's benign-error whitelist exists to swallow.
            numlock_mask: 0,
            bar_dirty,
        };

        wm.regrab_all_keys();

        let existing = wm.conn.top_level_windows()?;
        for w in existing {
            let attrs = wm.conn.get_window_attrs(w)?;
            if !attrs.override_redirect {
                wm.manage(w)?;
            }
        }

        Ok(wm)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Pump one event off the connection and dispatch it. The caller is
    /// expected to loop this until `is_running()` goes false.
    pub fn step(&mut self) -> Result<()> {
        let event = self.conn.next_event()?;
        self.dispatch(event)?;
        self.redraw_dirty_bars();
        Ok(())
    }

    fn redraw_dirty_bars(&mut self) {
        for i in 0..self.monitors.len() {
            if self.bar_dirty.take(i) {
                let _state = self.bar_state(i);
                // Actual pixel drawing is a `BarRenderer` collaborator's job
                // (spec §1); the engine only ever computes what should be on
                // screen and marks it consumed.
            }
        }
    }

    /// Everything a `BarRenderer` needs to repaint monitor `idx`'s bar.
    pub fn bar_state(&self, idx: usize) -> BarState {
        let monitor = &self.monitors[idx];
        let is_selected = idx == self.selected_monitor;
        let selected_id = monitor.current_view().focused();
        let selected_title = selected_id.and_then(|id| self.clients.get(&id)).map(|c| {
            let indicator = if c.is_fixed() {
                TitleIndicator::Fixed
            } else if c.is_floating() {
                TitleIndicator::Floating
            } else {
                TitleIndicator::Tiled
            };
            (c.title.clone(), indicator)
        });
        let focused_on_selected_tag = selected_id.is_some();

        BarState::for_monitor(
            monitor,
            &self.config.tags,
            self.layout_symbol(idx),
            is_selected,
            &self.status_text,
            |tag| monitor.views[tag].clients.iter().any(|id| self.clients.get(id).map(|c| c.is_urgent()).unwrap_or(false)),
            |tag| !monitor.views[tag].is_empty(),
            focused_on_selected_tag,
            selected_title,
        )
    }

    /// The bar's layout indicator: the plain layout symbol, except for
    /// `Monocle`, which shows the view's total client count instead
    /// (spec §4.4).
    fn layout_symbol(&self, monitor: usize) -> String {
        let view = self.monitors[monitor].current_view();
        if view.layout == Layout::Monocle {
            monocle_symbol(view.clients.len())
        } else {
            view.layout.symbol().to_string()
        }
    }

    // ---- key/button (re)grabbing ------------------------------------

    fn regrab_all_keys(&self) {
        self.conn.ungrab_all_keys();
        for key in &self.config.keys {
            if let Some(keycode) = self.conn.keysym_to_keycode(key.keysym) {
                for combo in lock_combinations(self.numlock_mask) {
                    self.conn.grab_key(keycode, key.modmask | combo);
                }
            }
        }
    }

    // ---- attach/detach wrappers --------------------------------------

    fn attach(&mut self, id: WinId) {
        let (m, v) = { let c = &self.clients[&id]; (c.monitor, c.view) };
        self.monitors[m].views[v].attach(id);
    }

    fn detach(&mut self, id: WinId) {
        let (m, v) = { let c = &self.clients[&id]; (c.monitor, c.view) };
        self.monitors[m].views[v].detach(id);
    }

    fn attach_stack(&mut self, id: WinId) {
        let (m, v) = { let c = &self.clients[&id]; (c.monitor, c.view) };
        self.monitors[m].views[v].attach_stack(id);
    }

    fn detach_stack(&mut self, id: WinId) {
        let (m, v) = { let c = &self.clients[&id]; (c.monitor, c.view) };
        self.monitors[m].views[v].detach_stack(id);
    }

    // ---- lifecycle ------------------------------------------------------

    /// Start managing window `w` (spec §4.2 `manage`). A no-op if `w` is
    /// already managed.
    pub fn manage(&mut self, w: WinId) -> Result<()> {
        if self.clients.contains_key(&w) {
            return Ok(());
        }

        let geometry = self.conn.get_geometry(w)?;
        let transient_for = self.conn.get_transient_for(w)?;

        let (monitor, view, inherit_floating) = match transient_for.and_then(|t| self.clients.get(&t)) {
            Some(parent) => (parent.monitor, parent.view, true),
            None => (self.selected_monitor, self.monitors[self.selected_monitor].selected_view, false),
        };

        let bw = self.config.border_px;
        let area = self.monitors[monitor].window_area();
        let mut rect = geometry;
        rect.x = rect.x.clamp(area.x, (area.right() - rect.w).max(area.x));
        rect.y = rect.y.clamp(area.y, (area.bottom() - rect.h).max(area.y));

        let mut client = Client::new(w, rect, bw, monitor, view);
        let hints = self.conn.get_size_hints(w)?;
        client.set_size_hints(hints);
        if let Ok(title) = self.conn.get_title(w) {
            client.set_title(&title);
        }
        if inherit_floating || client.is_fixed() {
            client.set_floating(true);
        }
        let wm_hints = self.conn.get_wm_hints(w)?;
        client.set_urgent(wm_hints.urgent);

        self.clients.insert(w, client);
        self.attach(w);
        self.attach_stack(w);

        self.conn.select_client_events(w);
        self.conn.set_border_width(w, bw);
        self.conn.configure_window(w, rect, bw);
        self.conn.set_wm_state(w, WmState::Normal);
        self.conn.grab_buttons(w, false);
        self.conn.map_window(w);

        info!(window = w, monitor, view, "managing new window");

        self.arrange(monitor);
        self.focus(Some(w));
        Ok(())
    }

    /// Stop managing window `w` (spec §4.2 `unmanage`). `destroyed` skips the
    /// steps that would touch a window handle that no longer exists.
    pub fn unmanage(&mut self, w: WinId, destroyed: bool) -> Result<()> {
        let client = match self.clients.remove(&w) {
            Some(c) => c,
            None => return Ok(()),
        };

        {
            let _server_grab = ServerGrab::acquire(self.conn.as_ref());
            let _error_guard = ErrorHandlerGuard::install(self.conn.as_ref());

            self.monitors[client.monitor].views[client.view].detach(w);
            self.monitors[client.monitor].views[client.view].detach_stack(w);

            if !destroyed {
                self.conn.set_wm_state(w, WmState::Withdrawn);
                self.conn.ungrab_buttons(w);
            }
        }

        info!(window = w, "unmanaged window");

        let monitor = client.monitor;
        self.arrange(monitor);
        if self.monitors[self.selected_monitor].current_view().focused().is_none() {
            self.focus(None);
        }
        self.bar_dirty.mark(monitor);
        Ok(())
    }

    // ---- stacking / geometry --------------------------------------------

    /// Push every tiled client's stored rectangle to the connection, then
    /// raise the selected client if it's floating or the layout has no
    /// arranger (spec §4.5 `restack`).
    fn restack(&mut self, monitor: usize) {
        let view = self.monitors[monitor].current_view();
        let order = view.focus_stack.clone();
        let mut sibling = self.monitors[monitor].bar_window;
        for &id in &order {
            let floating = self.clients.get(&id).map(|c| c.is_floating()).unwrap_or(true);
            if !floating {
                self.conn.restack(id, sibling, StackMode::Below);
                sibling = Some(id);
            }
        }
        // `EnterNotify` events that a real restack would generate as a side
        // effect (spec §4.5) aren't drained here: `XConn::next_event` only
        // ever blocks for the next event, with no non-blocking peek to drain
        // a burst ahead of schedule.
        if let Some(id) = view.focused() {
            let floating = self.clients.get(&id).map(|c| c.is_floating()).unwrap_or(true);
            let no_arranger = !view.layout.has_arranger();
            if floating || no_arranger {
                self.conn.restack(id, None, StackMode::Above);
            }
        }
    }

    /// Push floating (and layout-less) clients' already-stored geometry to
    /// the connection. Tiled clients are positioned by `arrange`'s call into
    /// `layout::arrange`, so there's nothing left for this to do for them
    /// (spec §4.5 `showhide`, minus the off-screen-hide behaviour the
    /// redesign explicitly drops per Design Note 2).
    fn showhide(&mut self, monitor: usize) {
        let view = self.monitors[monitor].current_view();
        let ids = view.clients.clone();
        let no_arranger = !view.layout.has_arranger();
        for id in ids {
            let floating = self.clients.get(&id).map(|c| c.is_floating()).unwrap_or(true);
            if floating || no_arranger {
                if let Some(client) = self.clients.get(&id) {
                    self.conn.configure_window(id, client.rect, client.bw);
                }
            }
        }
    }

    /// Recompute and apply the selected view's geometry, then restack
    /// (spec §4.4 / §4.5 `arrange`).
    fn arrange(&mut self, monitor: usize) {
        self.showhide(monitor);

        let view = self.monitors[monitor].current_view();
        let layout = view.layout;
        let mfact = view.mfact;
        let tiled = view.tiled_clients(|id| self.clients.get(&id).map(|c| c.is_floating()).unwrap_or(true));

        let area = self.monitors[monitor].window_area();
        let bw = self.config.border_px;
        let bar_height = self.monitors[monitor].bar_height;
        let actions = layout::arrange(layout, &tiled, area, mfact, bw, bar_height);

        for action in actions {
            if let Some(client) = self.clients.get_mut(&action.id) {
                client.rect = action.rect;
                self.conn.configure_window(action.id, action.rect, client.bw);
            }
        }

        self.restack(monitor);
        self.bar_dirty.mark(monitor);
    }

    // ---- focus ------------------------------------------------------------

    fn unfocus(&self, id: WinId) {
        self.conn.set_border_color(id, false);
        self.conn.ungrab_buttons(id);
        self.conn.grab_buttons(id, false);
    }

    /// Focus `target`, or the selected monitor's selected view's current
    /// head-of-stack client when `None` (spec §4.7). Unfocuses whichever
    /// client was previously focused, crosses monitors when `target`
    /// belongs to a different one, clears urgency, and moves `target` to the
    /// head of its view's focus stack.
    pub fn focus(&mut self, target: Option<WinId>) {
        let target = target.or_else(|| self.monitors[self.selected_monitor].current_view().focused());
        let previous = self.monitors[self.selected_monitor].current_view().focused();

        if let Some(prev) = previous {
            if Some(prev) != target {
                self.unfocus(prev);
            }
        }

        match target {
            Some(id) => {
                if let Some(client) = self.clients.get(&id) {
                    if client.monitor != self.selected_monitor {
                        self.selected_monitor = client.monitor;
                    }
                }
                if let Some(client) = self.clients.get_mut(&id) {
                    client.set_urgent(false);
                }
                self.attach_stack(id);
                self.conn.grab_buttons(id, true);
                self.conn.set_border_color(id, true);
                self.conn.set_input_focus(id);
            }
            None => {
                self.conn.set_input_focus(self.root);
            }
        }

        self.bar_dirty.mark_all();
    }

    fn focus_client_delta(&mut self, delta: i32) {
        let view = self.monitors[self.selected_monitor].current_view();
        if view.clients.is_empty() {
            return;
        }
        let current = view.focused();
        let idx = current.and_then(|id| view.clients.iter().position(|&c| c == id));
        let next_idx = match idx {
            Some(i) => ((i as i32 + delta).rem_euclid(view.clients.len() as i32)) as usize,
            None => 0,
        };
        let next = view.clients[next_idx];
        self.focus(Some(next));
    }

    fn focus_monitor_delta(&mut self, delta: i32) {
        let n = self.monitors.len() as i32;
        if n <= 1 {
            return;
        }
        self.selected_monitor = ((self.selected_monitor as i32 + delta).rem_euclid(n)) as usize;
        self.focus(None);
    }

    // ---- client/tag/view actions -----------------------------------------

    fn send_to_monitor(&mut self, id: WinId, target: usize) {
        let (old_monitor, view) = { let c = &self.clients[&id]; (c.monitor, c.view) };
        if old_monitor == target {
            return;
        }
        self.detach(id);
        self.detach_stack(id);
        if let Some(client) = self.clients.get_mut(&id) {
            client.monitor = target;
            client.view = view.min(NUM_VIEWS - 1);
        }
        self.attach(id);
        self.attach_stack(id);
        self.arrange(old_monitor);
        self.arrange(target);
        self.focus(None);
    }

    fn send_to_monitor_delta(&mut self, delta: i32) {
        let n = self.monitors.len() as i32;
        if n <= 1 {
            return;
        }
        let monitor = self.selected_monitor;
        if let Some(id) = self.monitors[monitor].current_view().focused() {
            let target = ((monitor as i32 + delta).rem_euclid(n)) as usize;
            self.send_to_monitor(id, target);
        }
    }

    fn toggle_bar(&mut self) {
        let monitor = self.selected_monitor;
        self.monitors[monitor].show_bar = !self.monitors[monitor].show_bar;
        self.arrange(monitor);
    }

    fn set_layout(&mut self, layout: Layout) {
        let monitor = self.selected_monitor;
        self.monitors[monitor].current_view_mut().layout = layout;
        self.arrange(monitor);
        self.bar_dirty.mark(monitor);
    }

    fn adjust_mfact(&mut self, delta: f32) {
        let monitor = self.selected_monitor;
        self.monitors[monitor].current_view_mut().adjust_mfact(delta);
        self.arrange(monitor);
    }

    /// Promote the focused tiled client to master, dwm-style: if it's
    /// already master, swap it with the next tiled client; otherwise move it
    /// to the front of the display order. A no-op for floating clients,
    /// which have no position in the tiling order to promote.
    fn zoom(&mut self) {
        let monitor = self.selected_monitor;
        let view_idx = self.monitors[monitor].selected_view;
        let focused = self.monitors[monitor].views[view_idx].focused();
        let id = match focused {
            Some(id) => id,
            None => return,
        };
        if self.clients.get(&id).map(|c| c.is_floating()).unwrap_or(true) {
            return;
        }

        let view = &mut self.monitors[monitor].views[view_idx];
        if view.clients.first() == Some(&id) {
            if view.clients.len() > 1 {
                view.clients.swap(0, 1);
            }
        } else {
            view.detach(id);
            view.attach(id);
        }
        self.arrange(monitor);
    }

    fn view(&mut self, tagmask: u16) {
        let idx = match tag_index_from_mask(tagmask) {
            Some(idx) if idx < NUM_VIEWS => idx,
            _ => return,
        };
        let monitor = self.selected_monitor;
        if idx == self.monitors[monitor].selected_view {
            return;
        }
        self.monitors[monitor].select_view(idx);
        self.arrange(monitor);
        self.focus(None);
        self.bar_dirty.mark_all();
    }

    fn tag(&mut self, tagmask: u16) {
        let idx = match tag_index_from_mask(tagmask) {
            Some(idx) if idx < NUM_VIEWS => idx,
            _ => return,
        };
        let monitor = self.selected_monitor;
        let id = match self.monitors[monitor].current_view().focused() {
            Some(id) => id,
            None => return,
        };
        if idx == self.monitors[monitor].selected_view {
            return;
        }
        self.detach(id);
        self.detach_stack(id);
        if let Some(client) = self.clients.get_mut(&id) {
            client.view = idx;
        }
        self.attach(id);
        self.attach_stack(id);
        self.arrange(monitor);
        self.focus(None);
    }

    fn toggle_floating(&mut self) {
        let monitor = self.selected_monitor;
        if let Some(id) = self.monitors[monitor].current_view().focused() {
            if let Some(client) = self.clients.get_mut(&id) {
                client.toggle_floating();
            }
            self.arrange(monitor);
        }
    }

    fn kill_client(&mut self) -> Result<()> {
        let monitor = self.selected_monitor;
        let id = match self.monitors[monitor].current_view().focused() {
            Some(id) => id,
            None => return Ok(()),
        };
        if self.conn.supports_protocol(id, Atom::WmDeleteWindow)? {
            self.conn.send_delete_window(id);
        } else {
            let _server_grab = ServerGrab::acquire(self.conn.as_ref());
            let _error_guard = ErrorHandlerGuard::install(self.conn.as_ref());
            self.conn.kill_client(id);
        }
        Ok(())
    }

    fn spawn(&self, argv: &[String]) -> Result<()> {
        if argv.is_empty() {
            return Ok(());
        }
        use std::process::{Command, Stdio};
        Command::new(&argv[0])
            .args(&argv[1..])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map(|_| ())
            .map_err(Error::Spawn)
    }

    fn quit(&mut self) {
        self.running = false;
    }

    /// Debug-only check of spec §8's invariants. Never wired into the
    /// release event loop — a full client/view scan on every event would
    /// cost real CPU for no production benefit — but cheap enough to call
    /// at the end of every test scenario.
    #[cfg(debug_assertions)]
    pub(crate) fn check_invariants(&self) {
        for (&id, client) in &self.clients {
            for (mi, monitor) in self.monitors.iter().enumerate() {
                for (vi, view) in monitor.views.iter().enumerate() {
                    let belongs = mi == client.monitor && vi == client.view;
                    let in_clients = view.clients.contains(&id);
                    let in_stack = view.focus_stack.contains(&id);
                    if belongs {
                        assert_eq!(view.clients.iter().filter(|&&c| c == id).count(), 1, "client {id} not in its own view's client list exactly once");
                        assert_eq!(view.focus_stack.iter().filter(|&&c| c == id).count(), 1, "client {id} not in its own view's focus stack exactly once");
                    } else {
                        assert!(!in_clients && !in_stack, "client {id} leaked into monitor {mi} view {vi}");
                    }
                }
            }
            if client.is_fixed() {
                assert!(client.is_floating(), "client {id} is fixed but not floating");
            }
        }

        for monitor in &self.monitors {
            for view in &monitor.views {
                assert!((0.1..=0.9).contains(&view.mfact), "mfact {} out of bounds", view.mfact);
                if let Some(focused) = view.focused() {
                    assert_eq!(view.focus_stack.first(), Some(&focused), "focused() disagrees with focus_stack head");
                }
            }
        }
    }

    /// Run the bound action for a key/button press (spec §6's closed set).
    pub fn perform_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::FocusNextClient => self.focus_client_delta(1),
            Action::FocusPrevClient => self.focus_client_delta(-1),
            Action::FocusNextMonitor => self.focus_monitor_delta(1),
            Action::FocusPrevMonitor => self.focus_monitor_delta(-1),
            Action::SendToNextMonitor => self.send_to_monitor_delta(1),
            Action::SendToPrevMonitor => self.send_to_monitor_delta(-1),
            Action::ToggleBar => self.toggle_bar(),
            Action::SetLayout(layout) => self.set_layout(*layout),
            Action::SetMfact(delta) => self.adjust_mfact(*delta),
            Action::Zoom => self.zoom(),
            Action::View(mask) => self.view(*mask),
            Action::Tag(mask) => self.tag(*mask),
            Action::KillClient => self.kill_client()?,
            Action::ToggleFloating => self.toggle_floating(),
            Action::MoveMouse => self.move_mouse()?,
            Action::ResizeMouse => self.resize_mouse()?,
            Action::Spawn(argv) => self.spawn(argv)?,
            Action::Quit => self.quit(),
        }
        Ok(())
    }

    // ---- mouse move/resize state machines (spec §4.10) -------------------

    fn move_mouse(&mut self) -> Result<()> {
        let id = match self.monitors[self.selected_monitor].current_view().focused() {
            Some(id) => id,
            None => return Ok(()),
        };
        if self.clients.get(&id).map(|c| c.is_fullscreen()).unwrap_or(true) {
            return Ok(());
        }
        if !self.conn.grab_pointer(CursorKind::Move) {
            return Ok(());
        }

        let (ocx, ocy) = { let c = &self.clients[&id]; (c.rect.x, c.rect.y) };
        let (x0, y0) = self.conn.pointer_position()?;

        loop {
            let event = self.conn.next_event()?;
            match event {
                XEvent::MotionNotify { root_x, root_y } => {
                    let mon_rect = self.monitors[self.clients[&id].monitor].rect;
                    let snap = self.config.snap;
                    let (w, h) = { let c = &self.clients[&id]; (c.rect.w, c.rect.h) };
                    let mut nx = ocx + (root_x - x0);
                    let mut ny = ocy + (root_y - y0);
                    if (nx - mon_rect.x).abs() < snap {
                        nx = mon_rect.x;
                    }
                    if (nx + w - mon_rect.right()).abs() < snap {
                        nx = mon_rect.right() - w;
                    }
                    if (ny - mon_rect.y).abs() < snap {
                        ny = mon_rect.y;
                    }
                    if (ny + h - mon_rect.bottom()).abs() < snap {
                        ny = mon_rect.bottom() - h;
                    }

                    let moved_enough = (nx - ocx).abs() > snap || (ny - ocy).abs() > snap;
                    if let Some(client) = self.clients.get_mut(&id) {
                        if !client.is_floating() && moved_enough {
                            client.toggle_floating();
                        }
                        if client.is_floating() {
                            client.rect.x = nx;
                            client.rect.y = ny;
                            self.conn.configure_window(id, client.rect, client.bw);
                        }
                    }
                }
                XEvent::ButtonRelease => break,
                XEvent::ConfigureRequest { .. } | XEvent::Expose { .. } | XEvent::MapRequest { .. } => {
                    self.dispatch(event)?;
                }
                _ => {}
            }
        }

        self.conn.ungrab_pointer();
        self.settle_after_mouse_op(id)
    }

    fn resize_mouse(&mut self) -> Result<()> {
        let id = match self.monitors[self.selected_monitor].current_view().focused() {
            Some(id) => id,
            None => return Ok(()),
        };
        if self.clients.get(&id).map(|c| c.is_fullscreen()).unwrap_or(true) {
            return Ok(());
        }
        if !self.conn.grab_pointer(CursorKind::Resize) {
            return Ok(());
        }

        let (ocx, ocy, bw, ow, oh) = {
            let c = &self.clients[&id];
            (c.rect.x, c.rect.y, c.bw, c.rect.w, c.rect.h)
        };
        self.conn.warp_pointer(id, ow + bw - 1, oh + bw - 1);

        loop {
            let event = self.conn.next_event()?;
            match event {
                XEvent::MotionNotify { root_x, root_y } => {
                    let nw = (root_x - ocx - 2 * bw + 1).max(1);
                    let nh = (root_y - ocy - 2 * bw + 1).max(1);
                    let moved_enough = (nw - ow).abs() > self.config.snap || (nh - oh).abs() > self.config.snap;
                    let hints = self.clients.get(&id).map(|c| c.hints).unwrap_or_default();

                    if let Some(client) = self.clients.get_mut(&id) {
                        if !client.is_floating() && moved_enough {
                            client.toggle_floating();
                        }
                        if client.is_floating() {
                            let proposed = Rect::new(client.rect.x, client.rect.y, nw, nh);
                            let bounds = self.monitors[client.monitor].rect;
                            let (resized, _) = apply_size_hints(
                                client.rect,
                                proposed,
                                client.bw,
                                &hints,
                                true,
                                self.config.resize_hints,
                                true,
                                bounds,
                                self.monitors[client.monitor].bar_height,
                            );
                            client.rect = resized;
                            self.conn.configure_window(id, client.rect, client.bw);
                        }
                    }
                }
                XEvent::ButtonRelease => break,
                XEvent::ConfigureRequest { .. } | XEvent::Expose { .. } | XEvent::MapRequest { .. } => {
                    self.dispatch(event)?;
                }
                _ => {}
            }
        }

        self.conn.ungrab_pointer();
        self.settle_after_mouse_op(id)
    }

    /// After a mouse move/resize releases, re-home the client to the monitor
    /// under the pointer if it changed, otherwise just re-arrange the one it
    /// was already on.
    fn settle_after_mouse_op(&mut self, id: WinId) -> Result<()> {
        let (px, py) = self.conn.pointer_position()?;
        let target_monitor = registry::pointer_to_monitor(self, px, py);
        let current_monitor = self.clients.get(&id).map(|c| c.monitor).unwrap_or(self.selected_monitor);
        if target_monitor != current_monitor {
            self.send_to_monitor(id, target_monitor);
        } else {
            self.arrange(current_monitor);
        }
        Ok(())
    }

    // ---- multi-head geometry reconciliation (spec §4.9) -------------------

    /// React to a `ConfigureNotify` on the root window: re-read the screen
    /// list and reconcile monitors against it. Monitors that disappear have
    /// their clients migrated onto monitor 0, preserving each client's view
    /// index (an explicit Open Question resolution: nothing here attempts to
    /// preserve relative tiling order across the migration).
    pub fn update_geometry(&mut self) -> Result<()> {
        let new_screens = dedup_rects(self.conn.screens()?);
        if new_screens.is_empty() {
            return Ok(());
        }
        let n = self.monitors.len();
        let m = new_screens.len();
        let mut changed = false;

        if m >= n {
            for i in 0..n {
                if self.monitors[i].rect != new_screens[i] {
                    self.monitors[i].rect = new_screens[i];
                    changed = true;
                }
            }
            for rect in &new_screens[n..] {
                let mut monitor = Monitor::new(*rect, self.config.show_bar, self.config.top_bar, self.config.bar_height, self.config.mfact);
                let default_layout = self.config.layouts.first().copied().unwrap_or(Layout::Tile);
                for view in monitor.views.iter_mut() {
                    view.layout = default_layout;
                }
                self.monitors.push(monitor);
                changed = true;
            }
        } else {
            for mi in m..n {
                let ids: Vec<WinId> = self.monitors[mi].views.iter().flat_map(|v| v.clients.clone()).collect();
                for id in ids {
                    let view_idx = self.clients.get(&id).map(|c| c.view).unwrap_or(0);
                    self.detach(id);
                    self.detach_stack(id);
                    if let Some(client) = self.clients.get_mut(&id) {
                        client.monitor = 0;
                    }
                    self.monitors[0].views[view_idx].attach(id);
                    self.monitors[0].views[view_idx].attach_stack(id);
                }
            }
            self.monitors.truncate(m);
            for i in 0..self.monitors.len() {
                if self.monitors[i].rect != new_screens[i] {
                    self.monitors[i].rect = new_screens[i];
                }
            }
            if self.selected_monitor >= self.monitors.len() {
                self.selected_monitor = 0;
            }
            changed = true;
        }

        self.bar_dirty.resize(self.monitors.len());

        if changed {
            let (px, py) = self.conn.pointer_position()?;
            self.selected_monitor = registry::pointer_to_monitor(self, px, py);
            for i in 0..self.monitors.len() {
                self.arrange(i);
            }
            warn!(monitor_count = self.monitors.len(), "reconciled monitor geometry");
        }
        Ok(())
    }

    // ---- event dispatch (spec §4.8) ---------------------------------------

    fn dispatch(&mut self, event: XEvent) -> Result<()> {
        match event {
            XEvent::MapRequest { window } => {
                if !self.clients.contains_key(&window) {
                    let attrs = self.conn.get_window_attrs(window)?;
                    if !attrs.override_redirect {
                        self.manage(window)?;
                    }
                }
            }
            XEvent::UnmapNotify { window } => self.unmanage(window, false)?,
            XEvent::DestroyNotify { window } => self.unmanage(window, true)?,
            XEvent::ConfigureRequest { window, x, y, w, h, border_width, mask } => {
                self.handle_configure_request(window, x, y, w, h, border_width, mask)?;
            }
            XEvent::ConfigureNotify { window } => {
                if window == self.root {
                    self.update_geometry()?;
                }
            }
            XEvent::PropertyNotify { window, atom } => self.handle_property_notify(window, atom)?,
            XEvent::ClientMessage { window, message_type, data } => {
                self.handle_client_message(window, message_type, data)?;
            }
            XEvent::EnterNotify { window, mode, detail, root_x, root_y } => {
                self.handle_enter_notify(window, mode, detail, root_x, root_y);
            }
            XEvent::FocusIn { window } => self.handle_focus_in(window),
            XEvent::ButtonPress { window, button, state, .. } => {
                self.handle_button_press(window, button, state)?;
            }
            XEvent::KeyPress { keycode, state, .. } => self.handle_key_press(keycode, state)?,
            XEvent::Expose { window, count } => {
                if count == 0 {
                    if let Some(idx) = self.monitors.iter().position(|m| m.bar_window == Some(window)) {
                        self.bar_dirty.mark(idx);
                    }
                }
            }
            XEvent::MappingNotify => {
                self.conn.refresh_keyboard_mapping();
                self.regrab_all_keys();
            }
            // Only meaningful inside `move_mouse`/`resize_mouse`'s own pump.
            XEvent::MotionNotify { .. } | XEvent::ButtonRelease => {}
        }
        Ok(())
    }

    fn handle_configure_request(
        &mut self,
        window: WinId,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        border_width: i32,
        mask: ConfigureRequestMask,
    ) -> Result<()> {
        let client = match self.clients.get(&window).cloned() {
            Some(c) => c,
            None => {
                self.conn.forward_configure_request(window, x, y, w, h, border_width, mask);
                return Ok(());
            }
        };

        let floating_or_no_arranger = client.is_floating() || !self.monitors[client.monitor].views[client.view].layout.has_arranger();
        if !floating_or_no_arranger {
            self.conn.send_configure_notify(window, client.rect, client.bw);
            return Ok(());
        }

        let mut rect = client.rect;
        if mask.x {
            rect.x = x;
        }
        if mask.y {
            rect.y = y;
        }
        if mask.w {
            rect.w = w;
        }
        if mask.h {
            rect.h = h;
        }

        let mon_rect = self.monitors[client.monitor].window_area();
        if rect.x > mon_rect.right() || rect.y > mon_rect.bottom() || rect.right() < mon_rect.x || rect.bottom() < mon_rect.y {
            rect.x = mon_rect.x + (mon_rect.w - rect.w) / 2;
            rect.y = mon_rect.y + (mon_rect.h - rect.h) / 2;
        }

        let new_bw = if mask.border_width { border_width } else { client.bw };
        if let Some(c) = self.clients.get_mut(&window) {
            c.rect = rect;
            c.bw = new_bw;
        }
        self.conn.configure_window(window, rect, new_bw);
        Ok(())
    }

    fn handle_property_notify(&mut self, window: WinId, atom: Atom) -> Result<()> {
        if window == self.root {
            if atom == Atom::WmName {
                if let Some(text) = self.conn.get_text_prop(self.root, atom)? {
                    let mut text = text;
                    text.truncate(crate::client::TITLE_MAX_BYTES);
                    self.status_text = text;
                    self.bar_dirty.mark(self.selected_monitor);
                }
            }
            return Ok(());
        }

        match atom {
            Atom::NetWmName | Atom::WmName => {
                if let Ok(title) = self.conn.get_title(window) {
                    if let Some(client) = self.clients.get_mut(&window) {
                        client.set_title(&title);
                    }
                    self.bar_dirty.mark_all();
                }
            }
            Atom::WmNormalHints => {
                let hints = self.conn.get_size_hints(window)?;
                if let Some(client) = self.clients.get_mut(&window) {
                    client.set_size_hints(hints);
                }
                if let Some(client) = self.clients.get(&window) {
                    self.arrange(client.monitor);
                }
            }
            Atom::WmHints => {
                let hints = self.conn.get_wm_hints(window)?;
                let was_selected = self
                    .clients
                    .get(&window)
                    .map(|c| self.monitors[c.monitor].current_view().focused() == Some(window))
                    .unwrap_or(false);
                if !was_selected {
                    if let Some(client) = self.clients.get_mut(&window) {
                        client.set_urgent(hints.urgent);
                    }
                    self.bar_dirty.mark_all();
                }
            }
            Atom::WmTransientFor => {
                // A transient-for change after mapping doesn't migrate the
                // client's view/monitor in this design: only the initial
                // `manage()` call reads it (spec §4.2).
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_client_message(&mut self, window: WinId, message_type: Atom, data: [u32; 5]) -> Result<()> {
        if message_type == Atom::NetWmState {
            let action = data[0];
            let properties = [data[1], data[2]];
            let fullscreen_atom = self.conn.atom_id(Atom::NetWmStateFullscreen);
            let fullscreen_requested = properties.iter().any(|&p| p == fullscreen_atom);
            if fullscreen_requested {
                // 0 = remove, 1 = add, 2 = toggle (EWMH _NET_WM_STATE wire convention).
                let client_is_fullscreen = self.clients.get(&window).map(|c| c.is_fullscreen()).unwrap_or(false);
                let go_fullscreen = match action {
                    0 => false,
                    1 => true,
                    _ => !client_is_fullscreen,
                };
                self.set_fullscreen(window, go_fullscreen);
            }
        }
        Ok(())
    }

    fn set_fullscreen(&mut self, window: WinId, fullscreen: bool) {
        let monitor = match self.clients.get(&window).map(|c| c.monitor) {
            Some(m) => m,
            None => return,
        };
        let monitor_rect = self.monitors[monitor].rect;
        if let Some(client) = self.clients.get_mut(&window) {
            if fullscreen {
                client.enter_fullscreen(monitor_rect);
                self.conn.set_wm_state(window, WmState::Normal);
                self.conn.configure_window(window, client.rect, client.bw);
                self.conn.restack(window, None, StackMode::Above);
            } else {
                client.exit_fullscreen();
            }
        }
        self.arrange(monitor);
    }

    fn handle_enter_notify(&mut self, window: WinId, mode: EnterMode, detail: EnterDetail, root_x: i32, root_y: i32) {
        if mode != EnterMode::Normal || detail == EnterDetail::Inferior {
            return;
        }
        if self.clients.contains_key(&window) {
            // `focus` itself switches `selected_monitor` once it knows the
            // target client's monitor (spec §4.7 step 2); switching it here
            // first would make it compute `previous` against the new
            // monitor and never unfocus the old one's selected client.
            self.focus(Some(window));
        } else if window == self.root {
            let target_monitor = registry::pointer_to_monitor(self, root_x, root_y);
            if target_monitor != self.selected_monitor {
                // `focus(None)` only unfocuses against whatever monitor is
                // selected when it runs, so the old monitor's client has to
                // be unfocused before the switch, not after.
                if let Some(prev) = self.monitors[self.selected_monitor].current_view().focused() {
                    self.unfocus(prev);
                }
                self.selected_monitor = target_monitor;
            }
            self.focus(None);
        }
    }

    fn handle_focus_in(&mut self, window: WinId) {
        let selected = self.monitors[self.selected_monitor].current_view().focused();
        if selected != Some(window) {
            match selected {
                Some(id) => self.conn.set_input_focus(id),
                None => self.conn.set_input_focus(self.root),
            }
        }
    }

    fn handle_button_press(&mut self, window: WinId, button: u8, state: u16) -> Result<()> {
        let modmask = clean_mask(state, self.numlock_mask);
        if self.clients.contains_key(&window) {
            // As in `handle_enter_notify`: let `focus` perform the monitor
            // switch itself so it computes `previous` against the old
            // monitor and actually unfocuses it.
            self.focus(Some(window));
            for binding in self.config.buttons.clone() {
                if binding.click == crate::bindings::ClickArea::ClientWindow && binding.button == button && binding.modmask == modmask {
                    self.perform_action(&binding.action)?;
                }
            }
            return Ok(());
        }

        if let Some(idx) = self.monitors.iter().position(|m| m.bar_window == Some(window)) {
            self.selected_monitor = idx;
            // Click-region classification needs glyph widths from the draw
            // collaborator, so the bar-click bindings here only match on
            // button + modifier; a real binary resolves `ClickArea` first
            // via `classify_bar_click` before filtering by region.
            for binding in self.config.buttons.clone() {
                if binding.button == button && binding.modmask == modmask {
                    self.perform_action(&binding.action)?;
                }
            }
        }
        Ok(())
    }

    fn handle_key_press(&mut self, keycode: u8, state: u16) -> Result<()> {
        let modmask = clean_mask(state, self.numlock_mask);
        let keysym = self.conn.keycode_to_keysym(keycode, state);
        for binding in self.config.keys.clone() {
            if binding.keysym == keysym && binding.modmask == modmask {
                self.perform_action(&binding.action)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::geometry::Rect;
    use crate::mock::MockConn;
    use crate::xconn::WindowAttrs;

    fn wm_with_one_monitor() -> (WindowManager, Rc<MockConn>) {
        let conn = Rc::new(MockConn::new(1, vec![Rect::new(0, 0, 1920, 1080)]));
        let boxed: Box<dyn XConn> = Box::new(conn.clone());
        let wm = WindowManager::new(boxed, Config::default()).unwrap();
        (wm, conn)
    }

    fn map(wm: &mut WindowManager, conn: &MockConn, id: WinId, rect: Rect) {
        conn.set_window_attrs(id, WindowAttrs { override_redirect: false });
        conn.set_geometry(id, rect);
        wm.manage(id).unwrap();
    }

    fn wm_with_two_monitors() -> (WindowManager, Rc<MockConn>) {
        let conn = Rc::new(MockConn::new(1, vec![Rect::new(0, 0, 1920, 1080), Rect::new(1920, 0, 1920, 1080)]));
        let boxed: Box<dyn XConn> = Box::new(conn.clone());
        let wm = WindowManager::new(boxed, Config::default()).unwrap();
        (wm, conn)
    }

    #[test]
    fn startup_fails_when_another_window_manager_already_holds_the_root_selection() {
        let conn = Rc::new(MockConn::new(1, vec![Rect::new(0, 0, 1920, 1080)]));
        conn.simulate_other_wm_running();
        let boxed: Box<dyn XConn> = Box::new(conn.clone());
        assert!(WindowManager::new(boxed, Config::default()).is_err());
    }

    #[test]
    fn managing_a_window_maps_it_and_focuses_it() {
        let (mut wm, conn) = wm_with_one_monitor();
        map(&mut wm, &conn, 10, Rect::new(0, 0, 400, 300));
        assert!(conn.is_mapped(10));
        assert_eq!(conn.focused(), Some(10));
    }

    #[test]
    fn two_windows_tile_master_and_stack_per_scenario() {
        let (mut wm, conn) = wm_with_one_monitor();
        map(&mut wm, &conn, 1, Rect::new(0, 0, 400, 300));
        map(&mut wm, &conn, 2, Rect::new(0, 0, 400, 300));

        let (r1, bw1) = conn.configured_rect(1).unwrap();
        let (r2, bw2) = conn.configured_rect(2).unwrap();
        assert_eq!(bw1, 1);
        assert_eq!(bw2, 1);
        assert_eq!(r1, Rect::new(0, 14, 1054, 1064));
        assert_eq!(r2, Rect::new(1056, 14, 862, 1064));
        wm.check_invariants();
    }

    #[test]
    fn unmanaging_the_focused_client_refocuses_the_stack() {
        let (mut wm, conn) = wm_with_one_monitor();
        map(&mut wm, &conn, 1, Rect::new(0, 0, 400, 300));
        map(&mut wm, &conn, 2, Rect::new(0, 0, 400, 300));
        assert_eq!(conn.focused(), Some(2));

        wm.unmanage(2, true).unwrap();
        assert_eq!(conn.focused(), Some(1));
        wm.check_invariants();
    }

    #[test]
    fn zoom_promotes_the_focused_stack_client_to_master() {
        let (mut wm, conn) = wm_with_one_monitor();
        map(&mut wm, &conn, 1, Rect::new(0, 0, 400, 300));
        map(&mut wm, &conn, 2, Rect::new(0, 0, 400, 300));
        // display order is [2, 1] (attach inserts at the front); focus is 2.
        wm.focus(Some(1));
        wm.perform_action(&Action::Zoom).unwrap();
        let view = wm.monitors[0].current_view();
        assert_eq!(view.clients.first(), Some(&1));
        wm.check_invariants();
    }

    #[test]
    fn toggle_floating_removes_a_client_from_the_tiled_set() {
        let (mut wm, conn) = wm_with_one_monitor();
        map(&mut wm, &conn, 1, Rect::new(0, 0, 400, 300));
        map(&mut wm, &conn, 2, Rect::new(0, 0, 400, 300));
        wm.perform_action(&Action::ToggleFloating).unwrap();
        let (r1, _) = conn.configured_rect(1).unwrap();
        // with 2 floated, 1 is the sole tiled client and fills the area.
        assert_eq!(r1, Rect::new(0, 14, 1918, 1064));
        wm.check_invariants();
    }

    #[test]
    fn a_fixed_client_is_floating_as_soon_as_its_managed() {
        use crate::geometry::SizeHints;

        let (mut wm, conn) = wm_with_one_monitor();
        conn.set_size_hints(1, SizeHints { min_w: 200, max_w: 200, min_h: 100, max_h: 100, ..Default::default() });
        map(&mut wm, &conn, 1, Rect::new(0, 0, 200, 100));

        assert!(wm.clients[&1].is_fixed());
        assert!(wm.clients[&1].is_floating());
        wm.check_invariants();
    }

    #[test]
    fn fullscreen_client_fills_the_monitor_rectangle_borderless() {
        let (mut wm, conn) = wm_with_one_monitor();
        map(&mut wm, &conn, 1, Rect::new(0, 0, 400, 300));
        wm.set_fullscreen(1, true);
        let client = &wm.clients[&1];
        assert_eq!(client.rect, Rect::new(0, 0, 1920, 1080));
        assert_eq!(client.bw, 0);
        wm.set_fullscreen(1, false);
        assert!(!wm.clients[&1].is_fullscreen());
    }

    #[test]
    fn fullscreen_round_trip_restores_pretiled_geometry_via_client_message() {
        let (mut wm, conn) = wm_with_one_monitor();
        map(&mut wm, &conn, 1, Rect::new(0, 0, 400, 300));

        let pre_rect = wm.clients[&1].rect;
        let pre_bw = wm.clients[&1].bw;
        assert_eq!(pre_rect, Rect::new(0, 14, 1918, 1064));
        assert_eq!(pre_bw, 1);

        let fullscreen_atom = conn.atom_id(Atom::NetWmStateFullscreen);
        wm.dispatch(XEvent::ClientMessage {
            window: 1,
            message_type: Atom::NetWmState,
            data: [1, fullscreen_atom, 0, 0, 0],
        })
        .unwrap();

        let client = &wm.clients[&1];
        assert_eq!(client.rect, Rect::new(0, 0, 1920, 1080));
        assert_eq!(client.bw, 0);
        assert!(client.is_floating());

        wm.dispatch(XEvent::ClientMessage {
            window: 1,
            message_type: Atom::NetWmState,
            data: [0, fullscreen_atom, 0, 0, 0],
        })
        .unwrap();

        let client = &wm.clients[&1];
        assert_eq!(client.rect, pre_rect);
        assert_eq!(client.bw, pre_bw);
        assert!(!client.is_fullscreen());
        assert!(!client.is_floating());
    }

    #[test]
    fn view_switches_the_selected_monitors_tag() {
        let (mut wm, _conn) = wm_with_one_monitor();
        wm.perform_action(&Action::View(1 << 3)).unwrap();
        assert_eq!(wm.monitors[0].selected_view, 3);
    }

    #[test]
    fn tag_moves_the_focused_client_to_another_view() {
        let (mut wm, conn) = wm_with_one_monitor();
        map(&mut wm, &conn, 1, Rect::new(0, 0, 400, 300));
        wm.perform_action(&Action::Tag(1 << 2)).unwrap();
        assert_eq!(wm.clients[&1].view, 2);
        assert!(wm.monitors[0].views[0].is_empty());
        wm.check_invariants();
    }

    #[test]
    fn three_windows_distribute_remainder_through_the_full_engine() {
        let (mut wm, conn) = wm_with_one_monitor();
        map(&mut wm, &conn, 1, Rect::new(0, 0, 400, 300));
        map(&mut wm, &conn, 2, Rect::new(0, 0, 400, 300));
        map(&mut wm, &conn, 3, Rect::new(0, 0, 400, 300));

        let (r2, _) = conn.configured_rect(2).unwrap();
        let (r3, _) = conn.configured_rect(3).unwrap();
        assert_eq!(r2, Rect::new(1056, 14, 862, 531));
        assert_eq!(r3, Rect::new(1056, 547, 862, 531));
        wm.check_invariants();
    }

    #[test]
    fn monocle_layout_gives_every_client_the_full_area_and_updates_the_symbol() {
        let (mut wm, conn) = wm_with_one_monitor();
        map(&mut wm, &conn, 1, Rect::new(0, 0, 400, 300));
        map(&mut wm, &conn, 2, Rect::new(0, 0, 400, 300));
        map(&mut wm, &conn, 3, Rect::new(0, 0, 400, 300));
        wm.perform_action(&Action::SetLayout(Layout::Monocle)).unwrap();

        for id in [1, 2, 3] {
            let (r, bw) = conn.configured_rect(id).unwrap();
            assert_eq!(r, Rect::new(0, 14, 1918, 1064));
            assert_eq!(bw, 1);
        }
        assert_eq!(wm.layout_symbol(0), "[3]");
        wm.check_invariants();
    }

    #[test]
    fn entering_a_client_on_another_monitor_unfocuses_the_old_monitors_client() {
        let (mut wm, conn) = wm_with_two_monitors();
        map(&mut wm, &conn, 1, Rect::new(0, 0, 400, 300));

        wm.selected_monitor = 1;
        map(&mut wm, &conn, 2, Rect::new(0, 0, 400, 300));
        assert_eq!(conn.focused(), Some(2));

        wm.dispatch(XEvent::EnterNotify {
            window: 1,
            mode: crate::xconn::EnterMode::Normal,
            detail: crate::xconn::EnterDetail::Other,
            root_x: 10,
            root_y: 10,
        })
        .unwrap();

        assert_eq!(conn.focused(), Some(1));
        assert_eq!(conn.is_selected_border(2), Some(false));
        assert_eq!(wm.selected_monitor, 0);
        wm.check_invariants();
    }

    #[test]
    fn mirrortile_layout_splits_master_row_from_stack_row() {
        let (mut wm, conn) = wm_with_one_monitor();
        map(&mut wm, &conn, 1, Rect::new(0, 0, 400, 300));
        map(&mut wm, &conn, 2, Rect::new(0, 0, 400, 300));
        wm.perform_action(&Action::SetLayout(Layout::MirrorTile)).unwrap();

        let (r1, _) = conn.configured_rect(1).unwrap();
        let (r2, _) = conn.configured_rect(2).unwrap();
        assert_eq!(r1, Rect::new(0, 14, 1918, 584));
        assert_eq!(r2, Rect::new(0, 600, 1918, 478));
        wm.check_invariants();
    }
}
