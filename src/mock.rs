//! A scripted fake X connection for exercising the engine without a real
//! display, grounded on `core/xconnection.rs`'s `StubXConn` pattern.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::rc::Rc;

use crate::client::WinId;
use crate::error::{Error, Result};
use crate::geometry::{Rect, SizeHints};
use crate::xconn::{Atom, ConfigureRequestMask, CursorKind, StackMode, WindowAttrs, WmHints, WmState, XConn, XEvent};

#[derive(Default)]
struct Inner {
    events: VecDeque<XEvent>,
    screens: Vec<Rect>,
    attrs: HashMap<WinId, WindowAttrs>,
    geometry: HashMap<WinId, Rect>,
    size_hints: HashMap<WinId, SizeHints>,
    wm_hints: HashMap<WinId, WmHints>,
    transient_for: HashMap<WinId, WinId>,
    titles: HashMap<WinId, String>,
    protocols: HashMap<WinId, Vec<Atom>>,
    /// Last `configure_window` call seen per window: (rect, border width).
    configured: HashMap<WinId, (Rect, i32)>,
    mapped: HashSet<WinId>,
    wm_state: HashMap<WinId, WmState>,
    focus: Option<WinId>,
    /// Last `set_border_color` call seen per window.
    border_selected: HashMap<WinId, bool>,
    pointer: (i32, i32),
    restacked: Vec<WinId>,
    killed: Vec<WinId>,
    deleted: Vec<WinId>,
    server_grabs: i32,
    error_filters: i32,
    root_events_conflict: bool,
}

pub struct MockConn {
    root: WinId,
    inner: RefCell<Inner>,
}

impl MockConn {
    pub fn new(root: WinId, screens: Vec<Rect>) -> MockConn {
        MockConn {
            root,
            inner: RefCell::new(Inner { screens, ..Inner::default() }),
        }
    }

    pub fn push_event(&self, ev: XEvent) {
        self.inner.borrow_mut().events.push_back(ev);
    }

    pub fn set_window_attrs(&self, w: WinId, attrs: WindowAttrs) {
        self.inner.borrow_mut().attrs.insert(w, attrs);
    }

    pub fn set_geometry(&self, w: WinId, rect: Rect) {
        self.inner.borrow_mut().geometry.insert(w, rect);
    }

    pub fn set_size_hints(&self, w: WinId, hints: SizeHints) {
        self.inner.borrow_mut().size_hints.insert(w, hints);
    }

    pub fn set_protocols(&self, w: WinId, protocols: Vec<Atom>) {
        self.inner.borrow_mut().protocols.insert(w, protocols);
    }

    pub fn set_screens(&self, screens: Vec<Rect>) {
        self.inner.borrow_mut().screens = screens;
    }

    pub fn set_pointer(&self, x: i32, y: i32) {
        self.inner.borrow_mut().pointer = (x, y);
    }

    /// Makes `select_root_events` behave as if another window manager already
    /// holds `SubstructureRedirect` on the root window.
    pub fn simulate_other_wm_running(&self) {
        self.inner.borrow_mut().root_events_conflict = true;
    }

    pub fn configured_rect(&self, w: WinId) -> Option<(Rect, i32)> {
        self.inner.borrow().configured.get(&w).copied()
    }

    pub fn is_mapped(&self, w: WinId) -> bool {
        self.inner.borrow().mapped.contains(&w)
    }

    pub fn focused(&self) -> Option<WinId> {
        self.inner.borrow().focus
    }

    /// Whether `w` was last told to draw its selected (vs. unselected)
    /// border color, or `None` if `set_border_color` was never called for it.
    pub fn is_selected_border(&self, w: WinId) -> Option<bool> {
        self.inner.borrow().border_selected.get(&w).copied()
    }

    pub fn was_killed(&self, w: WinId) -> bool {
        self.inner.borrow().killed.contains(&w)
    }

    pub fn was_sent_delete(&self, w: WinId) -> bool {
        self.inner.borrow().deleted.contains(&w)
    }

    pub fn restack_order(&self) -> Vec<WinId> {
        self.inner.borrow().restacked.clone()
    }
}

impl XConn for MockConn {
    fn root(&self) -> WinId {
        self.root
    }

    fn next_event(&self) -> Result<XEvent> {
        self.inner
            .borrow_mut()
            .events
            .pop_front()
            .ok_or(Error::ConnectionLost)
    }

    fn flush(&self) {}
    fn sync(&self) {}

    fn screens(&self) -> Result<Vec<Rect>> {
        Ok(self.inner.borrow().screens.clone())
    }

    fn top_level_windows(&self) -> Result<Vec<WinId>> {
        Ok(Vec::new())
    }

    fn atom_id(&self, atom: Atom) -> u32 {
        // The mock never talks to a real atom table; the enum's own
        // discriminant is a stable-enough stand-in for equality checks in
        // tests.
        atom as u32
    }

    fn get_window_attrs(&self, w: WinId) -> Result<WindowAttrs> {
        Ok(self.inner.borrow().attrs.get(&w).copied().unwrap_or(WindowAttrs { override_redirect: false }))
    }

    fn get_geometry(&self, w: WinId) -> Result<Rect> {
        Ok(self.inner.borrow().geometry.get(&w).copied().unwrap_or(Rect::new(0, 0, 1, 1)))
    }

    fn get_size_hints(&self, w: WinId) -> Result<SizeHints> {
        Ok(self.inner.borrow().size_hints.get(&w).copied().unwrap_or_default())
    }

    fn get_wm_hints(&self, w: WinId) -> Result<WmHints> {
        Ok(self.inner.borrow().wm_hints.get(&w).copied().unwrap_or_default())
    }

    fn get_transient_for(&self, w: WinId) -> Result<Option<WinId>> {
        Ok(self.inner.borrow().transient_for.get(&w).copied())
    }

    fn get_title(&self, w: WinId) -> Result<String> {
        Ok(self.inner.borrow().titles.get(&w).cloned().unwrap_or_default())
    }

    fn get_text_prop(&self, w: WinId, _atom: Atom) -> Result<Option<String>> {
        Ok(self.inner.borrow().titles.get(&w).cloned())
    }

    fn supports_protocol(&self, w: WinId, atom: Atom) -> Result<bool> {
        Ok(self.inner.borrow().protocols.get(&w).map(|p| p.contains(&atom)).unwrap_or(false))
    }

    fn configure_window(&self, w: WinId, rect: Rect, bw: i32) {
        self.inner.borrow_mut().configured.insert(w, (rect, bw));
    }

    fn send_configure_notify(&self, _w: WinId, _rect: Rect, _bw: i32) {}

    fn restack(&self, w: WinId, _sibling: Option<WinId>, _mode: StackMode) {
        self.inner.borrow_mut().restacked.push(w);
    }

    fn forward_configure_request(&self, w: WinId, x: i32, y: i32, width: i32, height: i32, _bw: i32, _mask: ConfigureRequestMask) {
        self.inner.borrow_mut().configured.insert(w, (Rect::new(x, y, width, height), 0));
    }

    fn map_window(&self, w: WinId) {
        self.inner.borrow_mut().mapped.insert(w);
    }

    fn unmap_window(&self, w: WinId) {
        self.inner.borrow_mut().mapped.remove(&w);
    }

    fn set_border_width(&self, w: WinId, bw: i32) {
        let mut inner = self.inner.borrow_mut();
        let rect = inner.configured.get(&w).map(|(r, _)| *r).unwrap_or(Rect::new(0, 0, 1, 1));
        inner.configured.insert(w, (rect, bw));
    }

    fn set_border_color(&self, w: WinId, selected: bool) {
        self.inner.borrow_mut().border_selected.insert(w, selected);
    }

    fn set_input_focus(&self, w: WinId) {
        self.inner.borrow_mut().focus = Some(w);
    }

    fn set_wm_state(&self, w: WinId, state: WmState) {
        self.inner.borrow_mut().wm_state.insert(w, state);
    }

    fn advertise_net_supported(&self) {}

    fn send_delete_window(&self, w: WinId) {
        self.inner.borrow_mut().deleted.push(w);
    }

    fn kill_client(&self, w: WinId) {
        self.inner.borrow_mut().killed.push(w);
    }

    fn select_root_events(&self) -> Result<()> {
        if self.inner.borrow().root_events_conflict {
            return Err(Error::Fatal("another window manager is already running".to_string()));
        }
        Ok(())
    }
    fn select_client_events(&self, _w: WinId) {}

    fn grab_buttons(&self, _w: WinId, _focused: bool) {}
    fn ungrab_buttons(&self, _w: WinId) {}
    fn grab_key(&self, _keycode: u8, _modmask: u16) {}
    fn ungrab_all_keys(&self) {}
    fn grab_pointer(&self, _cursor: CursorKind) -> bool {
        true
    }
    fn ungrab_pointer(&self) {}

    fn grab_server(&self) {
        self.inner.borrow_mut().server_grabs += 1;
    }

    fn ungrab_server(&self) {
        self.inner.borrow_mut().server_grabs -= 1;
    }

    fn warp_pointer(&self, _w: WinId, x: i32, y: i32) {
        self.inner.borrow_mut().pointer = (x, y);
    }

    fn pointer_position(&self) -> Result<(i32, i32)> {
        Ok(self.inner.borrow().pointer)
    }

    fn keycode_to_keysym(&self, _keycode: u8, _state: u16) -> u32 {
        0
    }

    fn keysym_to_keycode(&self, _keysym: u32) -> Option<u8> {
        None
    }

    fn refresh_keyboard_mapping(&self) {}

    fn install_error_filter(&self) {
        self.inner.borrow_mut().error_filters += 1;
    }

    fn restore_error_handler(&self) {
        self.inner.borrow_mut().error_filters -= 1;
    }
}

/// Lets a test hold onto an `Rc<MockConn>` for assertions while also handing
/// a `Box<dyn XConn>` (wrapping a clone of the same `Rc`) to the engine,
/// without resorting to any downcasting.
impl XConn for Rc<MockConn> {
    fn root(&self) -> WinId {
        (**self).root()
    }
    fn next_event(&self) -> Result<XEvent> {
        (**self).next_event()
    }
    fn flush(&self) {
        (**self).flush()
    }
    fn sync(&self) {
        (**self).sync()
    }
    fn screens(&self) -> Result<Vec<Rect>> {
        (**self).screens()
    }
    fn top_level_windows(&self) -> Result<Vec<WinId>> {
        (**self).top_level_windows()
    }
    fn atom_id(&self, atom: Atom) -> u32 {
        (**self).atom_id(atom)
    }
    fn get_window_attrs(&self, w: WinId) -> Result<WindowAttrs> {
        (**self).get_window_attrs(w)
    }
    fn get_geometry(&self, w: WinId) -> Result<Rect> {
        (**self).get_geometry(w)
    }
    fn get_size_hints(&self, w: WinId) -> Result<SizeHints> {
        (**self).get_size_hints(w)
    }
    fn get_wm_hints(&self, w: WinId) -> Result<WmHints> {
        (**self).get_wm_hints(w)
    }
    fn get_transient_for(&self, w: WinId) -> Result<Option<WinId>> {
        (**self).get_transient_for(w)
    }
    fn get_title(&self, w: WinId) -> Result<String> {
        (**self).get_title(w)
    }
    fn get_text_prop(&self, w: WinId, atom: Atom) -> Result<Option<String>> {
        (**self).get_text_prop(w, atom)
    }
    fn supports_protocol(&self, w: WinId, atom: Atom) -> Result<bool> {
        (**self).supports_protocol(w, atom)
    }
    fn configure_window(&self, w: WinId, rect: Rect, bw: i32) {
        (**self).configure_window(w, rect, bw)
    }
    fn send_configure_notify(&self, w: WinId, rect: Rect, bw: i32) {
        (**self).send_configure_notify(w, rect, bw)
    }
    fn restack(&self, w: WinId, sibling: Option<WinId>, mode: StackMode) {
        (**self).restack(w, sibling, mode)
    }
    fn forward_configure_request(&self, w: WinId, x: i32, y: i32, width: i32, height: i32, border_width: i32, mask: ConfigureRequestMask) {
        (**self).forward_configure_request(w, x, y, width, height, border_width, mask)
    }
    fn map_window(&self, w: WinId) {
        (**self).map_window(w)
    }
    fn unmap_window(&self, w: WinId) {
        (**self).unmap_window(w)
    }
    fn set_border_width(&self, w: WinId, bw: i32) {
        (**self).set_border_width(w, bw)
    }
    fn set_border_color(&self, w: WinId, selected: bool) {
        (**self).set_border_color(w, selected)
    }
    fn set_input_focus(&self, w: WinId) {
        (**self).set_input_focus(w)
    }
    fn set_wm_state(&self, w: WinId, state: WmState) {
        (**self).set_wm_state(w, state)
    }
    fn advertise_net_supported(&self) {
        (**self).advertise_net_supported()
    }
    fn send_delete_window(&self, w: WinId) {
        (**self).send_delete_window(w)
    }
    fn kill_client(&self, w: WinId) {
        (**self).kill_client(w)
    }
    fn select_root_events(&self) -> Result<()> {
        (**self).select_root_events()
    }
    fn select_client_events(&self, w: WinId) {
        (**self).select_client_events(w)
    }
    fn grab_buttons(&self, w: WinId, focused: bool) {
        (**self).grab_buttons(w, focused)
    }
    fn ungrab_buttons(&self, w: WinId) {
        (**self).ungrab_buttons(w)
    }
    fn grab_key(&self, keycode: u8, modmask: u16) {
        (**self).grab_key(keycode, modmask)
    }
    fn ungrab_all_keys(&self) {
        (**self).ungrab_all_keys()
    }
    fn grab_pointer(&self, cursor: CursorKind) -> bool {
        (**self).grab_pointer(cursor)
    }
    fn ungrab_pointer(&self) {
        (**self).ungrab_pointer()
    }
    fn grab_server(&self) {
        (**self).grab_server()
    }
    fn ungrab_server(&self) {
        (**self).ungrab_server()
    }
    fn warp_pointer(&self, w: WinId, x: i32, y: i32) {
        (**self).warp_pointer(w, x, y)
    }
    fn pointer_position(&self) -> Result<(i32, i32)> {
        (**self).pointer_position()
    }
    fn keycode_to_keysym(&self, keycode: u8, state: u16) -> u32 {
        (**self).keycode_to_keysym(keycode, state)
    }
    fn keysym_to_keycode(&self, keysym: u32) -> Option<u8> {
        (**self).keysym_to_keycode(keysym)
    }
    fn refresh_keyboard_mapping(&self) {
        (**self).refresh_keyboard_mapping()
    }
    fn install_error_filter(&self) {
        (**self).install_error_filter()
    }
    fn restore_error_handler(&self) {
        (**self).restore_error_handler()
    }
}
