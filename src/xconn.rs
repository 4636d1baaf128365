//! The X surface abstraction: everything the engine needs from an X11
//! connection, behind a trait so the engine can be driven by a real
//! connection (`x11rb_backend`) or a scripted fake (`mock`) in tests.

use strum_macros::{AsRefStr, EnumIter, EnumString};

use crate::client::WinId;
use crate::error::Result;
use crate::geometry::{Rect, SizeHints};

/// Atoms the engine interns and uses (spec §6). Deliberately a small subset
/// of what a full EWMH implementation would carry — ICCCM/EWMH conformance
/// beyond this list is an explicit non-goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, EnumString, EnumIter)]
pub enum Atom {
    #[strum(serialize = "WM_PROTOCOLS")]
    WmProtocols,
    #[strum(serialize = "WM_DELETE_WINDOW")]
    WmDeleteWindow,
    #[strum(serialize = "WM_STATE")]
    WmState,
    #[strum(serialize = "_NET_SUPPORTED")]
    NetSupported,
    #[strum(serialize = "_NET_WM_NAME")]
    NetWmName,
    #[strum(serialize = "_NET_WM_STATE")]
    NetWmState,
    #[strum(serialize = "_NET_WM_STATE_FULLSCREEN")]
    NetWmStateFullscreen,

    // Predefined core atoms (fixed well-known values, no interning needed at
    // startup) that the `PropertyNotify` dispatch table (spec §4.8) still
    // needs to name symbolically.
    #[strum(serialize = "WM_NAME")]
    WmName,
    #[strum(serialize = "WM_NORMAL_HINTS")]
    WmNormalHints,
    #[strum(serialize = "WM_HINTS")]
    WmHints,
    #[strum(serialize = "WM_TRANSIENT_FOR")]
    WmTransientFor,
}

/// `WM_STATE` property values (spec §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WmState {
    Withdrawn = 0,
    Normal = 1,
    Iconic = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowAttrs {
    pub override_redirect: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WmHints {
    pub urgent: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorKind {
    Normal,
    Move,
    Resize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackMode {
    Above,
    Below,
}

/// Which fields a `ConfigureRequest` actually asked to change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConfigureRequestMask {
    pub x: bool,
    pub y: bool,
    pub w: bool,
    pub h: bool,
    pub border_width: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnterMode {
    Normal,
    Grab,
    Ungrab,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnterDetail {
    Inferior,
    Other,
}

/// The events the dispatcher's fixed table (spec §4.8) is indexed by.
/// Anything else coming off the wire is ignored before it ever becomes an
/// `XEvent`.
#[derive(Debug, Clone, PartialEq)]
pub enum XEvent {
    MapRequest { window: WinId },
    UnmapNotify { window: WinId },
    DestroyNotify { window: WinId },
    ConfigureRequest {
        window: WinId,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        border_width: i32,
        mask: ConfigureRequestMask,
    },
    ConfigureNotify { window: WinId },
    PropertyNotify { window: WinId, atom: Atom },
    ClientMessage { window: WinId, message_type: Atom, data: [u32; 5] },
    EnterNotify { window: WinId, mode: EnterMode, detail: EnterDetail, root_x: i32, root_y: i32 },
    FocusIn { window: WinId },
    ButtonPress { window: WinId, subwindow: Option<WinId>, button: u8, state: u16, event_x: i32, event_y: i32, root_x: i32, root_y: i32 },
    KeyPress { window: WinId, keycode: u8, state: u16 },
    MotionNotify { root_x: i32, root_y: i32 },
    ButtonRelease,
    Expose { window: WinId, count: u32 },
    MappingNotify,
}

/// Everything the engine asks of an X connection. Implemented by
/// `x11rb_backend::X11rbConn` against a real display and by `mock::MockConn`
/// against a scripted fixture.
pub trait XConn {
    fn root(&self) -> WinId;

    /// Blocks until the next event the dispatcher cares about is available.
    fn next_event(&self) -> Result<XEvent>;

    fn flush(&self);
    fn sync(&self);

    /// Xinerama/RandR screen rectangles, deduplicated by the caller (spec §4.9).
    fn screens(&self) -> Result<Vec<Rect>>;

    /// Top-level children of the root, for the startup scan of pre-existing
    /// windows (spec §3 Lifecycle).
    fn top_level_windows(&self) -> Result<Vec<WinId>>;

    /// The interned, server-assigned numeric id for a known atom. Needed to
    /// compare a `ClientMessage`'s raw `data` payload (which carries atom ids,
    /// not `Atom` variants) against a symbolic atom.
    fn atom_id(&self, atom: Atom) -> u32;

    fn get_window_attrs(&self, w: WinId) -> Result<WindowAttrs>;
    fn get_geometry(&self, w: WinId) -> Result<Rect>;
    fn get_size_hints(&self, w: WinId) -> Result<SizeHints>;
    fn get_wm_hints(&self, w: WinId) -> Result<WmHints>;
    fn get_transient_for(&self, w: WinId) -> Result<Option<WinId>>;
    fn get_title(&self, w: WinId) -> Result<String>;
    fn get_text_prop(&self, w: WinId, atom: Atom) -> Result<Option<String>>;
    fn supports_protocol(&self, w: WinId, atom: Atom) -> Result<bool>;

    fn configure_window(&self, w: WinId, rect: Rect, bw: i32);
    fn send_configure_notify(&self, w: WinId, rect: Rect, bw: i32);
    fn restack(&self, w: WinId, sibling: Option<WinId>, mode: StackMode);
    fn forward_configure_request(&self, w: WinId, x: i32, y: i32, width: i32, height: i32, border_width: i32, mask: ConfigureRequestMask);

    fn map_window(&self, w: WinId);
    fn unmap_window(&self, w: WinId);
    fn set_border_width(&self, w: WinId, bw: i32);
    fn set_border_color(&self, w: WinId, selected: bool);
    fn set_input_focus(&self, w: WinId);
    fn set_wm_state(&self, w: WinId, state: WmState);
    fn advertise_net_supported(&self);

    /// Sends `WM_DELETE_WINDOW` via `WM_PROTOCOLS`. Only meaningful when
    /// `supports_protocol` returned true.
    fn send_delete_window(&self, w: WinId);
    fn kill_client(&self, w: WinId);

    /// Selects `SubstructureRedirect` on the root window, which the X server
    /// only grants to one client at a time. Must fail with [`Error::Fatal`]
    /// if another window manager already holds it (spec §7).
    fn select_root_events(&self) -> Result<()>;
    fn select_client_events(&self, w: WinId);

    fn grab_buttons(&self, w: WinId, focused: bool);
    fn ungrab_buttons(&self, w: WinId);
    fn grab_key(&self, keycode: u8, modmask: u16);
    fn ungrab_all_keys(&self);
    fn grab_pointer(&self, cursor: CursorKind) -> bool;
    fn ungrab_pointer(&self);
    fn grab_server(&self);
    fn ungrab_server(&self);

    fn warp_pointer(&self, w: WinId, x: i32, y: i32);
    fn pointer_position(&self) -> Result<(i32, i32)>;

    fn keycode_to_keysym(&self, keycode: u8, state: u16) -> u32;
    /// The inverse of `keycode_to_keysym`, needed to turn a configured
    /// key binding's symbolic keysym into something `grab_key` can act on.
    /// `None` when no key on the current keyboard mapping produces it.
    fn keysym_to_keycode(&self, keysym: u32) -> Option<u8>;
    fn refresh_keyboard_mapping(&self);

    /// Installs a filter that swallows the benign (request_code, error_code)
    /// pairs listed in spec §7 instead of aborting. Returns the number of
    /// errors swallowed since the connection was opened, for diagnostics.
    fn install_error_filter(&self);
    fn restore_error_handler(&self);
}

/// RAII server grab: every exit path from a caller that holds one releases
/// it, including early `?` returns (spec §5).
pub struct ServerGrab<'a> {
    conn: &'a dyn XConn,
}

impl<'a> ServerGrab<'a> {
    pub fn acquire(conn: &'a dyn XConn) -> ServerGrab<'a> {
        conn.grab_server();
        ServerGrab { conn }
    }
}

impl Drop for ServerGrab<'_> {
    fn drop(&mut self) {
        self.conn.ungrab_server();
    }
}

/// RAII error-handler swap, balancing `install_error_filter` /
/// `restore_error_handler` around a speculative sequence against a window
/// that may disappear mid-sequence (`unmanage`, `kill_client`).
pub struct ErrorHandlerGuard<'a> {
    conn: &'a dyn XConn,
}

impl<'a> ErrorHandlerGuard<'a> {
    pub fn install(conn: &'a dyn XConn) -> ErrorHandlerGuard<'a> {
        conn.install_error_filter();
        ErrorHandlerGuard { conn }
    }
}

impl Drop for ErrorHandlerGuard<'_> {
    fn drop(&mut self) {
        self.conn.restore_error_handler();
    }
}

/// The whitelist of (request_code, error_code) pairs a benign-error filter
/// must swallow (spec §7). Named symbolically since the crate never speaks
/// the wire protocol directly outside `x11rb_backend`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BenignError {
    BadWindow,
    BadMatchOnSetInputFocusOrConfigureWindow,
    BadDrawableOnPoly,
    BadAccessOnGrabButtonOrGrabKey,
}
