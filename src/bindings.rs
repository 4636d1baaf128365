//! Key and mouse bindings, and the closed set of actions they can dispatch.
//!
//! Per Design Note 4, actions are a closed enum carrying their own typed
//! argument rather than a function pointer plus a tagged argument union.

use crate::view::Layout;

/// The closed set of actions a binding can name (spec §6).
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    FocusNextClient,
    FocusPrevClient,
    FocusNextMonitor,
    FocusPrevMonitor,
    SendToNextMonitor,
    SendToPrevMonitor,
    ToggleBar,
    SetLayout(Layout),
    SetMfact(f32),
    Zoom,
    /// Switch the selected monitor's view to this tag bitmask. A bitmask
    /// rather than a single index so a binding can view a union of tags.
    View(u16),
    /// Move the selected client to this tag bitmask.
    Tag(u16),
    KillClient,
    ToggleFloating,
    MoveMouse,
    ResizeMouse,
    Spawn(Vec<String>),
    Quit,
}

/// Where on the bar (or elsewhere) a `ButtonPress` landed, per spec §4.8's
/// click classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickArea {
    TagLabel,
    LayoutSymbol,
    StatusText,
    WindowTitle,
    ClientWindow,
    Root,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyBinding {
    pub modmask: u16,
    pub keysym: u32,
    pub action: Action,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MouseBinding {
    pub modmask: u16,
    pub button: u8,
    pub click: ClickArea,
    pub action: Action,
}
