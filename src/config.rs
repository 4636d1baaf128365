//! The immutable configuration record (spec §6), assembled in code at
//! startup the way dwm's `config.h` or penrose's `Config::default()`
//! (`core/data_types.rs`) is: a binary builds a `Config`, overriding only
//! the fields it cares about via struct-update syntax, and hands it to the
//! engine once. There is no runtime-reconfiguration mechanism.

use crate::bindings::{Action, ClickArea, KeyBinding, MouseBinding};
use crate::keys::keysym_by_name;
use crate::view::Layout;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Colors {
    pub normal_fg: u32,
    pub normal_bg: u32,
    pub normal_border: u32,
    pub selected_fg: u32,
    pub selected_bg: u32,
    pub selected_border: u32,
}

impl Default for Colors {
    fn default() -> Self {
        Colors {
            normal_fg: 0xbbbbbb,
            normal_bg: 0x222222,
            normal_border: 0x444444,
            selected_fg: 0xeeeeee,
            selected_bg: 0x005577,
            selected_border: 0x005577,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub tags: [String; 9],
    /// The layout table; its first entry is the default for new views
    /// (spec §6).
    pub layouts: Vec<Layout>,
    pub mfact: f32,
    pub snap: i32,
    pub border_px: i32,
    pub show_bar: bool,
    pub top_bar: bool,
    /// The bar's height in pixels. A real binary derives this from the
    /// draw collaborator's loaded font metrics (`font_spec`); the engine
    /// itself just needs a concrete number to reserve room for and to floor
    /// client sizes against (spec §4.1 step 3), so it's plumbed through
    /// configuration rather than computed here.
    pub bar_height: i32,
    /// Whether tiled (not just floating) clients get ICCCM size-hint
    /// clamping applied too (spec §4.1 step 4).
    pub resize_hints: bool,
    pub colors: Colors,
    pub font_spec: String,
    pub keys: Vec<KeyBinding>,
    pub buttons: Vec<MouseBinding>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            tags: [
                "1".to_string(),
                "2".to_string(),
                "3".to_string(),
                "4".to_string(),
                "5".to_string(),
                "6".to_string(),
                "7".to_string(),
                "8".to_string(),
                "9".to_string(),
            ],
            layouts: vec![Layout::Tile, Layout::MirrorTile, Layout::Monocle, Layout::Floating],
            mfact: 0.55,
            snap: 32,
            border_px: 1,
            show_bar: true,
            top_bar: true,
            bar_height: 14,
            resize_hints: false,
            colors: Colors::default(),
            font_spec: "monospace:size=10".to_string(),
            keys: default_keys(),
            buttons: default_buttons(),
        }
    }
}

fn bind(modmask: u16, keysym_name: &str, action: Action) -> KeyBinding {
    KeyBinding {
        modmask,
        keysym: keysym_by_name(keysym_name).unwrap_or(0),
        action,
    }
}

/// A reasonable dwm-like default binding set: `Mod4` (the "super" key) for
/// window-manager actions, `Mod4+Shift` for the destructive/moving variants.
fn default_keys() -> Vec<KeyBinding> {
    use crate::keys::modmask::{MOD1, MOD4, SHIFT};

    let mut keys = vec![
        bind(MOD4, "j", Action::FocusNextClient),
        bind(MOD4, "k", Action::FocusPrevClient),
        bind(MOD4, "Tab", Action::FocusNextClient),
        bind(MOD4 | SHIFT, "j", Action::SendToNextMonitor),
        bind(MOD4 | SHIFT, "k", Action::SendToPrevMonitor),
        bind(MOD4, "comma", Action::FocusPrevMonitor),
        bind(MOD4, "period", Action::FocusNextMonitor),
        bind(MOD4, "b", Action::ToggleBar),
        bind(MOD4, "t", Action::SetLayout(Layout::Tile)),
        bind(MOD4, "m", Action::SetLayout(Layout::Monocle)),
        bind(MOD4, "f", Action::ToggleFloating),
        bind(MOD4, "h", Action::SetMfact(-0.05)),
        bind(MOD4, "l", Action::SetMfact(0.05)),
        bind(MOD4, "Return", Action::Zoom),
        bind(MOD4 | SHIFT, "c", Action::KillClient),
        bind(MOD4 | SHIFT, "q", Action::Quit),
        bind(MOD1, "p", Action::Spawn(vec!["dmenu_run".to_string()])),
        bind(MOD4 | SHIFT, "Return", Action::Spawn(vec!["st".to_string()])),
    ];

    for tag in 0..9u16 {
        let bitmask = 1 << tag;
        let digit = (tag + 1).to_string();
        keys.push(bind(MOD4, &digit, Action::View(bitmask)));
        keys.push(bind(MOD4 | SHIFT, &digit, Action::Tag(bitmask)));
    }

    keys
}

fn default_buttons() -> Vec<MouseBinding> {
    use crate::keys::modmask::MOD4;

    vec![
        MouseBinding { modmask: MOD4, button: 1, click: ClickArea::ClientWindow, action: Action::MoveMouse },
        MouseBinding { modmask: MOD4, button: 3, click: ClickArea::ClientWindow, action: Action::ResizeMouse },
        MouseBinding { modmask: 0, button: 1, click: ClickArea::TagLabel, action: Action::View(0) },
        MouseBinding { modmask: MOD4, button: 1, click: ClickArea::TagLabel, action: Action::Tag(0) },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_nine_tags_and_all_four_layouts() {
        let cfg = Config::default();
        assert_eq!(cfg.tags.len(), 9);
        assert_eq!(cfg.layouts[0], Layout::Tile);
        assert_eq!(cfg.layouts.len(), 4);
    }

    #[test]
    fn mfact_default_is_within_bounds() {
        let cfg = Config::default();
        assert!(cfg.mfact >= 0.1 && cfg.mfact <= 0.9);
    }

    #[test]
    fn tag_keybindings_cover_all_nine_tags() {
        let cfg = Config::default();
        let view_bindings = cfg.keys.iter().filter(|k| matches!(k.action, Action::View(_))).count();
        assert_eq!(view_bindings, 9);
    }

    #[test]
    fn no_two_default_keybindings_share_a_modmask_and_keysym() {
        let cfg = Config::default();
        let mut seen = std::collections::HashSet::new();
        for k in &cfg.keys {
            assert!(seen.insert((k.modmask, k.keysym)), "duplicate binding for modmask {} keysym {:#x}", k.modmask, k.keysym);
        }
    }
}
