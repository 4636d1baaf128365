//! A single managed client window.

use bitflags::bitflags;

use crate::geometry::{Rect, SizeHints};

pub type WinId = u32;

bitflags! {
    /// Boolean client state. `OLD_FLOATING` records the pre-fullscreen
    /// floating bit so [`Client::exit_fullscreen`] can restore it exactly,
    /// per spec invariant 6.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ClientFlags: u8 {
        const FIXED       = 0b0000_0001;
        const FLOATING    = 0b0000_0010;
        const URGENT      = 0b0000_0100;
        const FULLSCREEN  = 0b0000_1000;
        const OLD_FLOATING = 0b0001_0000;
    }
}

/// Maximum length, in bytes, a client title is truncated to before being
/// stored (spec §3).
pub const TITLE_MAX_BYTES: usize = 256;

/// A managed top-level window.
///
/// The intrusive `next`/`snext` links of the original design are dropped:
/// ordering within a view lives in `View::clients` and `View::focus_stack`
/// instead (see `view.rs`).
#[derive(Debug, Clone)]
pub struct Client {
    pub id: WinId,
    pub title: String,
    /// Current on-screen geometry (excludes border width).
    pub rect: Rect,
    /// Geometry to restore when a floating client stops being fullscreen,
    /// or when it's toggled back from floating to tiled.
    pub saved_rect: Rect,
    pub bw: i32,
    pub saved_bw: i32,
    pub hints: SizeHints,
    pub flags: ClientFlags,
    pub monitor: usize,
    pub view: usize,
}

impl Client {
    pub fn new(id: WinId, rect: Rect, bw: i32, monitor: usize, view: usize) -> Client {
        Client {
            id,
            title: String::new(),
            rect,
            saved_rect: rect,
            bw,
            saved_bw: bw,
            hints: SizeHints::default(),
            flags: ClientFlags::empty(),
            monitor,
            view,
        }
    }

    pub fn is_floating(&self) -> bool {
        self.flags.contains(ClientFlags::FLOATING)
    }

    pub fn is_fixed(&self) -> bool {
        self.flags.contains(ClientFlags::FIXED)
    }

    pub fn is_urgent(&self) -> bool {
        self.flags.contains(ClientFlags::URGENT)
    }

    pub fn is_fullscreen(&self) -> bool {
        self.flags.contains(ClientFlags::FULLSCREEN)
    }

    pub fn set_urgent(&mut self, urgent: bool) {
        self.flags.set(ClientFlags::URGENT, urgent);
    }

    pub fn set_title(&mut self, title: &str) {
        let mut truncated = title.to_string();
        if truncated.len() > TITLE_MAX_BYTES {
            let mut end = TITLE_MAX_BYTES;
            while !truncated.is_char_boundary(end) {
                end -= 1;
            }
            truncated.truncate(end);
        }
        self.title = truncated;
    }

    pub fn set_size_hints(&mut self, hints: SizeHints) {
        self.flags.set(ClientFlags::FIXED, hints.is_fixed());
        self.hints = hints;
    }

    /// Flips the floating flag, per spec's `toggle_floating` involution
    /// (applying it twice is a no-op on the flag itself, though the caller
    /// is responsible for re-arranging afterwards). Fixed clients ignore
    /// this: they're floating for good (invariant 5), not by user choice.
    pub fn toggle_floating(&mut self) {
        if self.is_fixed() {
            return;
        }
        let now_floating = !self.is_floating();
        self.flags.set(ClientFlags::FLOATING, now_floating);
        if now_floating {
            self.saved_rect = self.rect;
        }
    }

    /// Sets the floating flag directly, bypassing the fixed-client guard
    /// `toggle_floating` applies. Used at `manage` time to float a fixed or
    /// transient client unconditionally (spec invariant 5); `toggle_floating`
    /// is for the user-initiated action only.
    pub fn set_floating(&mut self, floating: bool) {
        self.flags.set(ClientFlags::FLOATING, floating);
        if floating {
            self.saved_rect = self.rect;
        }
    }

    /// Enter fullscreen: save current geometry/border/floating state, mark
    /// floating and borderless. Idempotent.
    pub fn enter_fullscreen(&mut self, monitor_rect: Rect) {
        if self.is_fullscreen() {
            return;
        }
        self.saved_rect = self.rect;
        self.saved_bw = self.bw;
        self.flags.set(ClientFlags::OLD_FLOATING, self.is_floating());
        self.flags.insert(ClientFlags::FULLSCREEN | ClientFlags::FLOATING);
        self.bw = 0;
        self.rect = monitor_rect;
    }

    /// Exit fullscreen: restore the geometry, border width and floating flag
    /// saved by `enter_fullscreen`. Round-trips bit-exactly (spec law 3).
    pub fn exit_fullscreen(&mut self) {
        if !self.is_fullscreen() {
            return;
        }
        self.rect = self.saved_rect;
        self.bw = self.saved_bw;
        self.flags.set(ClientFlags::FLOATING, self.flags.contains(ClientFlags::OLD_FLOATING));
        self.flags.remove(ClientFlags::FULLSCREEN | ClientFlags::OLD_FLOATING);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> Client {
        Client::new(1, Rect::new(0, 0, 800, 600), 1, 0, 0)
    }

    #[test]
    fn toggle_floating_is_an_involution() {
        let mut c = client();
        assert!(!c.is_floating());
        c.toggle_floating();
        assert!(c.is_floating());
        c.toggle_floating();
        assert!(!c.is_floating());
    }

    #[test]
    fn fixed_clients_cannot_be_untoggled_from_floating() {
        let mut c = client();
        c.set_size_hints(SizeHints {
            min_w: 200,
            min_h: 100,
            max_w: 200,
            max_h: 100,
            ..Default::default()
        });
        assert!(c.is_fixed());
        c.toggle_floating();
        assert!(!c.is_floating());
    }

    #[test]
    fn fullscreen_round_trips_bit_exactly() {
        let mut c = client();
        let original = c.rect;
        let original_bw = c.bw;
        let original_floating = c.is_floating();

        c.enter_fullscreen(Rect::new(0, 0, 1920, 1080));
        assert!(c.is_fullscreen());
        assert_eq!(c.bw, 0);

        c.exit_fullscreen();
        assert!(!c.is_fullscreen());
        assert_eq!(c.rect, original);
        assert_eq!(c.bw, original_bw);
        assert_eq!(c.is_floating(), original_floating);
    }

    #[test]
    fn title_is_truncated_to_256_bytes() {
        let mut c = client();
        let long = "x".repeat(300);
        c.set_title(&long);
        assert_eq!(c.title.len(), TITLE_MAX_BYTES);
    }
}
