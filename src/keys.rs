//! Keysym translation: bridges the generated `ninewm_keysyms::XKeySym` table
//! (symbolic X11 keysym names) to the raw numeric keysyms the `XConn`
//! backend deals in.

use std::str::FromStr;

use ninewm_keysyms::XKeySym;

/// Modifier masks, matching the X11 `Mod*Mask`/`ShiftMask`/`ControlMask` bit
/// positions so they can be compared directly against the `state` field of
/// `KeyPress`/`ButtonPress` events.
pub mod modmask {
    pub const SHIFT: u16 = 1 << 0;
    pub const LOCK: u16 = 1 << 1;
    pub const CONTROL: u16 = 1 << 2;
    pub const MOD1: u16 = 1 << 3;
    pub const MOD2: u16 = 1 << 4;
    pub const MOD3: u16 = 1 << 5;
    pub const MOD4: u16 = 1 << 6;
    pub const MOD5: u16 = 1 << 7;
}

/// `CLEANMASK(mask) = mask & ~(NumLockMask | CapsLockMask)` (spec §4.8),
/// applied to both configured and incoming modifier sets before comparison.
/// `NumLockMask` isn't a fixed bit (it's whatever modifier XModMapping
/// assigned it at runtime), so the caller supplies it; `CapsLockMask` is
/// always `LOCK`.
pub fn clean_mask(mask: u16, numlock_mask: u16) -> u16 {
    mask & !(numlock_mask | modmask::LOCK)
}

/// The lock-modifier combinations a binding must be re-grabbed under so it
/// still fires with Caps Lock / Num Lock held (spec §4.7 focus policy, active
/// button grabs).
pub fn lock_combinations(numlock_mask: u16) -> [u16; 4] {
    [0, modmask::LOCK, numlock_mask, modmask::LOCK | numlock_mask]
}

/// Resolve a symbolic keysym name from a configuration (e.g. `"Return"`,
/// `"BackSpace"`) to its numeric X11 keysym value.
pub fn keysym_by_name(name: &str) -> Option<u32> {
    XKeySym::from_str(name).ok().map(|k| k.keysym_value())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_named_keysyms() {
        assert_eq!(keysym_by_name("Return"), Some(0xff0d));
        assert_eq!(keysym_by_name("Escape"), Some(0xff1b));
        assert_eq!(keysym_by_name("not_a_real_keysym"), None);
    }

    #[test]
    fn clean_mask_strips_lock_modifiers() {
        let numlock = modmask::MOD2;
        let mask = modmask::MOD4 | modmask::LOCK | numlock;
        assert_eq!(clean_mask(mask, numlock), modmask::MOD4);
    }

    #[test]
    fn lock_combinations_cover_all_four_states() {
        let combos = lock_combinations(modmask::MOD2);
        assert_eq!(combos.len(), 4);
        assert!(combos.contains(&0));
        assert!(combos.contains(&(modmask::LOCK | modmask::MOD2)));
    }
}
