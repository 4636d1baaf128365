//! The four layout arrangers: `tile`, `mirrortile`, `monocle`, `floating`.
//!
//! Each arranger takes the tiled clients of a view's current display order
//! plus the monitor's window rectangle and produces the rectangle each
//! client should be configured to. Floating clients are filtered out by the
//! caller before these functions ever see them (spec §4.3 `next_tiled`).

use crate::client::WinId;
use crate::geometry::Rect;
use crate::view::Layout;

/// One client's target geometry, as produced by an arranger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeAction {
    pub id: WinId,
    pub rect: Rect,
}

/// Arrange `clients` (already filtered to tiled-only, in display order) into
/// `area` under `layout`. Returns one `ResizeAction` per client, or an empty
/// vec for zero clients or for `Layout::Floating` (null arranger).
pub fn arrange(layout: Layout, clients: &[WinId], area: Rect, mfact: f32, bw: i32, bar_height: i32) -> Vec<ResizeAction> {
    match layout {
        Layout::Tile => tile(clients, area, mfact, bw, bar_height),
        Layout::MirrorTile => mirrortile(clients, area, mfact, bw),
        Layout::Monocle => monocle(clients, area, bw),
        Layout::Floating => Vec::new(),
    }
}

/// Master column on the left, stack column on the right, stack rows split
/// vertically with the remainder distributed to the leading rows.
fn tile(clients: &[WinId], area: Rect, mfact: f32, bw: i32, bar_height: i32) -> Vec<ResizeAction> {
    let n = clients.len();
    if n == 0 {
        return Vec::new();
    }

    let mw = if n > 1 { (mfact * area.w as f32) as i32 } else { area.w };
    let mut out = Vec::with_capacity(n);
    out.push(ResizeAction {
        id: clients[0],
        rect: Rect::new(area.x, area.y, mw - 2 * bw, area.h - 2 * bw),
    });

    let stack = &clients[1..];
    if stack.is_empty() {
        return out;
    }

    let stack_n = stack.len() as i32;
    let stack_x = area.x + mw;
    let stack_w = area.w - mw;
    let base = area.h / stack_n;
    let rem = area.h % stack_n;

    if base < bar_height {
        // Rows would be too thin to be usable: collapse the stack into one
        // full-height slot per client, overlapping (only the top is visible
        // after restack).
        for &id in stack {
            out.push(ResizeAction {
                id,
                rect: Rect::new(stack_x, area.y, stack_w - 2 * bw, area.h - 2 * bw),
            });
        }
        return out;
    }

    let mut y = area.y;
    for (i, &id) in stack.iter().enumerate() {
        let h = base + if (i as i32) < rem { 1 } else { 0 };
        out.push(ResizeAction {
            id,
            rect: Rect::new(stack_x, y, stack_w - 2 * bw, h - 2 * bw),
        });
        y += h;
    }
    out
}

/// Transpose of `tile`: master strip on top, stack split horizontally below.
fn mirrortile(clients: &[WinId], area: Rect, mfact: f32, bw: i32) -> Vec<ResizeAction> {
    let n = clients.len();
    if n == 0 {
        return Vec::new();
    }

    let mh = if n > 1 { (mfact * area.h as f32) as i32 } else { area.h };
    let mut out = Vec::with_capacity(n);
    out.push(ResizeAction {
        id: clients[0],
        rect: Rect::new(area.x, area.y, area.w - 2 * bw, mh - 2 * bw),
    });

    let stack = &clients[1..];
    if stack.is_empty() {
        return out;
    }

    let stack_n = stack.len() as i32;
    let stack_y = area.y + mh;
    let stack_h = area.h - mh;
    let base = area.w / stack_n;
    let rem = area.w % stack_n;

    let mut x = area.x;
    for (i, &id) in stack.iter().enumerate() {
        let w = base + if (i as i32) < rem { 1 } else { 0 };
        out.push(ResizeAction {
            id,
            rect: Rect::new(x, stack_y, w - 2 * bw, stack_h - 2 * bw),
        });
        x += w;
    }
    out
}

/// Every tiled client occupies the full window rectangle; only the topmost
/// (selected) one is visible once `restack` runs.
fn monocle(clients: &[WinId], area: Rect, bw: i32) -> Vec<ResizeAction> {
    clients
        .iter()
        .map(|&id| ResizeAction {
            id,
            rect: Rect::new(area.x, area.y, area.w - 2 * bw, area.h - 2 * bw),
        })
        .collect()
}

/// `"[N]"`, the monocle layout symbol override (spec §4.4), where `n` is the
/// total client count in the view (not just visible ones).
pub fn monocle_symbol(n: usize) -> String {
    format!("[{}]", n)
}

#[cfg(test)]
mod tests {
    use super::*;

    // A 1920x1080 monitor with a 14px top bar: window area (0, 14, 1920, 1066).
    const AREA: Rect = Rect { x: 0, y: 14, w: 1920, h: 1066 };
    const BW: i32 = 1;
    const BAR: i32 = 14;

    #[test]
    fn one_tiled_window_fills_the_window_area() {
        let out = tile(&[1], AREA, 0.55, BW, BAR);
        assert_eq!(out, vec![ResizeAction { id: 1, rect: Rect::new(0, 14, 1918, 1064) }]);
    }

    #[test]
    fn two_tiled_windows_split_master_and_stack() {
        let out = tile(&[1, 2], AREA, 0.55, BW, BAR);
        assert_eq!(out[0], ResizeAction { id: 1, rect: Rect::new(0, 14, 1054, 1064) });
        assert_eq!(out[1], ResizeAction { id: 2, rect: Rect::new(1056, 14, 862, 1064) });
    }

    #[test]
    fn three_tiled_windows_distribute_remainder() {
        let out = tile(&[1, 2, 3], AREA, 0.55, BW, BAR);
        assert_eq!(out[1], ResizeAction { id: 2, rect: Rect::new(1056, 14, 862, 531) });
        assert_eq!(out[2], ResizeAction { id: 3, rect: Rect::new(1056, 547, 862, 531) });
    }

    #[test]
    fn mirrortile_two_windows() {
        let out = mirrortile(&[1, 2], AREA, 0.55, BW);
        assert_eq!(out[0], ResizeAction { id: 1, rect: Rect::new(0, 14, 1918, 584) });
        assert_eq!(out[1], ResizeAction { id: 2, rect: Rect::new(0, 600, 1918, 478) });
    }

    #[test]
    fn monocle_all_clients_get_the_full_area() {
        let out = monocle(&[1, 2, 3], AREA, BW);
        for action in &out {
            assert_eq!(action.rect, Rect::new(0, 14, 1918, 1064));
        }
        assert_eq!(monocle_symbol(out.len()), "[3]");
    }

    #[test]
    fn tile_is_idempotent() {
        let first = tile(&[1, 2, 3], AREA, 0.55, BW, BAR);
        let second = tile(&[1, 2, 3], AREA, 0.55, BW, BAR);
        assert_eq!(first, second);
    }

    #[test]
    fn tile_distributes_height_exactly_and_master_plus_stack_span_the_width() {
        let out = tile(&[1, 2, 3, 4], AREA, 0.55, BW, BAR);
        let mw = (0.55_f32 * AREA.w as f32) as i32;

        // every stack row's footprint (w + 2*bw) is the same stack width
        for action in out.iter().skip(1) {
            assert_eq!(action.rect.w + 2 * BW, AREA.w - mw);
        }
        assert_eq!(out[0].rect.w + 2 * BW, mw);

        // stack row heights (plus borders) sum exactly to the window area height
        let total_h: i32 = out.iter().skip(1).map(|a| a.rect.h + 2 * BW).sum();
        assert_eq!(total_h, AREA.h);
    }
}

/// Quickcheck based tests to ensure that every arranger behaves for arbitrary
/// inputs. These don't assert anything about the resulting geometry, only
/// that arranging an arbitrary client list into an arbitrary area never
/// panics and always places every client.
#[cfg(test)]
mod quickcheck_tests {
    use super::*;
    use quickcheck::{Arbitrary, Gen};
    use quickcheck_macros::quickcheck;

    impl Arbitrary for Rect {
        fn arbitrary(g: &mut Gen) -> Self {
            // Width/height at least 100px: a zero-area monitor isn't
            // something an arranger should have to consider valid input.
            Rect::new(u8::arbitrary(g) as i32, u8::arbitrary(g) as i32, u8::arbitrary(g) as i32 + 100, u8::arbitrary(g) as i32 + 100)
        }
    }

    fn arbitrary_clients(g: &mut Gen) -> Vec<WinId> {
        let n = u8::arbitrary(g) % 12;
        (1..=n as WinId).collect()
    }

    #[quickcheck]
    fn tile_never_panics_and_places_every_client(r: Rect, n: u8) -> bool {
        let clients = (1..=(n % 12) as WinId).collect::<Vec<_>>();
        arrange(Layout::Tile, &clients, r, 0.55, 1, 14).len() == clients.len()
    }

    #[quickcheck]
    fn mirrortile_never_panics_and_places_every_client(r: Rect, n: u8) -> bool {
        let clients = (1..=(n % 12) as WinId).collect::<Vec<_>>();
        arrange(Layout::MirrorTile, &clients, r, 0.55, 1, 14).len() == clients.len()
    }

    #[quickcheck]
    fn monocle_never_panics_and_places_every_client(r: Rect, n: u8) -> bool {
        let clients = (1..=(n % 12) as WinId).collect::<Vec<_>>();
        arrange(Layout::Monocle, &clients, r, 0.55, 1, 14).len() == clients.len()
    }

    #[quickcheck]
    fn floating_layout_is_the_null_arranger(r: Rect, g: u8) -> bool {
        let mut gen = Gen::new(g as usize + 1);
        let clients = arbitrary_clients(&mut gen);
        arrange(Layout::Floating, &clients, r, 0.55, 1, 14).is_empty()
    }
}
