//! A dynamic tiling window manager for X11, in the style of dwm: nine tags
//! per monitor, a master/stack tiling layout, and a small closed set of
//! keyboard/mouse-bound actions.
//!
//! The crate is organized the way the engine actually reasons about state:
//! geometry and ICCCM negotiation at the bottom, client/view/monitor records
//! above that, the four layout arrangers next to the records they arrange,
//! then the `XConn` surface and the engine that drives it.

pub mod bar;
pub mod bindings;
pub mod client;
pub mod config;
pub mod error;
pub mod geometry;
pub mod keys;
pub mod layout;
pub mod monitor;
pub mod registry;
pub mod view;
pub mod wm;
pub mod xconn;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

#[cfg(feature = "x11rb")]
pub mod x11rb_backend;
