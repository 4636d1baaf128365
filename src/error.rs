//! Crate-wide error type.
//!
//! Benign X races (a window destroyed between a `MapRequest` and our
//! `ConfigureWindow`, an `UnmapNotify` for something we already forgot) never
//! reach this enum: the `XConn` implementation filters them against the
//! whitelist in spec §7 and reports them to the engine as logged no-ops.
//! What's left here is genuinely fatal to the running window manager.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Startup failed outright: another window manager is already running,
    /// the display couldn't be opened, or a required collaborator (e.g. the
    /// bar's font) failed to initialize.
    #[error("fatal: {0}")]
    Fatal(String),

    /// Spawning a configured command failed.
    #[error("failed to spawn child process: {0}")]
    Spawn(#[source] std::io::Error),

    /// The connection to the X server was lost (server exited, socket closed).
    #[error("connection to the X server was lost")]
    ConnectionLost,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
