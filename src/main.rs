//! Binary entry point: parses a handful of flags, wires up tracing, opens
//! the real X connection, and drives the engine loop until it's told to
//! quit. Everything interesting lives in the library crate; this is just
//! the part that can't be exercised by `MockConn`.

use std::{env, process};

use nix::sys::signal::{signal, SigHandler, Signal};
use tracing::{error, info};

use ninewm::config::Config;
use ninewm::wm::WindowManager;
use ninewm::x11rb_backend::X11rbConn;
use ninewm::xconn::XConn;

fn usage() -> &'static str {
    "usage: ninewm [-v | -h]"
}

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() == 2 && (args[1] == "-v" || args[1] == "--version") {
        println!("ninewm-{}", option_env!("CARGO_PKG_VERSION").unwrap_or("0.1.0"));
        process::exit(0);
    }
    if args.len() == 2 && (args[1] == "-h" || args[1] == "--help") {
        println!("{}", usage());
        process::exit(0);
    }
    if args.len() > 1 {
        eprintln!("{}", usage());
        process::exit(1);
    }

    tracing_subscriber::fmt::init();

    // Reap spawned children (dmenu, terminals, ...) at the kernel level
    // instead of polling for SIGCHLD ourselves.
    if let Err(e) = unsafe { signal(Signal::SIGCHLD, SigHandler::SigIgn) } {
        error!(%e, "unable to install SIGCHLD handler");
        process::exit(1);
    }

    if let Err(e) = run() {
        error!(%e, "ninewm exited with an error");
        process::exit(1);
    }
}

fn run() -> ninewm::error::Result<()> {
    let config = Config::default();
    let conn = X11rbConn::connect(config.colors.normal_border, config.colors.selected_border)?;
    conn.install_error_filter();

    let mut wm = WindowManager::new(Box::new(conn), config)?;
    info!("ninewm started");

    while wm.is_running() {
        wm.step()?;
    }

    info!("ninewm shutting down");
    Ok(())
}
