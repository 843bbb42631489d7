use std::sync::OnceLock;
use std::thread;
use tokio::runtime::{Builder, Handle};

static BACKGROUND: OnceLock<Handle> = OnceLock::new();

/// The runtime the caller is on, or a shared background runtime when called from plain
/// synchronous code.
pub fn handle() -> Handle {
    Handle::try_current().unwrap_or_else(|_| BACKGROUND.get_or_init(start_background).clone())
}

fn start_background() -> Handle {
    let rt = Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("Failed to create Tokio runtime");
    let handle = rt.handle().clone();

    thread::Builder::new()
        .name("balloons-runtime".to_string())
        .spawn(move || rt.block_on(std::future::pending::<()>()))
        .expect("Failed to spawn runtime thread");

    handle
}
