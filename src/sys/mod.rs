pub mod runtime;

/// Installs `env_logger` (configured through `RUST_LOG`). Returns `false` if a logger was
/// already installed.
pub fn init_logging() -> bool {
    env_logger::try_init().is_ok()
}
