//! Matte compositor CLI tool
//!
//! Command-line driver for the matte-compositor library.

#[cfg(feature = "cli")]
use matte_compositor::cli;

#[cfg(feature = "cli")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cli::main().await
}

#[cfg(not(feature = "cli"))]
fn main() {
    panic!("CLI feature not enabled. Please rebuild with --features cli");
}
