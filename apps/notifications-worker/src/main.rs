//! Binary entry point for the notifications worker.

use core_config::tracing::install_color_eyre;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();
    notifications_worker::run().await
}
