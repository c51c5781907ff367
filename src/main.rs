//! Users Service Entry Point

use users_service::run;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    run().await
}
