//! Chat command handler.

use anyhow::{Context, Result};
use parlor_core::api::ApiClient;
use parlor_core::session::SessionController;

pub async fn run(base_url: &str, model: Option<String>) -> Result<()> {
    let client = ApiClient::new(base_url);
    let mut controller = SessionController::new(client, model);
    controller.startup().await;

    parlor_tui::run(controller)
        .await
        .context("interactive chat failed")?;

    Ok(())
}
