//! Models command handler.

use anyhow::{Context, Result};
use comfy_table::{ContentArrangement, Table};
use parlor_core::api::ApiClient;

pub async fn list(base_url: &str) -> Result<()> {
    let client = ApiClient::new(base_url);
    let models = client
        .models()
        .await
        .context("fetch model catalog from backend")?;

    if models.is_empty() {
        println!("No models available.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(["id", "name", "provider", "description"]);
    for model in models {
        table.add_row([model.id, model.name, model.provider, model.description]);
    }
    println!("{table}");

    Ok(())
}
