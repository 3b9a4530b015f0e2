//! Config command - show or initialize the configuration file.

use anyhow::{Context as _, Result};

use super::Context;

pub async fn run(ctx: &Context, init: bool) -> Result<()> {
    let store = ctx
        .store
        .as_ref()
        .context("Could not determine home directory")?;

    if init {
        store
            .save(&ctx.config)
            .await
            .with_context(|| format!("Failed to write {}", store.path().display()))?;
        println!("Wrote {}", store.path().display());
        return Ok(());
    }

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&ctx.config)?);
        return Ok(());
    }

    let state = if store.path().exists() {
        "exists"
    } else {
        "not created, showing defaults"
    };
    println!("Config file: {} ({})", store.path().display(), state);
    println!("{}", serde_json::to_string_pretty(&ctx.config)?);
    Ok(())
}
