pub mod books;
pub mod ping;

use std::sync::Arc;

use anyhow::Context;
use shelf_kernel::{settings::Settings, ModuleRegistry};
use shelf_notion::{CredentialSource, DatabaseQuery, EnvCredentials, NotionClient};

/// Register all modules, reading credentials from the process environment
/// on every request
pub fn register_all(registry: &mut ModuleRegistry, settings: &Settings) -> anyhow::Result<()> {
    let client = NotionClient::new(&settings.notion).context("failed to build Notion client")?;
    register_with(registry, Arc::new(client), Arc::new(EnvCredentials))
}

/// Register all modules against an explicit Notion source and credentials
pub fn register_with(
    registry: &mut ModuleRegistry,
    source: Arc<dyn DatabaseQuery>,
    credentials: Arc<dyn CredentialSource>,
) -> anyhow::Result<()> {
    registry.register(books::create_module(source, credentials.clone()))?;
    registry.register(ping::create_module(credentials))?;
    Ok(())
}
