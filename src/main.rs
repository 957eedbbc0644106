mod character;
mod config;
mod core;
mod memory;
mod models;
mod providers;

use crate::config::Config;
use crate::core::agent::Agent;
use crate::providers::discord::{intents, PetHandler};
use crate::providers::image::ImageFetcher;

use dotenv::dotenv;
use serenity::Client;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = dotenv() {
        warn!("No .env file loaded: {}", e);
    }

    let config = Config::from_env()?;
    info!(model = %config.gemini_model, image_api = %config.image_api_url, "Starting pet bot");

    let agent = Agent::new(&config.gemini_api_key, &config.gemini_model, config.text_timeout);
    let images = ImageFetcher::new(&config.image_api_url, config.image_timeout)?;
    let handler = PetHandler::new(Arc::new(agent), Arc::new(images));

    let mut client = Client::builder(&config.discord_token, intents())
        .event_handler(handler)
        .await?;

    client.start().await?;
    Ok(())
}
