use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

#[derive(Clone)]
pub struct Config {
    /// Base URL of the chat gateway's bot API.
    pub gateway_base_url: String,
    /// Bot token appended to the gateway URL path.
    pub gateway_bot_token: String,
    /// Shared secret the gateway attaches to inbound update requests.
    pub gateway_webhook_secret: String,
    /// The one administrator chat; compared for equality, no roles.
    pub admin_chat_id: i64,
    pub port: u16,
    /// Pipe-delimited clue table.
    pub clues_path: PathBuf,
    /// Pipe-delimited completion-code table.
    pub codes_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let gateway_base_url = env::var("GATEWAY_BASE_URL")
            .context("GATEWAY_BASE_URL environment variable is required")?;

        let gateway_bot_token = env::var("GATEWAY_BOT_TOKEN")
            .context("GATEWAY_BOT_TOKEN environment variable is required")?;

        let gateway_webhook_secret = env::var("GATEWAY_WEBHOOK_SECRET")
            .context("GATEWAY_WEBHOOK_SECRET environment variable is required")?;

        let admin_chat_id = env::var("ADMIN_CHAT_ID")
            .context("ADMIN_CHAT_ID environment variable is required")?
            .parse::<i64>()
            .context("ADMIN_CHAT_ID must be a valid chat id")?;

        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .context("PORT must be a valid number")?;

        let clues_path = env::var("CLUES_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("Clues.csv"));

        let codes_path = env::var("CODES_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("Codes.csv"));

        Ok(Config {
            gateway_base_url,
            gateway_bot_token,
            gateway_webhook_secret,
            admin_chat_id,
            port,
            clues_path,
            codes_path,
        })
    }
}
