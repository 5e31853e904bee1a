use sea_orm::DatabaseConnection;
use serenity::all::{Client, GatewayIntents};

use crate::server::{bot::handler::Handler, error::AppError};

/// Starts the Discord bot and runs it until the gateway connection ends.
///
/// Should be called from within a `tokio::spawn` task since it does not return while the
/// bot is connected.
///
/// # Arguments
/// - `bot_token` - Discord bot token
/// - `db` - Database connection for the bot to use
///
/// # Returns
/// - `Ok(())` if the bot shuts down cleanly
/// - `Err(AppError)` if bot initialization or connection fails
pub async fn start_bot(bot_token: &str, db: DatabaseConnection) -> Result<(), AppError> {
    let intents = GatewayIntents::GUILDS;

    let mut client = Client::builder(bot_token, intents)
        .event_handler(Handler::new(db))
        .await?;

    tracing::info!("Starting Discord bot...");

    client.start().await?;

    Ok(())
}
