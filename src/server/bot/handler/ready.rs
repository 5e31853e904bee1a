//! Ready event handler for bot initialization.
//!
//! Fired once per gateway session after the handshake. Registers the `/init` command in
//! every guild the bot is already a member of, so the panel can be posted right away.

use serenity::all::{Context, GuildId, Ready};

use crate::server::bot::handler::command;

/// Handles the ready event when the bot connects to Discord.
///
/// # Arguments
/// - `ctx` - Discord context used to register commands
/// - `ready` - Ready event data containing the bot user and its guilds
pub async fn handle_ready(ctx: Context, ready: Ready) {
    tracing::info!(
        "{} is connected to Discord in {} guild(s)",
        ready.user.name,
        ready.guilds.len()
    );

    for guild in &ready.guilds {
        register_commands(&ctx, guild.id).await;
    }
}

/// Replaces the guild's application commands with `/init`.
///
/// Failures are logged and otherwise ignored; the bot keeps serving other guilds.
pub async fn register_commands(ctx: &Context, guild_id: GuildId) {
    match guild_id
        .set_commands(&ctx.http, vec![command::init_command()])
        .await
    {
        Ok(_) => tracing::info!("Registered /{} in guild {}", command::INIT_COMMAND, guild_id),
        Err(e) => tracing::error!("Failed to register commands in guild {}: {}", guild_id, e),
    }
}
