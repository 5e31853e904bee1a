//! Guild create event handler.

use serenity::all::{Context, Guild};

use crate::server::bot::handler::ready;

/// Registers `/init` when the bot is added to a guild after startup.
///
/// Guilds that were already known at connect time are covered by the ready handler, so
/// their create events are skipped.
pub async fn handle_guild_create(ctx: Context, guild: Guild, is_new: Option<bool>) {
    if is_new != Some(true) {
        return;
    }

    tracing::info!("Joined guild {} ({})", guild.name, guild.id);

    ready::register_commands(&ctx, guild.id).await;
}
