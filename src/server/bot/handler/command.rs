//! Slash commands.

use serenity::all::{
    CommandInteraction, Context, CreateCommand, CreateInteractionResponse,
    CreateInteractionResponseMessage, Permissions,
};

use crate::server::{
    bot::{embed, handler::interaction},
    error::AppError,
};

pub const INIT_COMMAND: &str = "init";

/// `/init`, hidden from members without the Administrator permission.
pub fn init_command() -> CreateCommand {
    CreateCommand::new(INIT_COMMAND)
        .description("Post the license token management panel")
        .default_member_permissions(Permissions::ADMINISTRATOR)
}

/// Handles a slash command.
///
/// `/init` posts the management panel in the channel for administrators and answers
/// everyone else with an ephemeral refusal.
pub async fn handle_command(ctx: &Context, command: &CommandInteraction) -> Result<(), AppError> {
    if command.data.name != INIT_COMMAND {
        tracing::debug!("Ignoring unknown command /{}", command.data.name);
        return Ok(());
    }

    if !interaction::is_administrator(command.member.as_deref()) {
        command
            .create_response(&ctx.http, interaction::refusal())
            .await?;
        return Ok(());
    }

    let response = CreateInteractionResponse::Message(
        CreateInteractionResponseMessage::new()
            .embed(embed::panel_embed())
            .components(embed::panel_buttons()),
    );
    command.create_response(&ctx.http, response).await?;

    tracing::info!(
        "{} posted the token panel in channel {}",
        command.user.name,
        command.channel_id
    );

    Ok(())
}
