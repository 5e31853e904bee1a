//! Interaction dispatch and shared reply helpers.
//!
//! Every slash command, button click and modal submission arrives here. Handler errors are
//! answered ephemerally: operator mistakes (`BadRequest`, `NotFound`) with their message,
//! anything else with a generic notice after logging the full error.

use sea_orm::DatabaseConnection;
use serenity::all::{
    Context, CreateInteractionResponse, CreateInteractionResponseFollowup,
    CreateInteractionResponseMessage, Interaction, Member,
};

use crate::server::{
    bot::handler::{command, component, modal},
    error::AppError,
};

const NOT_ADMINISTRATOR: &str = "Only server administrators can manage license tokens.";
const GENERIC_FAILURE: &str = "Something went wrong while handling that request.";

/// Handles an interaction event from Discord.
///
/// # Arguments
/// - `db` - Token store connection
/// - `ctx` - Discord context for responding
/// - `interaction` - Command, component or modal interaction
pub async fn handle_interaction_create(
    db: &DatabaseConnection,
    ctx: Context,
    interaction: Interaction,
) {
    let result = match &interaction {
        Interaction::Command(command) => command::handle_command(&ctx, command).await,
        Interaction::Component(component) => {
            component::handle_component(db, &ctx, component).await
        }
        Interaction::Modal(modal) => modal::handle_modal(db, &ctx, modal).await,
        _ => Ok(()),
    };

    if let Err(err) = result {
        report_error(&ctx, &interaction, err).await;
    }
}

/// Whether the invoking member holds the Administrator permission.
pub(super) fn is_administrator(member: Option<&Member>) -> bool {
    member
        .and_then(|member| member.permissions)
        .is_some_and(|permissions| permissions.administrator())
}

/// Ephemeral refusal for members without the Administrator permission.
pub(super) fn refusal() -> CreateInteractionResponse {
    CreateInteractionResponse::Message(
        CreateInteractionResponseMessage::new()
            .content(NOT_ADMINISTRATOR)
            .ephemeral(true),
    )
}

fn error_message(err: &AppError) -> String {
    match err {
        AppError::BadRequest(message) | AppError::NotFound(message) => {
            tracing::debug!("Rejected admin input: {}", message);
            message.clone()
        }
        err => {
            tracing::error!("Failed to handle interaction: {}", err);
            GENERIC_FAILURE.to_string()
        }
    }
}

/// Replies with the error, falling back to a follow-up when already answered.
async fn report_error(ctx: &Context, interaction: &Interaction, err: AppError) {
    let message = error_message(&err);
    let response = CreateInteractionResponse::Message(
        CreateInteractionResponseMessage::new()
            .content(&message)
            .ephemeral(true),
    );
    let followup = CreateInteractionResponseFollowup::new()
        .content(&message)
        .ephemeral(true);

    let result = match interaction {
        Interaction::Command(command) => {
            match command.create_response(&ctx.http, response).await {
                Ok(()) => Ok(()),
                Err(_) => command.create_followup(&ctx.http, followup).await.map(|_| ()),
            }
        }
        Interaction::Component(component) => {
            match component.create_response(&ctx.http, response).await {
                Ok(()) => Ok(()),
                Err(_) => component.create_followup(&ctx.http, followup).await.map(|_| ()),
            }
        }
        Interaction::Modal(modal) => match modal.create_response(&ctx.http, response).await {
            Ok(()) => Ok(()),
            Err(_) => modal.create_followup(&ctx.http, followup).await.map(|_| ()),
        },
        _ => Ok(()),
    };

    if let Err(e) = result {
        tracing::error!("Failed to report interaction error: {}", e);
    }
}
