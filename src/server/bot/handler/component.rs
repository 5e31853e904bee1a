//! Button clicks on the panel and on token embeds.

use sea_orm::DatabaseConnection;
use serenity::all::{
    ComponentInteraction, Context, CreateInteractionResponse, CreateInteractionResponseMessage,
};

use crate::server::{
    bot::{
        action::{ModalAction, PanelAction},
        embed,
        handler::interaction,
    },
    error::AppError,
    service::license_token::LicenseTokenService,
};

/// Handles a button click.
///
/// Panel buttons open the matching modal. Field buttons open a one-field edit modal.
/// The confirm button of a delete prompt revokes the token and replaces the prompt.
pub async fn handle_component(
    db: &DatabaseConnection,
    ctx: &Context,
    component: &ComponentInteraction,
) -> Result<(), AppError> {
    let action: PanelAction = component
        .data
        .custom_id
        .parse()
        .map_err(|e| AppError::InternalError(format!("{}", e)))?;

    if !interaction::is_administrator(component.member.as_ref()) {
        component
            .create_response(&ctx.http, interaction::refusal())
            .await?;
        return Ok(());
    }

    let response = match action {
        PanelAction::Create => CreateInteractionResponse::Modal(embed::create_modal()),
        PanelAction::Verify => CreateInteractionResponse::Modal(embed::token_modal(
            ModalAction::Verify,
            "Verify token",
        )),
        PanelAction::Update => CreateInteractionResponse::Modal(embed::token_modal(
            ModalAction::Update,
            "Update token",
        )),
        PanelAction::Delete => CreateInteractionResponse::Modal(embed::token_modal(
            ModalAction::Delete,
            "Delete token",
        )),
        PanelAction::Edit { field, token } => {
            CreateInteractionResponse::Modal(embed::edit_modal(field, &token))
        }
        PanelAction::ConfirmDelete { token } => {
            LicenseTokenService::new(db).delete(&token).await?;

            CreateInteractionResponse::UpdateMessage(
                CreateInteractionResponseMessage::new()
                    .content("Token deleted.")
                    .embeds(Vec::new())
                    .components(Vec::new()),
            )
        }
    };

    component.create_response(&ctx.http, response).await?;

    Ok(())
}
