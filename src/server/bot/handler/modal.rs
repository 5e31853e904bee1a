//! Modal submissions.

use chrono::Utc;
use sea_orm::DatabaseConnection;
use serenity::all::{
    Context, CreateInteractionResponse, CreateInteractionResponseMessage, ModalInteraction,
};

use crate::server::{
    bot::{
        action::{EditableField, ModalAction},
        embed,
        form::{
            parse_client_ip, parse_discord_id, parse_validity_days, ModalForm, INPUT_CLIENT_IP,
            INPUT_DISCORD_ID, INPUT_SCRIPT_NAME, INPUT_TOKEN, INPUT_VALIDITY_DAYS, INPUT_VALUE,
        },
        handler::interaction,
    },
    error::AppError,
    model::license::{IssueLicenseParam, LicenseField},
    service::license_token::LicenseTokenService,
};

const TOKEN_NOT_FOUND: &str = "Token not found.";

/// Handles a modal submission and answers ephemerally.
pub async fn handle_modal(
    db: &DatabaseConnection,
    ctx: &Context,
    modal: &ModalInteraction,
) -> Result<(), AppError> {
    let action: ModalAction = modal
        .data
        .custom_id
        .parse()
        .map_err(|e| AppError::InternalError(format!("{}", e)))?;

    if !interaction::is_administrator(modal.member.as_ref()) {
        modal
            .create_response(&ctx.http, interaction::refusal())
            .await?;
        return Ok(());
    }

    let form = ModalForm::from_components(&modal.data.components);
    let message = build_reply(db, action, &form).await?;

    modal
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Message(message.ephemeral(true)),
        )
        .await?;

    Ok(())
}

async fn build_reply(
    db: &DatabaseConnection,
    action: ModalAction,
    form: &ModalForm,
) -> Result<CreateInteractionResponseMessage, AppError> {
    let service = LicenseTokenService::new(db);
    let now = Utc::now();
    let reply = CreateInteractionResponseMessage::new();

    let reply = match action {
        ModalAction::Create => {
            let param = IssueLicenseParam {
                discord_id: parse_discord_id(&form.required(INPUT_DISCORD_ID, "Discord ID")?)?,
                client_ip: parse_client_ip(&form.required(INPUT_CLIENT_IP, "Client IP")?)?,
                script_name: form.required(INPUT_SCRIPT_NAME, "Script name")?,
                validity_days: parse_validity_days(
                    &form.required(INPUT_VALIDITY_DAYS, "Validity")?,
                )?,
            };
            let record = service.issue(param).await?;

            reply
                .content("Token created. Share it with the script owner only.")
                .embed(embed::token_embed("Token created", &record, now))
        }
        ModalAction::Verify => {
            let token = form.required(INPUT_TOKEN, "Token")?;
            match service.get(&token).await? {
                Some(record) => reply.embed(embed::token_embed("Token details", &record, now)),
                None => reply.content(TOKEN_NOT_FOUND),
            }
        }
        ModalAction::Update => {
            let token = form.required(INPUT_TOKEN, "Token")?;
            match service.get(&token).await? {
                Some(record) => reply
                    .content("Choose what to update.")
                    .embed(embed::token_embed("Token details", &record, now))
                    .components(embed::edit_buttons(&record.token)),
                None => reply.content(TOKEN_NOT_FOUND),
            }
        }
        ModalAction::Delete => {
            let token = form.required(INPUT_TOKEN, "Token")?;
            match service.get(&token).await? {
                Some(record) => reply
                    .embed(embed::delete_confirmation_embed(&record, now))
                    .components(embed::confirm_delete_buttons(&record.token)),
                None => reply.content(TOKEN_NOT_FOUND),
            }
        }
        ModalAction::Edit { field, token } => {
            let value = form.required(INPUT_VALUE, field.label())?;
            let record = match field {
                EditableField::DiscordId => {
                    let discord_id = parse_discord_id(&value)?;
                    service
                        .update_field(&token, LicenseField::DiscordId(discord_id))
                        .await?
                }
                EditableField::ClientIp => {
                    let client_ip = parse_client_ip(&value)?;
                    service
                        .update_field(&token, LicenseField::ClientIp(client_ip))
                        .await?
                }
                EditableField::ScriptName => {
                    service
                        .update_field(&token, LicenseField::ScriptName(value))
                        .await?
                }
                EditableField::Validity => {
                    service.extend(&token, parse_validity_days(&value)?).await?
                }
            };

            reply.embed(embed::token_embed("Token updated", &record, now))
        }
    };

    Ok(reply)
}

#[cfg(test)]
mod tests {
    use serde_json::Value;
    use test_utils::{builder::TestBuilder, factory};

    use super::*;

    fn form(pairs: &[(&str, &str)]) -> ModalForm {
        ModalForm::from_pairs(
            pairs
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_string())),
        )
    }

    fn json(reply: CreateInteractionResponseMessage) -> Value {
        serde_json::to_value(reply).unwrap()
    }

    #[tokio::test]
    async fn create_issues_token() -> Result<(), AppError> {
        let test = TestBuilder::new().with_license_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();

        let reply = build_reply(
            db,
            ModalAction::Create,
            &form(&[
                (INPUT_DISCORD_ID, "<@42>"),
                (INPUT_CLIENT_IP, "203.0.113.4"),
                (INPUT_SCRIPT_NAME, "garage"),
                (INPUT_VALIDITY_DAYS, "14"),
            ]),
        )
        .await?;

        let reply = json(reply);
        let token_field = &reply["embeds"][0]["fields"][0]["value"];
        let token = token_field.as_str().unwrap().trim_matches('`').to_string();
        let record = LicenseTokenService::new(db).get(&token).await?.unwrap();
        assert_eq!(record.discord_id, "42");
        assert_eq!(record.client_ip, "203.0.113.4");
        assert_eq!(record.days_remaining(Utc::now()), 14);
        Ok(())
    }

    #[tokio::test]
    async fn create_rejects_bad_validity() -> Result<(), AppError> {
        let test = TestBuilder::new().with_license_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();

        let result = build_reply(
            db,
            ModalAction::Create,
            &form(&[
                (INPUT_DISCORD_ID, "42"),
                (INPUT_CLIENT_IP, "203.0.113.4"),
                (INPUT_SCRIPT_NAME, "garage"),
                (INPUT_VALIDITY_DAYS, "0"),
            ]),
        )
        .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
        Ok(())
    }

    #[tokio::test]
    async fn lookups_report_unknown_tokens() -> Result<(), AppError> {
        let test = TestBuilder::new().with_license_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();

        for action in [ModalAction::Verify, ModalAction::Update, ModalAction::Delete] {
            let reply = build_reply(db, action, &form(&[(INPUT_TOKEN, "missing")])).await?;
            assert_eq!(json(reply)["content"], TOKEN_NOT_FOUND);
        }
        Ok(())
    }

    #[tokio::test]
    async fn delete_prompt_offers_confirmation() -> Result<(), AppError> {
        let test = TestBuilder::new().with_license_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let stored = factory::create_license_token(db).await?;

        let reply = build_reply(db, ModalAction::Delete, &form(&[(INPUT_TOKEN, &stored.token)])).await?;

        let reply = json(reply);
        assert_eq!(
            reply["components"][0]["components"][0]["custom_id"],
            format!("confirm_delete:{}", stored.token)
        );
        assert!(LicenseTokenService::new(db).get(&stored.token).await?.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn edit_updates_single_field() -> Result<(), AppError> {
        let test = TestBuilder::new().with_license_tables().build().await.unwrap();
        let db = test.db.as_ref().unwrap();
        let stored = factory::create_expired_license_token(db).await?;

        let ip_reply = build_reply(
            db,
            ModalAction::Edit {
                field: EditableField::ClientIp,
                token: stored.token.clone(),
            },
            &form(&[(INPUT_VALUE, "198.51.100.8")]),
        )
        .await?;
        let validity_reply = build_reply(
            db,
            ModalAction::Edit {
                field: EditableField::Validity,
                token: stored.token.clone(),
            },
            &form(&[(INPUT_VALUE, "5")]),
        )
        .await?;

        assert_eq!(json(ip_reply)["embeds"][0]["title"], "Token updated");
        assert_eq!(json(validity_reply)["embeds"][0]["title"], "Token updated");

        let record = LicenseTokenService::new(db).get(&stored.token).await?.unwrap();
        assert_eq!(record.client_ip, "198.51.100.8");
        assert_eq!(record.script_name, stored.script_name);
        assert_eq!(record.days_remaining(Utc::now()), 5);
        Ok(())
    }
}
