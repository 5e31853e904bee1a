//! Embeds, button rows and modals shown by the admin bot.

use chrono::{DateTime, Utc};
use serenity::all::{
    ButtonStyle, CreateActionRow, CreateButton, CreateEmbed, CreateEmbedFooter, CreateInputText,
    CreateModal, InputTextStyle,
};

use crate::server::{
    bot::{
        action::{EditableField, ModalAction, PanelAction},
        form::{
            INPUT_CLIENT_IP, INPUT_DISCORD_ID, INPUT_SCRIPT_NAME, INPUT_TOKEN, INPUT_VALIDITY_DAYS,
            INPUT_VALUE,
        },
    },
    model::license::LicenseRecord,
};

const COLOR_PANEL: u32 = 0x5865F2;
const COLOR_OK: u32 = 0x57F287;
const COLOR_WARN: u32 = 0xFEE75C;
const COLOR_DANGER: u32 = 0xED4245;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M UTC";

pub fn panel_embed() -> CreateEmbed {
    CreateEmbed::new()
        .title("License token management")
        .description(
            "**Create** issues a token bound to one user, IP and script.\n\
             **Update** changes the owner, IP, script or validity of a token.\n\
             **Verify** shows the details and remaining time of a token.\n\
             **Delete** revokes a token.",
        )
        .colour(COLOR_PANEL)
        .footer(CreateEmbedFooter::new("Administrators only"))
}

pub fn panel_buttons() -> Vec<CreateActionRow> {
    vec![CreateActionRow::Buttons(vec![
        CreateButton::new(PanelAction::Create.to_string())
            .label("Create")
            .style(ButtonStyle::Success),
        CreateButton::new(PanelAction::Update.to_string())
            .label("Update")
            .style(ButtonStyle::Primary),
        CreateButton::new(PanelAction::Verify.to_string())
            .label("Verify")
            .style(ButtonStyle::Secondary),
        CreateButton::new(PanelAction::Delete.to_string())
            .label("Delete")
            .style(ButtonStyle::Danger),
    ])]
}

/// Describes the expiration of a record relative to `now`.
pub fn expiry_summary(record: &LicenseRecord, now: DateTime<Utc>) -> String {
    let date = record.expiration_date.format(DATE_FORMAT);

    if record.is_expired(now) {
        return format!("{} (expired)", date);
    }

    match record.days_remaining(now) {
        1 => format!("{} (1 day remaining)", date),
        days => format!("{} ({} days remaining)", date, days),
    }
}

/// Details of a token, colored by whether it is still valid.
pub fn token_embed(title: &str, record: &LicenseRecord, now: DateTime<Utc>) -> CreateEmbed {
    let colour = if record.is_expired(now) {
        COLOR_WARN
    } else {
        COLOR_OK
    };

    CreateEmbed::new()
        .title(title)
        .colour(colour)
        .field("Token", format!("`{}`", record.token), false)
        .field("Discord ID", format!("<@{}> ({})", record.discord_id, record.discord_id), true)
        .field("Client IP", &record.client_ip, true)
        .field("Script", &record.script_name, true)
        .field("Created", record.created_at.format(DATE_FORMAT).to_string(), true)
        .field("Expires", expiry_summary(record, now), true)
}

pub fn delete_confirmation_embed(record: &LicenseRecord, now: DateTime<Utc>) -> CreateEmbed {
    token_embed("Delete this token?", record, now)
        .colour(COLOR_DANGER)
        .description("The script stops verifying immediately. This cannot be undone.")
}

pub fn edit_buttons(token: &str) -> Vec<CreateActionRow> {
    let buttons = EditableField::ALL
        .into_iter()
        .map(|field| {
            CreateButton::new(
                PanelAction::Edit {
                    field,
                    token: token.to_string(),
                }
                .to_string(),
            )
            .label(field.label())
            .style(ButtonStyle::Secondary)
        })
        .collect();

    vec![CreateActionRow::Buttons(buttons)]
}

pub fn confirm_delete_buttons(token: &str) -> Vec<CreateActionRow> {
    vec![CreateActionRow::Buttons(vec![CreateButton::new(
        PanelAction::ConfirmDelete {
            token: token.to_string(),
        }
        .to_string(),
    )
    .label("Confirm delete")
    .style(ButtonStyle::Danger)])]
}

fn short_input(label: &str, custom_id: &str, placeholder: &str) -> CreateActionRow {
    CreateActionRow::InputText(
        CreateInputText::new(InputTextStyle::Short, label, custom_id)
            .placeholder(placeholder)
            .required(true),
    )
}

pub fn create_modal() -> CreateModal {
    CreateModal::new(ModalAction::Create.to_string(), "Create token").components(vec![
        short_input("Discord ID", INPUT_DISCORD_ID, "123456789012345678"),
        short_input("Client IP", INPUT_CLIENT_IP, "203.0.113.10"),
        short_input("Script name", INPUT_SCRIPT_NAME, "my-script"),
        short_input("Validity (days)", INPUT_VALIDITY_DAYS, "30"),
    ])
}

/// Single token prompt used by the verify, update and delete flows.
pub fn token_modal(action: ModalAction, title: &str) -> CreateModal {
    CreateModal::new(action.to_string(), title).components(vec![short_input(
        "Token",
        INPUT_TOKEN,
        "32 character token",
    )])
}

pub fn edit_modal(field: EditableField, token: &str) -> CreateModal {
    let placeholder = match field {
        EditableField::DiscordId => "123456789012345678",
        EditableField::ClientIp => "203.0.113.10",
        EditableField::ScriptName => "my-script",
        EditableField::Validity => "30",
    };

    CreateModal::new(
        ModalAction::Edit {
            field,
            token: token.to_string(),
        }
        .to_string(),
        format!("Update {}", field.label().to_lowercase()),
    )
    .components(vec![short_input(field.label(), INPUT_VALUE, placeholder)])
}
