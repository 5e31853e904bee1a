//! Typed custom IDs for panel buttons and modals.
//!
//! Discord echoes a component's `custom_id` back on every interaction. Buttons use
//! `<action>` or `<action>:<token>`; modals use the same shape with a `modal_` prefix.

use std::{fmt, str::FromStr};

use thiserror::Error;

const MODAL_PREFIX: &str = "modal_";
const EDIT_PREFIX: &str = "edit_";
const CONFIRM_DELETE: &str = "confirm_delete";

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown interaction id '{0}'")]
pub struct UnknownCustomId(pub String);

/// A single column an operator can change from the update panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditableField {
    DiscordId,
    ClientIp,
    ScriptName,
    /// New validity in days counted from now.
    Validity,
}

impl EditableField {
    pub const ALL: [EditableField; 4] = [
        EditableField::DiscordId,
        EditableField::ClientIp,
        EditableField::ScriptName,
        EditableField::Validity,
    ];

    fn key(self) -> &'static str {
        match self {
            Self::DiscordId => "discord_id",
            Self::ClientIp => "client_ip",
            Self::ScriptName => "script_name",
            Self::Validity => "validity",
        }
    }

    fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.key() == key)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::DiscordId => "Discord ID",
            Self::ClientIp => "Client IP",
            Self::ScriptName => "Script name",
            Self::Validity => "Validity (days from now)",
        }
    }
}

/// Button clicks on the panel and on token embeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelAction {
    Create,
    Verify,
    Update,
    Delete,
    Edit { field: EditableField, token: String },
    ConfirmDelete { token: String },
}

/// Modal submissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalAction {
    Create,
    Verify,
    Update,
    Delete,
    Edit { field: EditableField, token: String },
}

impl fmt::Display for PanelAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => f.write_str("create"),
            Self::Verify => f.write_str("verify"),
            Self::Update => f.write_str("update"),
            Self::Delete => f.write_str("delete"),
            Self::Edit { field, token } => write!(f, "{}{}:{}", EDIT_PREFIX, field.key(), token),
            Self::ConfirmDelete { token } => write!(f, "{}:{}", CONFIRM_DELETE, token),
        }
    }
}

impl FromStr for PanelAction {
    type Err = UnknownCustomId;

    fn from_str(custom_id: &str) -> Result<Self, Self::Err> {
        let unknown = || UnknownCustomId(custom_id.to_string());

        match split_token(custom_id) {
            ("create", None) => Ok(Self::Create),
            ("verify", None) => Ok(Self::Verify),
            ("update", None) => Ok(Self::Update),
            ("delete", None) => Ok(Self::Delete),
            (CONFIRM_DELETE, Some(token)) => Ok(Self::ConfirmDelete {
                token: token.to_string(),
            }),
            (action, Some(token)) => {
                let field = parse_edit(action).ok_or_else(unknown)?;
                Ok(Self::Edit {
                    field,
                    token: token.to_string(),
                })
            }
            _ => Err(unknown()),
        }
    }
}

impl fmt::Display for ModalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(MODAL_PREFIX)?;
        match self {
            Self::Create => f.write_str("create"),
            Self::Verify => f.write_str("verify"),
            Self::Update => f.write_str("update"),
            Self::Delete => f.write_str("delete"),
            Self::Edit { field, token } => write!(f, "{}{}:{}", EDIT_PREFIX, field.key(), token),
        }
    }
}

impl FromStr for ModalAction {
    type Err = UnknownCustomId;

    fn from_str(custom_id: &str) -> Result<Self, Self::Err> {
        let unknown = || UnknownCustomId(custom_id.to_string());
        let rest = custom_id.strip_prefix(MODAL_PREFIX).ok_or_else(unknown)?;

        match split_token(rest) {
            ("create", None) => Ok(Self::Create),
            ("verify", None) => Ok(Self::Verify),
            ("update", None) => Ok(Self::Update),
            ("delete", None) => Ok(Self::Delete),
            (action, Some(token)) => {
                let field = parse_edit(action).ok_or_else(unknown)?;
                Ok(Self::Edit {
                    field,
                    token: token.to_string(),
                })
            }
            _ => Err(unknown()),
        }
    }
}

/// Splits `action:token`; an empty token counts as absent.
fn split_token(custom_id: &str) -> (&str, Option<&str>) {
    match custom_id.split_once(':') {
        Some((action, token)) if !token.is_empty() => (action, Some(token)),
        Some((action, _)) => (action, None),
        None => (custom_id, None),
    }
}

fn parse_edit(action: &str) -> Option<EditableField> {
    action
        .strip_prefix(EDIT_PREFIX)
        .and_then(EditableField::from_key)
}
