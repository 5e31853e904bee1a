//! Modal input extraction and validation.

use std::{collections::HashMap, net::IpAddr};

use serenity::all::{ActionRow, ActionRowComponent};

use crate::server::error::AppError;

pub const INPUT_DISCORD_ID: &str = "discord_id";
pub const INPUT_CLIENT_IP: &str = "client_ip";
pub const INPUT_SCRIPT_NAME: &str = "script_name";
pub const INPUT_VALIDITY_DAYS: &str = "validity_days";
pub const INPUT_TOKEN: &str = "token";
pub const INPUT_VALUE: &str = "value";

/// Upper bound for validity, keeps expiration dates representable.
const MAX_VALIDITY_DAYS: u32 = 36_500;

/// Text input values of a submitted modal, keyed by input custom ID.
#[derive(Debug, Default)]
pub struct ModalForm {
    values: HashMap<String, String>,
}

impl ModalForm {
    pub fn from_components(rows: &[ActionRow]) -> Self {
        Self::from_pairs(
            rows.iter()
                .flat_map(|row| row.components.iter())
                .filter_map(|component| match component {
                    ActionRowComponent::InputText(input) => Some((
                        input.custom_id.clone(),
                        input.value.clone().unwrap_or_default(),
                    )),
                    _ => None,
                }),
        )
    }

    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Self {
            values: pairs.into_iter().collect(),
        }
    }

    /// Trimmed value of a required input.
    ///
    /// # Returns
    /// - `Ok(String)` - Non-blank value
    /// - `Err(AppError::BadRequest)` - Input missing or blank, naming `label`
    pub fn required(&self, input: &str, label: &str) -> Result<String, AppError> {
        self.values
            .get(input)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .ok_or_else(|| AppError::BadRequest(format!("{} is required.", label)))
    }
}

/// Parses a validity in days as a positive integer.
pub fn parse_validity_days(input: &str) -> Result<u32, AppError> {
    match input.trim().parse::<u32>() {
        Ok(days) if (1..=MAX_VALIDITY_DAYS).contains(&days) => Ok(days),
        _ => Err(AppError::BadRequest(format!(
            "Validity must be a whole number of days between 1 and {}.",
            MAX_VALIDITY_DAYS
        ))),
    }
}

/// Accepts a numeric Discord ID or a user mention such as `<@123>`.
pub fn parse_discord_id(input: &str) -> Result<String, AppError> {
    let trimmed = input.trim();
    let id = trimmed
        .strip_prefix("<@")
        .and_then(|rest| rest.strip_suffix('>'))
        .map(|rest| rest.trim_start_matches('!'))
        .unwrap_or(trimmed);

    if id.is_empty() || !id.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::BadRequest(
            "Discord ID must be a numeric user ID or a mention.".to_string(),
        ));
    }

    Ok(id.to_string())
}

/// Checks that the input is an IPv4 or IPv6 address and returns it trimmed.
pub fn parse_client_ip(input: &str) -> Result<String, AppError> {
    let trimmed = input.trim();
    trimmed
        .parse::<IpAddr>()
        .map(|_| trimmed.to_string())
        .map_err(|_| AppError::BadRequest(format!("'{}' is not a valid IP address.", trimmed)))
}
