use crate::server::{
    data::license_token::LicenseTokenRepository,
    model::license::{CreateLicenseTokenParam, LicenseField},
};
use chrono::{Duration, Utc};
use sea_orm::DbErr;
use test_utils::{builder::TestBuilder, factory};

mod create;
mod delete;
mod find_by_token;
mod update_field;
