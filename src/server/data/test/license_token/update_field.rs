use super::*;

/// Tests updating each mutable column.
///
/// Expected: Ok(Some(LicenseRecord)) with only the targeted column changed
#[tokio::test]
async fn updates_single_columns() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_license_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let stored = factory::create_license_token(db).await?;
    let repo = LicenseTokenRepository::new(db);

    let record = repo
        .update_field(&stored.token, LicenseField::ClientIp("192.0.2.55".to_string()))
        .await?
        .unwrap();
    assert_eq!(record.client_ip, "192.0.2.55");
    assert_eq!(record.script_name, stored.script_name);
    assert_eq!(record.discord_id, stored.discord_id);

    let record = repo
        .update_field(&stored.token, LicenseField::ScriptName("garage".to_string()))
        .await?
        .unwrap();
    assert_eq!(record.script_name, "garage");
    assert_eq!(record.client_ip, "192.0.2.55");

    let record = repo
        .update_field(&stored.token, LicenseField::DiscordId("999".to_string()))
        .await?
        .unwrap();
    assert_eq!(record.discord_id, "999");

    Ok(())
}

/// Tests extending a token's expiration date.
///
/// Expected: Ok(Some(LicenseRecord)) with the new expiration and unchanged created_at
#[tokio::test]
async fn updates_expiration_date() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_license_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let stored = factory::create_expired_license_token(db).await?;
    let repo = LicenseTokenRepository::new(db);
    let new_expiration = Utc::now() + Duration::days(90);

    let record = repo
        .update_field(&stored.token, LicenseField::ExpirationDate(new_expiration))
        .await?
        .unwrap();

    assert_eq!(record.expiration_date, new_expiration);
    assert_eq!(record.created_at, stored.created_at);
    assert!(!record.is_expired(Utc::now()));

    Ok(())
}

/// Tests updating a token that does not exist.
///
/// Expected: Ok(None)
#[tokio::test]
async fn returns_none_for_unknown_token() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_license_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = LicenseTokenRepository::new(db);
    let result = repo
        .update_field("missing", LicenseField::ClientIp("10.0.0.1".to_string()))
        .await?;

    assert!(result.is_none());

    Ok(())
}
