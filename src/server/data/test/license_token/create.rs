use super::*;

/// Tests inserting a new token.
///
/// Expected: Ok(LicenseRecord) carrying every bound value and a fresh created_at
#[tokio::test]
async fn creates_token() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_license_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = LicenseTokenRepository::new(db);
    let expiration_date = Utc::now() + Duration::days(30);
    let before = Utc::now();

    let record = repo
        .create(CreateLicenseTokenParam {
            token: "a1b2c3".to_string(),
            discord_id: "123456789".to_string(),
            client_ip: "203.0.113.10".to_string(),
            script_name: "garage".to_string(),
            expiration_date,
        })
        .await?;

    assert_eq!(record.token, "a1b2c3");
    assert_eq!(record.discord_id, "123456789");
    assert_eq!(record.client_ip, "203.0.113.10");
    assert_eq!(record.script_name, "garage");
    assert_eq!(record.expiration_date, expiration_date);
    assert!(record.created_at >= before);

    Ok(())
}

/// Tests that token strings are unique.
///
/// Expected: Err(DbErr) when inserting a duplicate token
#[tokio::test]
async fn rejects_duplicate_token() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_license_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let existing = factory::create_license_token(db).await?;
    let repo = LicenseTokenRepository::new(db);

    let result = repo
        .create(CreateLicenseTokenParam {
            token: existing.token,
            discord_id: "1".to_string(),
            client_ip: "127.0.0.1".to_string(),
            script_name: "other".to_string(),
            expiration_date: Utc::now(),
        })
        .await;

    assert!(result.is_err());

    Ok(())
}
