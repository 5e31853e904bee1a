use super::*;

/// Tests finding an existing token.
///
/// Expected: Ok(Some(LicenseRecord)) matching the stored row
#[tokio::test]
async fn finds_existing_token() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_license_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let stored = factory::license_token::LicenseTokenFactory::new(db)
        .client_ip("198.51.100.1")
        .script_name("garage")
        .build()
        .await?;

    let repo = LicenseTokenRepository::new(db);
    let record = repo.find_by_token(&stored.token).await?.unwrap();

    assert_eq!(record.token, stored.token);
    assert_eq!(record.client_ip, "198.51.100.1");
    assert_eq!(record.script_name, "garage");
    assert_eq!(record.expiration_date, stored.expiration_date);

    Ok(())
}

/// Tests querying a token that was never issued.
///
/// Expected: Ok(None)
#[tokio::test]
async fn returns_none_for_unknown_token() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_license_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    factory::create_license_token(db).await?;

    let repo = LicenseTokenRepository::new(db);
    let record = repo.find_by_token("does-not-exist").await?;

    assert!(record.is_none());

    Ok(())
}

/// Tests that lookups are exact matches.
///
/// Expected: Ok(None) for a prefix of a stored token
#[tokio::test]
async fn does_not_match_token_prefix() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_license_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let stored = factory::create_license_token(db).await?;

    let repo = LicenseTokenRepository::new(db);
    let record = repo.find_by_token(&stored.token[..10]).await?;

    assert!(record.is_none());

    Ok(())
}
