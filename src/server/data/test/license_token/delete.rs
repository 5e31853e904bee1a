use super::*;

/// Tests deleting an existing token.
///
/// Expected: Ok(true) and the token can no longer be found
#[tokio::test]
async fn deletes_existing_token() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_license_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let stored = factory::create_license_token(db).await?;
    let other = factory::create_license_token(db).await?;
    let repo = LicenseTokenRepository::new(db);

    assert!(repo.delete(&stored.token).await?);
    assert!(repo.find_by_token(&stored.token).await?.is_none());
    assert!(repo.find_by_token(&other.token).await?.is_some());

    Ok(())
}

/// Tests deleting a token that does not exist.
///
/// Expected: Ok(false)
#[tokio::test]
async fn returns_false_for_unknown_token() -> Result<(), DbErr> {
    let test = TestBuilder::new().with_license_tables().build().await.unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = LicenseTokenRepository::new(db);

    assert!(!repo.delete("missing").await?);

    Ok(())
}
