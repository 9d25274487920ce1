//! User and token repository integration tests.
//!
//! Require a migrated PostgreSQL database at `DATABASE_URL`.

use smart_todo_db::test_fixtures::{create_test_user, setup_test_db};
use smart_todo_db::{Error, RegisterUserRequest, UpdateProfileRequest, UserRepository};

#[tokio::test]
#[ignore] // Requires database connection with migrations applied
async fn test_register_duplicate_username_conflicts() {
    let db = setup_test_db().await;
    let user = create_test_user(&db).await;

    let err = db
        .users
        .create(RegisterUserRequest {
            username: user.username.clone(),
            password: "another".to_string(),
            email: String::new(),
        })
        .await;
    assert!(matches!(err, Err(Error::Conflict(msg)) if msg == "Username already exists"));
}

#[tokio::test]
#[ignore] // Requires database connection with migrations applied
async fn test_authenticate_checks_password() {
    let db = setup_test_db().await;
    let user = create_test_user(&db).await;

    let ok = db
        .users
        .authenticate(&user.username, "test-password")
        .await
        .unwrap();
    assert_eq!(ok.map(|u| u.id), Some(user.id));

    let bad = db.users.authenticate(&user.username, "nope").await.unwrap();
    assert!(bad.is_none());
}

#[tokio::test]
#[ignore] // Requires database connection with migrations applied
async fn test_token_issue_validate_revoke() {
    let db = setup_test_db().await;
    let user = create_test_user(&db).await;

    let token = db.users.issue_token(user.id).await.unwrap();
    assert!(token.starts_with("st_tok_"));

    let resolved = db.users.validate_token(&token).await.unwrap();
    assert_eq!(resolved.map(|u| u.id), Some(user.id));

    assert!(db.users.revoke_token(&token).await.unwrap());
    assert!(db.users.validate_token(&token).await.unwrap().is_none());
    assert!(!db.users.revoke_token(&token).await.unwrap());
}

#[tokio::test]
#[ignore] // Requires database connection with migrations applied
async fn test_update_profile_changes_names_only() {
    let db = setup_test_db().await;
    let user = create_test_user(&db).await;

    let updated = db
        .users
        .update_profile(
            user.id,
            UpdateProfileRequest {
                first_name: Some("Ada".to_string()),
                last_name: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.first_name, "Ada");
    assert_eq!(updated.last_name, "");
    assert_eq!(updated.username, user.username);
}
