mod common;

use bookstore_seaorm_core::entity::account::{self, AccountStatus};
use bookstore_seaorm_core::entity::password_reset;
use bookstore_seaorm_core::entity::RecordState;
use bookstore_seaorm_core::{Error, Principal, Token, TokenAuthority, TOKEN_LEN};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use common::{insert_account, setup_db};

#[tokio::test]
async fn issued_login_token_resolves_to_its_account() {
    let db = setup_db().await;
    insert_account(&db, 7, "reader@example.com").await;
    let authority = TokenAuthority::new(db);

    let token = authority
        .issue_login_token(7, &["127.0.0.1", "50000"])
        .await
        .unwrap();

    assert_eq!(token.as_str().len(), TOKEN_LEN);
    assert_eq!(
        authority.resolve_login_token(token.as_str()).await.unwrap(),
        Some(7)
    );
}

#[tokio::test]
async fn second_login_invalidates_the_first() {
    let db = setup_db().await;
    insert_account(&db, 7, "reader@example.com").await;
    let authority = TokenAuthority::new(db);

    let first = authority.issue_login_token(7, &["a"]).await.unwrap();
    let second = authority.issue_login_token(7, &["a"]).await.unwrap();

    assert_eq!(authority.resolve_login_token(first.as_str()).await.unwrap(), None);
    assert_eq!(
        authority.resolve_login_token(second.as_str()).await.unwrap(),
        Some(7)
    );
}

#[tokio::test]
async fn login_token_for_unknown_account_is_not_found() {
    let db = setup_db().await;
    let authority = TokenAuthority::new(db);

    let result = authority.bind_login_token(99, &Token::from("orphan")).await;

    assert!(matches!(result, Err(Error::NotFound)));
}

#[tokio::test]
async fn unknown_and_empty_login_tokens_resolve_to_none() {
    let db = setup_db().await;
    insert_account(&db, 7, "reader@example.com").await;
    let authority = TokenAuthority::new(db);

    assert_eq!(authority.resolve_login_token("nope").await.unwrap(), None);
    // accounts without a session have a NULL token, which must not match ""
    assert_eq!(authority.resolve_login_token("").await.unwrap(), None);
}

#[tokio::test]
async fn logout_clears_the_binding() {
    let db = setup_db().await;
    insert_account(&db, 7, "reader@example.com").await;
    let authority = TokenAuthority::new(db);
    let token = authority.issue_login_token(7, &[]).await.unwrap();

    authority.logout(7).await.unwrap();

    assert_eq!(authority.resolve_login_token(token.as_str()).await.unwrap(), None);
}

#[tokio::test]
async fn authenticate_reads_the_bearer_header() {
    let db = setup_db().await;
    insert_account(&db, 7, "reader@example.com").await;
    let authority = TokenAuthority::new(db);
    authority
        .bind_login_token(7, &Token::from("xyz"))
        .await
        .unwrap();

    assert_eq!(
        authority.authenticate("Bearer xyz").await.unwrap(),
        Principal { account_id: 7 }
    );
    assert!(matches!(
        authority.authenticate("xyz").await,
        Err(Error::NotFound)
    ));
    assert!(matches!(authority.authenticate("").await, Err(Error::NotFound)));
    assert!(matches!(
        authority.authenticate("Bearer other").await,
        Err(Error::NotFound)
    ));
}

#[tokio::test]
async fn second_reset_token_supersedes_the_first() {
    let db = setup_db().await;
    insert_account(&db, 42, "reader@example.com").await;
    let authority = TokenAuthority::new(db);

    authority
        .bind_reset_token(42, &Token::from("abc123"))
        .await
        .unwrap();
    authority
        .bind_reset_token(42, &Token::from("def456"))
        .await
        .unwrap();

    assert!(matches!(
        authority.resolve_reset_token("abc123").await,
        Err(Error::NotFound)
    ));
    assert_eq!(authority.resolve_reset_token("def456").await.unwrap(), 42);
}

#[tokio::test]
async fn superseded_reset_rows_are_kept() {
    let db = setup_db().await;
    insert_account(&db, 42, "reader@example.com").await;
    let authority = TokenAuthority::new(db.clone());

    authority.issue_reset_token(42, &["first"]).await.unwrap();
    authority.issue_reset_token(42, &["second"]).await.unwrap();
    authority.issue_reset_token(42, &["third"]).await.unwrap();

    let rows = password_reset::Entity::find()
        .filter(password_reset::Column::AccountId.eq(42))
        .order_by_asc(password_reset::Column::Id)
        .all(&db)
        .await
        .unwrap();
    let states: Vec<_> = rows.iter().map(|row| row.state).collect();

    assert_eq!(
        states,
        vec![
            RecordState::Superseded,
            RecordState::Superseded,
            RecordState::Active
        ]
    );
}

#[tokio::test]
async fn reset_tokens_of_other_accounts_are_untouched() {
    let db = setup_db().await;
    insert_account(&db, 1, "one@example.com").await;
    insert_account(&db, 2, "two@example.com").await;
    let authority = TokenAuthority::new(db);

    let one = authority.issue_reset_token(1, &[]).await.unwrap();
    authority.issue_reset_token(2, &[]).await.unwrap();

    assert_eq!(authority.resolve_reset_token(one.as_str()).await.unwrap(), 1);
}

#[tokio::test]
async fn reset_token_for_unknown_account_is_not_found() {
    let db = setup_db().await;
    let authority = TokenAuthority::new(db);

    assert!(matches!(
        authority.issue_reset_token(404, &[]).await,
        Err(Error::NotFound)
    ));
    assert!(matches!(
        authority.resolve_reset_token("").await,
        Err(Error::NotFound)
    ));
}

#[tokio::test]
async fn activation_is_single_use() {
    let db = setup_db().await;
    let pending = insert_account(&db, 5, "new@example.com").await;
    let mut model: account::ActiveModel = pending.into();
    model.status = Set(AccountStatus::Pending);
    model.activation_token = Set(Some("activate-me".to_owned()));
    model.update(&db).await.unwrap();
    let authority = TokenAuthority::new(db.clone());

    assert!(authority.is_activation_pending("activate-me").await.unwrap());
    assert_eq!(authority.activate("activate-me").await.unwrap(), 5);
    assert!(matches!(
        authority.activate("activate-me").await,
        Err(Error::NotFound)
    ));
    assert!(!authority.is_activation_pending("activate-me").await.unwrap());

    let account = account::Entity::find_by_id(5).one(&db).await.unwrap().unwrap();
    assert_eq!(account.status, AccountStatus::Active);
    assert_eq!(account.activation_token, None);
}

#[tokio::test]
async fn unknown_activation_token_fails_like_a_used_one() {
    let db = setup_db().await;
    let authority = TokenAuthority::new(db);

    assert!(matches!(
        authority.activate("never-issued").await,
        Err(Error::NotFound)
    ));
    assert!(matches!(authority.activate("").await, Err(Error::NotFound)));
}

#[tokio::test]
async fn login_token_cannot_be_shared_between_accounts() {
    let db = setup_db().await;
    insert_account(&db, 1, "one@example.com").await;
    insert_account(&db, 2, "two@example.com").await;
    let authority = TokenAuthority::new(db);

    authority
        .bind_login_token(1, &Token::from("shared"))
        .await
        .unwrap();
    let second = authority.bind_login_token(2, &Token::from("shared")).await;

    assert!(matches!(second, Err(Error::Validation(_))));
    assert_eq!(authority.resolve_login_token("shared").await.unwrap(), Some(1));
}

#[tokio::test]
async fn reset_token_cannot_be_shared_between_accounts() {
    let db = setup_db().await;
    insert_account(&db, 1, "one@example.com").await;
    insert_account(&db, 2, "two@example.com").await;
    let authority = TokenAuthority::new(db);
    let own = authority.issue_reset_token(2, &[]).await.unwrap();

    authority
        .bind_reset_token(1, &Token::from("dup"))
        .await
        .unwrap();
    let second = authority.bind_reset_token(2, &Token::from("dup")).await;

    assert!(matches!(second, Err(Error::Validation(_))));
    assert_eq!(authority.resolve_reset_token("dup").await.unwrap(), 1);
    // the rejected bind rolled back, so account 2 keeps its live token
    assert_eq!(authority.resolve_reset_token(own.as_str()).await.unwrap(), 2);
}
