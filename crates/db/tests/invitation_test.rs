//! Integration tests for invitation code redemption and regeneration.

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use uuid::Uuid;

use hearth_core::invite::InviteCodeError;
use hearth_db::entities::sea_orm_active_enums::MemberRole;
use hearth_db::migration::{Migrator, MigratorTrait};
use hearth_db::repositories::{CreateBookInput, MemberError};
use hearth_db::{BookRepository, MemberRepository, UserRepository};

async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).sqlx_logging(false);
    let db = Database::connect(options).await.expect("connect to sqlite");
    Migrator::up(&db, None).await.expect("run migrations");
    db
}

async fn create_user(db: &DatabaseConnection, name: &str) -> Uuid {
    let user = UserRepository::new(db.clone())
        .create(
            name,
            &format!("{}-{}@example.com", name, Uuid::new_v4()),
            "hash",
        )
        .await
        .expect("create user");
    user.id
}

async fn create_book(db: &DatabaseConnection, creator: Uuid) -> hearth_db::entities::books::Model {
    BookRepository::new(db.clone())
        .create_with_creator(
            creator,
            CreateBookInput {
                name: "Household".to_string(),
                description: None,
                currency: None,
                budget: None,
            },
        )
        .await
        .expect("create book")
}

#[tokio::test]
async fn test_redeem_code_joins_as_member() {
    let db = setup_db().await;
    let creator = create_user(&db, "alice").await;
    let joiner = create_user(&db, "bob").await;
    let book = create_book(&db, creator).await;

    let (joined_book, membership) = MemberRepository::new(db.clone())
        .redeem_code(&book.invitation_code, joiner)
        .await
        .expect("redeem code");

    assert_eq!(joined_book.id, book.id);
    assert_eq!(membership.user_id, joiner);
    assert_eq!(membership.role, MemberRole::Member);
}

#[tokio::test]
async fn test_redeem_is_case_insensitive() {
    let db = setup_db().await;
    let creator = create_user(&db, "alice").await;
    let joiner = create_user(&db, "bob").await;
    let book = create_book(&db, creator).await;

    let sloppy = format!("  {}  ", book.invitation_code.to_lowercase());
    let (joined_book, _) = MemberRepository::new(db.clone())
        .redeem_code(&sloppy, joiner)
        .await
        .expect("redeem lowercased code");

    assert_eq!(joined_book.id, book.id);
}

#[tokio::test]
async fn test_redeem_malformed_code() {
    let db = setup_db().await;
    let joiner = create_user(&db, "bob").await;
    let repo = MemberRepository::new(db.clone());

    let result = repo.redeem_code("ABC", joiner).await;
    assert!(matches!(
        result,
        Err(MemberError::CodeFormat(InviteCodeError::BadLength))
    ));

    // O is not in the code alphabet.
    let result = repo.redeem_code("ABCDEFGO", joiner).await;
    assert!(matches!(
        result,
        Err(MemberError::CodeFormat(InviteCodeError::BadCharacter))
    ));
}

#[tokio::test]
async fn test_redeem_unknown_code() {
    let db = setup_db().await;
    let joiner = create_user(&db, "bob").await;

    let result = MemberRepository::new(db.clone())
        .redeem_code("ABCDEFGH", joiner)
        .await;
    assert!(matches!(result, Err(MemberError::InvalidCode)));
}

#[tokio::test]
async fn test_redeem_twice_is_rejected() {
    let db = setup_db().await;
    let creator = create_user(&db, "alice").await;
    let joiner = create_user(&db, "bob").await;
    let book = create_book(&db, creator).await;
    let repo = MemberRepository::new(db.clone());

    repo.redeem_code(&book.invitation_code, joiner)
        .await
        .expect("first redeem");

    let result = repo.redeem_code(&book.invitation_code, joiner).await;
    assert!(matches!(result, Err(MemberError::AlreadyMember)));
}

#[tokio::test]
async fn test_creator_redeeming_own_code_is_rejected() {
    let db = setup_db().await;
    let creator = create_user(&db, "alice").await;
    let book = create_book(&db, creator).await;

    let result = MemberRepository::new(db.clone())
        .redeem_code(&book.invitation_code, creator)
        .await;
    assert!(matches!(result, Err(MemberError::AlreadyMember)));
}

#[tokio::test]
async fn test_regenerated_code_invalidates_old() {
    let db = setup_db().await;
    let creator = create_user(&db, "alice").await;
    let joiner = create_user(&db, "bob").await;
    let book = create_book(&db, creator).await;
    let old_code = book.invitation_code.clone();

    let regenerated = BookRepository::new(db.clone())
        .regenerate_code(book.id, creator)
        .await
        .expect("regenerate code");

    let members = MemberRepository::new(db.clone());

    // The stale code stops working the moment the new one is stored.
    let result = members.redeem_code(&old_code, joiner).await;
    assert!(matches!(result, Err(MemberError::InvalidCode)));

    let (joined_book, _) = members
        .redeem_code(&regenerated.invitation_code, joiner)
        .await
        .expect("redeem new code");
    assert_eq!(joined_book.id, book.id);
}
