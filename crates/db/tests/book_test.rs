//! Integration tests for the book repository.

use sea_orm::{ConnectOptions, Database, DatabaseConnection, EntityTrait, PaginatorTrait};
use uuid::Uuid;

use hearth_core::policy::PolicyError;
use hearth_db::entities::{book_members, sea_orm_active_enums::MemberRole};
use hearth_db::migration::{Migrator, MigratorTrait};
use hearth_db::repositories::{BookError, BookRepository, CreateBookInput, UpdateBookInput};
use hearth_db::UserRepository;

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

fn book_input(name: &str) -> CreateBookInput {
    CreateBookInput {
        name: name.to_string(),
        description: None,
        currency: None,
        budget: None,
    }
}

#[tokio::test]
async fn test_create_book_creates_creator_membership() {
    let db = setup_db().await;
    let creator = create_user(&db, "alice").await;
    let repo = BookRepository::new(db.clone());

    let book = repo
        .create_with_creator(creator, book_input("Household"))
        .await
        .expect("create book");

    assert_eq!(book.name, "Household");
    assert_eq!(book.creator_id, creator);
    assert_eq!(book.currency, "IDR");
    assert_eq!(book.invitation_code.len(), 8);

    let (found, role) = repo
        .find_for_member(book.id, creator)
        .await
        .expect("creator is a member");
    assert_eq!(found.id, book.id);
    assert_eq!(role, MemberRole::Creator);
}

#[tokio::test]
async fn test_create_book_validation() {
    let db = setup_db().await;
    let creator = create_user(&db, "alice").await;
    let repo = BookRepository::new(db.clone());

    let result = repo.create_with_creator(creator, book_input("   ")).await;
    assert!(matches!(result, Err(BookError::EmptyName)));

    let mut input = book_input("Household");
    input.budget = Some(0);
    let result = repo.create_with_creator(creator, input).await;
    assert!(matches!(result, Err(BookError::InvalidBudget)));

    let mut input = book_input("Household");
    input.currency = Some("XYZ".to_string());
    let result = repo.create_with_creator(creator, input).await;
    assert!(matches!(result, Err(BookError::InvalidCurrency(_))));
}

#[tokio::test]
async fn test_list_for_user_returns_only_own_books() {
    let db = setup_db().await;
    let alice = create_user(&db, "alice").await;
    let bob = create_user(&db, "bob").await;
    let repo = BookRepository::new(db.clone());

    repo.create_with_creator(alice, book_input("Alice's book"))
        .await
        .expect("create book");
    repo.create_with_creator(bob, book_input("Bob's book"))
        .await
        .expect("create book");

    let books = repo.list_for_user(alice).await.expect("list books");
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].0.name, "Alice's book");
    assert_eq!(books[0].1, MemberRole::Creator);
}

#[tokio::test]
async fn test_non_member_cannot_view_book() {
    let db = setup_db().await;
    let alice = create_user(&db, "alice").await;
    let stranger = create_user(&db, "mallory").await;
    let repo = BookRepository::new(db.clone());

    let book = repo
        .create_with_creator(alice, book_input("Household"))
        .await
        .expect("create book");

    let result = repo.find_for_member(book.id, stranger).await;
    assert!(matches!(
        result,
        Err(BookError::Policy(PolicyError::NotMember))
    ));
}

#[tokio::test]
async fn test_update_book_settings() {
    let db = setup_db().await;
    let alice = create_user(&db, "alice").await;
    let repo = BookRepository::new(db.clone());

    let book = repo
        .create_with_creator(alice, book_input("Household"))
        .await
        .expect("create book");

    let updated = repo
        .update(
            book.id,
            alice,
            UpdateBookInput {
                name: Some("Family budget".to_string()),
                description: Some(Some("Monthly expenses".to_string())),
                budget: Some(Some(1_000_000)),
            },
        )
        .await
        .expect("update book");

    assert_eq!(updated.name, "Family budget");
    assert_eq!(updated.description.as_deref(), Some("Monthly expenses"));
    assert_eq!(updated.budget, Some(1_000_000));

    // Clearing the budget is distinct from leaving it untouched.
    let cleared = repo
        .update(
            book.id,
            alice,
            UpdateBookInput {
                budget: Some(None),
                ..Default::default()
            },
        )
        .await
        .expect("clear budget");
    assert_eq!(cleared.budget, None);
}

#[tokio::test]
async fn test_update_rejects_nonpositive_budget() {
    let db = setup_db().await;
    let alice = create_user(&db, "alice").await;
    let repo = BookRepository::new(db.clone());

    let book = repo
        .create_with_creator(alice, book_input("Household"))
        .await
        .expect("create book");

    let result = repo
        .update(
            book.id,
            alice,
            UpdateBookInput {
                budget: Some(Some(-5)),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(BookError::InvalidBudget)));
}

#[tokio::test]
async fn test_delete_book_cascades_memberships() {
    let db = setup_db().await;
    let alice = create_user(&db, "alice").await;
    let repo = BookRepository::new(db.clone());

    let book = repo
        .create_with_creator(alice, book_input("Household"))
        .await
        .expect("create book");

    repo.delete(book.id, alice).await.expect("delete book");

    let result = repo.find_for_member(book.id, alice).await;
    assert!(matches!(result, Err(BookError::NotFound(_))));

    let remaining = book_members::Entity::find()
        .count(&db)
        .await
        .expect("count memberships");
    assert_eq!(remaining, 0);
}

#[tokio::test]
async fn test_regenerate_code_replaces_code() {
    let db = setup_db().await;
    let alice = create_user(&db, "alice").await;
    let repo = BookRepository::new(db.clone());

    let book = repo
        .create_with_creator(alice, book_input("Household"))
        .await
        .expect("create book");
    let old_code = book.invitation_code.clone();

    let regenerated = repo
        .regenerate_code(book.id, alice)
        .await
        .expect("regenerate code");

    assert_ne!(regenerated.invitation_code, old_code);
    assert_eq!(regenerated.invitation_code.len(), 8);
}
