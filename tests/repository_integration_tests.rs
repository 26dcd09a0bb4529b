//! Runs against a real Postgres. Point `DATABASE_URL` at a disposable database
//! and run with `--ignored`; the tests drop and recreate the `drinks` table.

use coffee_shop::{
    models::{DrinkChanges, Ingredient, NewDrink},
    repository::{PostgresRepository, Repository, RepositoryError},
};
use serial_test::serial;
use sqlx::PgPool;

// --- Test Context and Setup ---

struct DbTestContext {
    pool: PgPool,
}

impl DbTestContext {
    async fn setup() -> Self {
        dotenv::dotenv().ok();

        let db_url = std::env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set to run integration tests");

        let pool = PgPool::connect(&db_url)
            .await
            .expect("Failed to connect to database for integration tests.");

        DbTestContext { pool }
    }

    /// Fresh table holding only the seeded `water` drink.
    async fn seeded_repository(&self) -> PostgresRepository {
        let repo = PostgresRepository::new(self.pool.clone());
        repo.reset().await.expect("Failed to reset drinks table.");
        repo
    }
}

fn cocoa() -> NewDrink {
    NewDrink {
        title: "Cocoa".to_string(),
        recipe: vec![
            Ingredient {
                name: "chocolate".to_string(),
                color: "brown".to_string(),
                parts: 1,
            },
            Ingredient {
                name: "milk".to_string(),
                color: "white".to_string(),
                parts: 2,
            },
        ],
    }
}

// --- Tests ---

#[tokio::test]
#[serial]
#[ignore = "requires a Postgres database in DATABASE_URL"]
async fn test_reset_seeds_water() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.seeded_repository().await;

    let drinks = repo.list_drinks().await.unwrap();
    assert_eq!(drinks.len(), 1);
    assert_eq!(drinks[0].title, "water");
    assert_eq!(drinks[0].recipe[0].parts, 1);
}

#[tokio::test]
#[serial]
#[ignore = "requires a Postgres database in DATABASE_URL"]
async fn test_insert_round_trips_recipe() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.seeded_repository().await;

    let created = repo.insert_drink(cocoa()).await.unwrap();
    assert_eq!(created.recipe, cocoa().recipe);

    let drinks = repo.list_drinks().await.unwrap();
    assert_eq!(drinks.last().unwrap(), &created);
}

#[tokio::test]
#[serial]
#[ignore = "requires a Postgres database in DATABASE_URL"]
async fn test_find_drink_by_id() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.seeded_repository().await;
    let created = repo.insert_drink(cocoa()).await.unwrap();

    assert_eq!(repo.find_drink(created.id).await.unwrap(), Some(created.clone()));
    assert!(repo.find_drink(created.id + 1000).await.unwrap().is_none());
}

#[tokio::test]
#[serial]
#[ignore = "requires a Postgres database in DATABASE_URL"]
async fn test_update_keeps_omitted_columns() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.seeded_repository().await;
    let created = repo.insert_drink(cocoa()).await.unwrap();

    let updated = repo
        .update_drink(
            created.id,
            DrinkChanges {
                title: Some("Hot Chocolate".to_string()),
                recipe: None,
            },
        )
        .await
        .unwrap()
        .expect("drink should exist");

    assert_eq!(updated.title, "Hot Chocolate");
    assert_eq!(updated.recipe, created.recipe);

    let missing = repo
        .update_drink(created.id + 1000, DrinkChanges::default())
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
#[serial]
#[ignore = "requires a Postgres database in DATABASE_URL"]
async fn test_delete_is_hard_and_reports_absence() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.seeded_repository().await;
    let created = repo.insert_drink(cocoa()).await.unwrap();

    assert!(repo.delete_drink(created.id).await.unwrap());
    assert!(!repo.delete_drink(created.id).await.unwrap());
    assert!(repo.list_drinks().await.unwrap().iter().all(|d| d.id != created.id));
}

#[tokio::test]
#[serial]
#[ignore = "requires a Postgres database in DATABASE_URL"]
async fn test_duplicate_title_is_database_error() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.seeded_repository().await;

    let mut duplicate = cocoa();
    duplicate.title = "water".to_string();

    let err = repo.insert_drink(duplicate).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Database(_)));
}
