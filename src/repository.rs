use crate::models::{Drink, DrinkChanges, DrinkRecord, Ingredient, NewDrink};
use async_trait::async_trait;
use sqlx::PgPool;
use std::{collections::BTreeMap, sync::Arc};
use thiserror::Error;
use tokio::sync::RwLock;

/// RepositoryError
///
/// Everything that can go wrong below the service layer. None of these details
/// are ever shown to API clients.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("recipe encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("conflict: {0}")]
    Conflict(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Repository Trait
///
/// Persistence contract for the `drinks` table. Every method is a single
/// statement against the store; no transaction spans more than one call.
///
/// **Send + Sync + async_trait** keep `Arc<dyn Repository>` shareable across
/// request tasks.
#[async_trait]
pub trait Repository: Send + Sync {
    /// All drinks ordered by id.
    async fn list_drinks(&self) -> RepositoryResult<Vec<Drink>>;

    /// One drink by id; `None` when absent.
    async fn find_drink(&self, id: i32) -> RepositoryResult<Option<Drink>>;

    /// Inserts a drink and returns it with its assigned id.
    async fn insert_drink(&self, drink: NewDrink) -> RepositoryResult<Drink>;

    /// Applies the supplied fields; `None` when no drink has this id.
    async fn update_drink(&self, id: i32, changes: DrinkChanges) -> RepositoryResult<Option<Drink>>;

    /// Hard delete; `false` when no drink has this id.
    async fn delete_drink(&self, id: i32) -> RepositoryResult<bool>;
}

/// RepositoryState
///
/// The handle injected into `DrinkService`.
pub type RepositoryState = Arc<dyn Repository>;

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS drinks (
        id SERIAL PRIMARY KEY,
        title VARCHAR(80) UNIQUE NOT NULL,
        recipe TEXT NOT NULL
    )
"#;

/// Recipe seeded by `PostgresRepository::reset`.
pub fn seed_drink() -> NewDrink {
    NewDrink {
        title: "water".to_string(),
        recipe: vec![Ingredient {
            name: "water".to_string(),
            color: "blue".to_string(),
            parts: 1,
        }],
    }
}

/// PostgresRepository
///
/// `Repository` backed by PostgreSQL. The recipe column stores the
/// JSON-encoded ingredient list.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the `drinks` table if it does not exist yet.
    pub async fn ensure_schema(&self) -> RepositoryResult<()> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        Ok(())
    }

    /// reset
    ///
    /// Drops every drink, recreates the table and seeds a single `water` drink.
    /// Destroys all existing records.
    pub async fn reset(&self) -> RepositoryResult<Drink> {
        sqlx::query("DROP TABLE IF EXISTS drinks")
            .execute(&self.pool)
            .await?;
        self.ensure_schema().await?;
        self.insert_drink(seed_drink()).await
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn list_drinks(&self) -> RepositoryResult<Vec<Drink>> {
        let records =
            sqlx::query_as::<_, DrinkRecord>("SELECT id, title, recipe FROM drinks ORDER BY id")
                .fetch_all(&self.pool)
                .await?;

        records
            .into_iter()
            .map(|record| Drink::try_from(record).map_err(RepositoryError::from))
            .collect()
    }

    async fn find_drink(&self, id: i32) -> RepositoryResult<Option<Drink>> {
        let record = sqlx::query_as::<_, DrinkRecord>(
            "SELECT id, title, recipe FROM drinks WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        record
            .map(|record| Drink::try_from(record).map_err(RepositoryError::from))
            .transpose()
    }

    async fn insert_drink(&self, drink: NewDrink) -> RepositoryResult<Drink> {
        let recipe = serde_json::to_string(&drink.recipe)?;
        let record = sqlx::query_as::<_, DrinkRecord>(
            "INSERT INTO drinks (title, recipe) VALUES ($1, $2) RETURNING id, title, recipe",
        )
        .bind(&drink.title)
        .bind(recipe)
        .fetch_one(&self.pool)
        .await?;

        Ok(Drink::try_from(record)?)
    }

    /// Single statement; `COALESCE` keeps the stored value of every column whose
    /// replacement was not supplied.
    async fn update_drink(&self, id: i32, changes: DrinkChanges) -> RepositoryResult<Option<Drink>> {
        let recipe = changes
            .recipe
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let record = sqlx::query_as::<_, DrinkRecord>(
            r#"
            UPDATE drinks
            SET title = COALESCE($2, title),
                recipe = COALESCE($3, recipe)
            WHERE id = $1
            RETURNING id, title, recipe
            "#,
        )
        .bind(id)
        .bind(changes.title)
        .bind(recipe)
        .fetch_optional(&self.pool)
        .await?;

        record
            .map(|record| Drink::try_from(record).map_err(RepositoryError::from))
            .transpose()
    }

    async fn delete_drink(&self, id: i32) -> RepositoryResult<bool> {
        let result = sqlx::query("DELETE FROM drinks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// InMemoryRepository
///
/// `Repository` kept in process memory. Ids come from a sequence that never
/// reuses a value and titles are unique, as in the table. Column widths are not
/// checked here; `DrinkService` bounds the title length for both stores.
#[derive(Default)]
pub struct InMemoryRepository {
    inner: RwLock<InMemoryTable>,
}

#[derive(Default)]
struct InMemoryTable {
    last_id: i32,
    rows: BTreeMap<i32, Drink>,
}

impl InMemoryTable {
    fn title_taken(&self, title: &str, except: Option<i32>) -> bool {
        self.rows
            .values()
            .any(|drink| drink.title == title && Some(drink.id) != except)
    }
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository pre-populated with the given drinks, inserted in order.
    pub async fn with_drinks(drinks: impl IntoIterator<Item = NewDrink>) -> RepositoryResult<Self> {
        let repo = Self::new();
        for drink in drinks {
            repo.insert_drink(drink).await?;
        }
        Ok(repo)
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn list_drinks(&self) -> RepositoryResult<Vec<Drink>> {
        let table = self.inner.read().await;
        Ok(table.rows.values().cloned().collect())
    }

    async fn find_drink(&self, id: i32) -> RepositoryResult<Option<Drink>> {
        let table = self.inner.read().await;
        Ok(table.rows.get(&id).cloned())
    }

    async fn insert_drink(&self, drink: NewDrink) -> RepositoryResult<Drink> {
        let mut table = self.inner.write().await;
        if table.title_taken(&drink.title, None) {
            return Err(RepositoryError::Conflict(format!(
                "title {:?} already exists",
                drink.title
            )));
        }

        table.last_id += 1;
        let created = Drink {
            id: table.last_id,
            title: drink.title,
            recipe: drink.recipe,
        };
        table.rows.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_drink(&self, id: i32, changes: DrinkChanges) -> RepositoryResult<Option<Drink>> {
        let mut table = self.inner.write().await;
        if let Some(title) = &changes.title {
            if table.title_taken(title, Some(id)) {
                return Err(RepositoryError::Conflict(format!(
                    "title {title:?} already exists"
                )));
            }
        }

        let Some(drink) = table.rows.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(title) = changes.title {
            drink.title = title;
        }
        if let Some(recipe) = changes.recipe {
            drink.recipe = recipe;
        }
        Ok(Some(drink.clone()))
    }

    async fn delete_drink(&self, id: i32) -> RepositoryResult<bool> {
        let mut table = self.inner.write().await;
        Ok(table.rows.remove(&id).is_some())
    }
}
