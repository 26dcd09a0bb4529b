use thiserror::Error;

use crate::{
    models::{
        CreateDrinkRequest, Drink, DrinkChanges, DrinkSummary, Ingredient, NewDrink,
        UpdateDrinkRequest,
    },
    repository::{RepositoryError, RepositoryState},
};

/// ServiceError
///
/// Outcome of a failed drink operation. The HTTP boundary decides how each
/// variant is exposed (see `ApiError`).
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("drink not found")]
    NotFound,

    #[error("invalid drink: {0}")]
    Invalid(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Width of the `title` column.
pub const MAX_TITLE_CHARS: usize = 80;

/// DrinkService
///
/// The five drink operations. Holds no state of its own besides the injected
/// repository handle, so cloning it per request is cheap.
#[derive(Clone)]
pub struct DrinkService {
    repo: RepositoryState,
}

impl DrinkService {
    pub fn new(repo: RepositoryState) -> Self {
        Self { repo }
    }

    /// Every drink in summary projection. An empty table is reported as
    /// `NotFound`, not as an empty list.
    pub async fn list_summary(&self) -> ServiceResult<Vec<DrinkSummary>> {
        let drinks = self.all_drinks().await?;
        Ok(drinks.iter().map(Drink::summary).collect())
    }

    /// Every drink in detail projection, same empty-table rule as `list_summary`.
    pub async fn list_detail(&self) -> ServiceResult<Vec<Drink>> {
        self.all_drinks().await
    }

    /// Inserts a drink and answers with the whole menu in detail projection.
    pub async fn create(&self, request: CreateDrinkRequest) -> ServiceResult<Vec<Drink>> {
        let drink = NewDrink {
            title: validate_title(request.title)?,
            recipe: validate_recipe(request.recipe.into())?,
        };

        let created = self.repo.insert_drink(drink).await?;
        tracing::info!(drink_id = created.id, title = %created.title, "drink created");

        Ok(self.repo.list_drinks().await?)
    }

    /// Replaces the supplied fields of one drink and answers with the whole menu.
    /// An unknown id is `NotFound` whatever the body holds.
    pub async fn update(&self, id: i32, request: UpdateDrinkRequest) -> ServiceResult<Vec<Drink>> {
        if self.repo.find_drink(id).await?.is_none() {
            return Err(ServiceError::NotFound);
        }

        let changes = DrinkChanges {
            title: request.title.map(validate_title).transpose()?,
            recipe: request
                .recipe
                .map(|recipe| validate_recipe(recipe.into()))
                .transpose()?,
        };

        let updated = self
            .repo
            .update_drink(id, changes)
            .await?
            .ok_or(ServiceError::NotFound)?;
        tracing::info!(drink_id = updated.id, "drink updated");

        Ok(self.repo.list_drinks().await?)
    }

    /// Hard delete. Returns the id that was removed.
    pub async fn delete(&self, id: i32) -> ServiceResult<i32> {
        if !self.repo.delete_drink(id).await? {
            return Err(ServiceError::NotFound);
        }
        tracing::info!(drink_id = id, "drink deleted");
        Ok(id)
    }

    async fn all_drinks(&self) -> ServiceResult<Vec<Drink>> {
        let drinks = self.repo.list_drinks().await?;
        if drinks.is_empty() {
            return Err(ServiceError::NotFound);
        }
        Ok(drinks)
    }
}

fn validate_title(title: String) -> ServiceResult<String> {
    if title.trim().is_empty() {
        return Err(ServiceError::Invalid("title must not be empty".to_string()));
    }
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(ServiceError::Invalid(format!(
            "title is longer than {MAX_TITLE_CHARS} characters"
        )));
    }
    Ok(title)
}

fn validate_recipe(recipe: Vec<Ingredient>) -> ServiceResult<Vec<Ingredient>> {
    if recipe.is_empty() {
        return Err(ServiceError::Invalid(
            "recipe needs at least one ingredient".to_string(),
        ));
    }
    Ok(recipe)
}
