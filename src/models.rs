use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;

// --- Core Schemas ---

/// Ingredient
///
/// One entry of a drink's recipe. `parts` is the relative quantity shown in the
/// detail projection only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Ingredient {
    #[schema(example = "milk")]
    pub name: String,
    #[schema(example = "white")]
    pub color: String,
    #[schema(example = 3)]
    pub parts: i32,
}

/// IngredientSummary
///
/// Public view of an ingredient, `parts` stripped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct IngredientSummary {
    pub name: String,
    pub color: String,
}

/// Drink
///
/// A menu item with its full recipe. Serialized as-is this is the detail
/// projection served to callers holding `get:drinks-detail`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Drink {
    pub id: i32,
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

/// DrinkSummary
///
/// Public projection of a drink served by `GET /drinks`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct DrinkSummary {
    pub id: i32,
    pub title: String,
    pub recipe: Vec<IngredientSummary>,
}

impl Drink {
    pub fn summary(&self) -> DrinkSummary {
        DrinkSummary {
            id: self.id,
            title: self.title.clone(),
            recipe: self
                .recipe
                .iter()
                .map(|ingredient| IngredientSummary {
                    name: ingredient.name.clone(),
                    color: ingredient.color.clone(),
                })
                .collect(),
        }
    }
}

/// DrinkRecord
///
/// Raw row of the `drinks` table. The recipe column holds the JSON-encoded
/// ingredient list and is decoded by the repository.
#[derive(Debug, Clone, FromRow)]
pub struct DrinkRecord {
    pub id: i32,
    pub title: String,
    pub recipe: String,
}

impl TryFrom<DrinkRecord> for Drink {
    type Error = serde_json::Error;

    fn try_from(record: DrinkRecord) -> Result<Self, Self::Error> {
        Ok(Drink {
            id: record.id,
            title: record.title,
            recipe: serde_json::from_str(&record.recipe)?,
        })
    }
}

// --- Request Payloads ---

/// RecipeInput
///
/// Clients send either a list of ingredients or a single ingredient object.
/// Both normalize to a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(untagged)]
#[ts(export)]
pub enum RecipeInput {
    Many(Vec<Ingredient>),
    One(Ingredient),
}

impl From<RecipeInput> for Vec<Ingredient> {
    fn from(input: RecipeInput) -> Self {
        match input {
            RecipeInput::Many(ingredients) => ingredients,
            RecipeInput::One(ingredient) => vec![ingredient],
        }
    }
}

/// CreateDrinkRequest
///
/// Payload for `POST /drinks`. Both fields are required.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CreateDrinkRequest {
    #[schema(example = "Latte")]
    pub title: String,
    pub recipe: RecipeInput,
}

/// UpdateDrinkRequest
///
/// Partial payload for `PATCH /drinks/{drink_id}`. Omitted fields keep their
/// stored value; a supplied recipe replaces the old one wholesale.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UpdateDrinkRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe: Option<RecipeInput>,
}

/// NewDrink
///
/// Validated insert handed to the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDrink {
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

/// DrinkChanges
///
/// Validated partial update handed to the repository.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrinkChanges {
    pub title: Option<String>,
    pub recipe: Option<Vec<Ingredient>>,
}

// --- Response Envelopes ---

/// DrinkSummaryList
///
/// Success envelope of `GET /drinks`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct DrinkSummaryList {
    pub success: bool,
    pub drinks: Vec<DrinkSummary>,
}

/// DrinkDetailList
///
/// Success envelope of every endpoint answering with the detail projection.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct DrinkDetailList {
    pub success: bool,
    pub drinks: Vec<Drink>,
}

impl From<Vec<DrinkSummary>> for DrinkSummaryList {
    fn from(drinks: Vec<DrinkSummary>) -> Self {
        Self {
            success: true,
            drinks,
        }
    }
}

impl From<Vec<Drink>> for DrinkDetailList {
    fn from(drinks: Vec<Drink>) -> Self {
        Self {
            success: true,
            drinks,
        }
    }
}

/// DeleteResponse
///
/// Success envelope confirming which drink was removed.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct DeleteResponse {
    pub success: bool,
    pub delete: i32,
}
