//! Category primitives.
//!
//! `CategoryType` is the closed Necessity/Want/Savings set driving the
//! 50/30/20 budget model. `Category` is the mutable per-user aggregate;
//! editing or deleting one never touches the snapshots already frozen
//! inside ledger rows.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{LedgerError, ResultLedger};

/// The fixed category-type set. Seeded once by the init migration and
/// referenced by id from both categories and transaction snapshots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryType {
    Necessity,
    Want,
    Savings,
}

impl CategoryType {
    pub const ALL: [CategoryType; 3] = [Self::Necessity, Self::Want, Self::Savings];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Necessity => "necessity",
            Self::Want => "want",
            Self::Savings => "savings",
        }
    }

    /// User-facing Spanish product copy. Derived display data only; the
    /// discriminant is `as_str`.
    pub fn label(self) -> &'static str {
        match self {
            Self::Necessity => "Necesidad",
            Self::Want => "Deseo",
            Self::Savings => "Ahorro",
        }
    }
}

impl TryFrom<&str> for CategoryType {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "necessity" => Ok(Self::Necessity),
            "want" => Ok(Self::Want),
            "savings" => Ok(Self::Savings),
            other => Err(LedgerError::Validation(format!(
                "invalid category type: {other}"
            ))),
        }
    }
}

/// A user-owned spending category.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub icon: String,
    pub image_path: Option<String>,
    pub color: Option<i32>,
    pub category_type: CategoryType,
}

impl Category {
    pub fn new(
        user_id: String,
        name: String,
        icon: String,
        image_path: Option<String>,
        color: Option<i32>,
        category_type: CategoryType,
    ) -> ResultLedger<Self> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(LedgerError::Validation(
                "category name must not be empty".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            name: trimmed.to_string(),
            icon,
            image_path,
            color,
            category_type,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub icon: String,
    pub image_path: Option<String>,
    pub color: Option<i32>,
    pub category_type: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Category> for ActiveModel {
    fn from(category: &Category) -> Self {
        Self {
            id: ActiveValue::Set(category.id.to_string()),
            user_id: ActiveValue::Set(category.user_id.clone()),
            name: ActiveValue::Set(category.name.clone()),
            icon: ActiveValue::Set(category.icon.clone()),
            image_path: ActiveValue::Set(category.image_path.clone()),
            color: ActiveValue::Set(category.color),
            category_type: ActiveValue::Set(category.category_type.as_str().to_string()),
        }
    }
}

impl TryFrom<Model> for Category {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| LedgerError::NotFound("category not exists".to_string()))?,
            user_id: model.user_id,
            name: model.name,
            icon: model.icon,
            image_path: model.image_path,
            color: model.color,
            category_type: CategoryType::try_from(model.category_type.as_str())?,
        })
    }
}

/// The seeded `category_types` table. Insert-time integrity checks look the
/// referenced row up here before any balance state is touched.
pub mod types {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "category_types")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub label: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}
