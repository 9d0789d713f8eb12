use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::categories::{self, Category, CategoryType};
use crate::{LedgerError, ResultLedger};

use super::{Ledger, with_tx};

/// Command to create a category.
#[derive(Clone, Debug)]
pub struct NewCategory {
    pub user_id: String,
    pub name: String,
    pub icon: String,
    pub image_path: Option<String>,
    pub color: Option<i32>,
    pub category_type: CategoryType,
}

/// Full replacement for an existing category's mutable fields.
#[derive(Clone, Debug)]
pub struct CategoryUpdate {
    pub name: String,
    pub icon: String,
    pub image_path: Option<String>,
    pub color: Option<i32>,
    pub category_type: CategoryType,
}

impl Ledger {
    /// Creates a category for a user and returns its id. Existing
    /// transactions are unaffected; they carry their own snapshot.
    pub async fn create_category(&self, cmd: NewCategory) -> ResultLedger<Uuid> {
        let category = Category::new(
            cmd.user_id,
            cmd.name,
            cmd.icon,
            cmd.image_path,
            cmd.color,
            cmd.category_type,
        )?;

        let id = with_tx!(self, |db_tx| {
            self.require_category_type(&db_tx, category.category_type)
                .await?;
            categories::ActiveModel::from(&category).insert(&db_tx).await?;
            Ok(category.id)
        })?;

        self.invalidate_categories(&category.user_id);
        tracing::info!(user_id = %category.user_id, %id, "created category");
        Ok(id)
    }

    /// Lists a user's categories by name, through the category cache.
    pub async fn categories(&self, user_id: &str) -> ResultLedger<Vec<Category>> {
        if let Some(hit) = self.cached_categories(user_id) {
            return Ok(hit);
        }

        let models = categories::Entity::find()
            .filter(categories::Column::UserId.eq(user_id))
            .order_by_asc(categories::Column::Name)
            .all(&self.database)
            .await?;
        let items = models
            .into_iter()
            .map(Category::try_from)
            .collect::<ResultLedger<Vec<_>>>()?;

        self.store_categories(user_id, items.clone());
        Ok(items)
    }

    /// Replaces every mutable field of a category. Returns the number of
    /// updated rows.
    pub async fn update_category(&self, id: Uuid, cmd: CategoryUpdate) -> ResultLedger<u64> {
        if cmd.name.trim().is_empty() {
            return Err(LedgerError::Validation(
                "category name cannot be empty".to_string(),
            ));
        }

        let user_id = with_tx!(self, |db_tx| {
            let model = categories::Entity::find_by_id(id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| LedgerError::NotFound("category not exists".to_string()))?;
            self.require_category_type(&db_tx, cmd.category_type).await?;

            let active = categories::ActiveModel {
                id: ActiveValue::Set(model.id.clone()),
                name: ActiveValue::Set(cmd.name.trim().to_string()),
                icon: ActiveValue::Set(cmd.icon.clone()),
                image_path: ActiveValue::Set(cmd.image_path.clone()),
                color: ActiveValue::Set(cmd.color),
                category_type: ActiveValue::Set(cmd.category_type.as_str().to_string()),
                ..Default::default()
            };
            active.update(&db_tx).await?;
            Ok(model.user_id)
        })?;

        self.invalidate_categories(&user_id);
        Ok(1)
    }

    /// Deletes a category. Transactions recorded under it keep their
    /// snapshot untouched. Returns the number of deleted rows.
    pub async fn delete_category(&self, id: Uuid) -> ResultLedger<u64> {
        let (user_id, rows) = with_tx!(self, |db_tx| {
            let model = categories::Entity::find_by_id(id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| LedgerError::NotFound("category not exists".to_string()))?;
            let result = categories::Entity::delete_by_id(model.id.clone())
                .exec(&db_tx)
                .await?;
            Ok((model.user_id, result.rows_affected))
        })?;

        self.invalidate_categories(&user_id);
        tracing::info!(%user_id, %id, "deleted category");
        Ok(rows)
    }
}
