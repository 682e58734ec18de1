//! SQLite-backed [`KeyValueStore`], one row per key.
//!
//! The `kv_entries` table is created by the `migration` crate.

use chrono::Utc;
use sea_orm::{ActiveValue, DatabaseConnection, entity::prelude::*, sea_query::OnConflict};

use super::KeyValueStore;
use crate::ResultEngine;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "kv_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub key: String,
    pub value: String,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Debug)]
pub struct SqliteStore {
    database: DatabaseConnection,
}

impl SqliteStore {
    /// Wraps an already migrated connection.
    pub fn new(database: DatabaseConnection) -> Self {
        Self { database }
    }
}

impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str) -> ResultEngine<Option<String>> {
        let model = Entity::find_by_id(key.to_string())
            .one(&self.database)
            .await?;
        Ok(model.map(|m| m.value))
    }

    async fn set(&self, key: &str, value: String) -> ResultEngine<()> {
        let model = ActiveModel {
            key: ActiveValue::Set(key.to_string()),
            value: ActiveValue::Set(value),
            updated_at: ActiveValue::Set(Utc::now()),
        };
        Entity::insert(model)
            .on_conflict(
                OnConflict::column(Column::Key)
                    .update_columns([Column::Value, Column::UpdatedAt])
                    .to_owned(),
            )
            .exec_without_returning(&self.database)
            .await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> ResultEngine<()> {
        Entity::delete_by_id(key.to_string())
            .exec(&self.database)
            .await?;
        Ok(())
    }
}
