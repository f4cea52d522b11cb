//! Code/value lookup tables (e.g. payment statuses).
//!
//! A [`Dictionary`] groups [`DictionaryDetail`](crate::DictionaryDetail)
//! entries and is addressed by its unique `code`.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};

/// Marker stored in `valid_mark` for active rows.
pub const VALID_MARK: &str = "Y";

#[derive(Clone, Debug, PartialEq)]
pub struct Dictionary {
    pub id: i32,
    pub code: String,
    pub name: String,
    pub valid_mark: String,
    pub create_user: Option<String>,
    pub create_time: Option<DateTime<Utc>>,
    pub update_user: Option<String>,
    pub update_time: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "dictionaries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub code: String,
    pub name: String,
    pub valid_mark: String,
    pub create_user: Option<String>,
    pub create_time: Option<DateTimeUtc>,
    pub update_user: Option<String>,
    pub update_time: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::dictionary_details::Entity")]
    Details,
}

impl Related<super::dictionary_details::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Details.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Dictionary> for ActiveModel {
    fn from(value: &Dictionary) -> Self {
        Self {
            id: ActiveValue::NotSet,
            code: ActiveValue::Set(value.code.clone()),
            name: ActiveValue::Set(value.name.clone()),
            valid_mark: ActiveValue::Set(value.valid_mark.clone()),
            create_user: ActiveValue::Set(value.create_user.clone()),
            create_time: ActiveValue::Set(value.create_time),
            update_user: ActiveValue::Set(value.update_user.clone()),
            update_time: ActiveValue::Set(value.update_time),
        }
    }
}

impl From<Model> for Dictionary {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            code: model.code,
            name: model.name,
            valid_mark: model.valid_mark,
            create_user: model.create_user,
            create_time: model.create_time,
            update_user: model.update_user,
            update_time: model.update_time,
        }
    }
}
