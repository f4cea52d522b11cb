use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};

/// One code/value entry of a dictionary, displayed in `order_no` order.
#[derive(Clone, Debug, PartialEq)]
pub struct DictionaryDetail {
    pub id: i32,
    pub dic_id: i32,
    pub code: String,
    pub value: String,
    pub order_no: i32,
    pub valid_mark: String,
    pub create_user: Option<String>,
    pub create_time: Option<DateTime<Utc>>,
    pub update_user: Option<String>,
    pub update_time: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "dictionary_details")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub dic_id: i32,
    pub code: String,
    pub value: String,
    pub order_no: i32,
    pub valid_mark: String,
    pub create_user: Option<String>,
    pub create_time: Option<DateTimeUtc>,
    pub update_user: Option<String>,
    pub update_time: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::dictionaries::Entity",
        from = "Column::DicId",
        to = "super::dictionaries::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Dictionaries,
}

impl Related<super::dictionaries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Dictionaries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&DictionaryDetail> for ActiveModel {
    fn from(value: &DictionaryDetail) -> Self {
        Self {
            id: ActiveValue::NotSet,
            dic_id: ActiveValue::Set(value.dic_id),
            code: ActiveValue::Set(value.code.clone()),
            value: ActiveValue::Set(value.value.clone()),
            order_no: ActiveValue::Set(value.order_no),
            valid_mark: ActiveValue::Set(value.valid_mark.clone()),
            create_user: ActiveValue::Set(value.create_user.clone()),
            create_time: ActiveValue::Set(value.create_time),
            update_user: ActiveValue::Set(value.update_user.clone()),
            update_time: ActiveValue::Set(value.update_time),
        }
    }
}

impl From<Model> for DictionaryDetail {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            dic_id: model.dic_id,
            code: model.code,
            value: model.value,
            order_no: model.order_no,
            valid_mark: model.valid_mark,
            create_user: model.create_user,
            create_time: model.create_time,
            update_user: model.update_user,
            update_time: model.update_time,
        }
    }
}
