//! The module contains `Project` struct and its persistence model.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};

use crate::{Attachment, MoneyCents};

/// A construction/landscaping project. Views always embed the project's
/// attachments.
#[derive(Clone, Debug, PartialEq)]
pub struct Project {
    pub id: i32,
    pub project_name: String,
    pub project_full_name: Option<String>,
    pub project_scale: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub project_status: Option<String>,
    pub project_amount: Option<MoneyCents>,
    pub create_at: DateTime<Utc>,
    pub attachments: Vec<Attachment>,
}

impl Project {
    pub(crate) fn from_model(model: Model, attachments: Vec<Attachment>) -> Self {
        Self {
            id: model.id,
            project_name: model.project_name,
            project_full_name: model.project_full_name,
            project_scale: model.project_scale,
            start_date: model.start_date,
            end_date: model.end_date,
            project_status: model.project_status,
            project_amount: model.project_amount.map(MoneyCents::new),
            create_at: model.create_at,
            attachments,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "projects")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub project_name: String,
    pub project_full_name: Option<String>,
    pub project_scale: Option<String>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub project_status: Option<String>,
    pub project_amount: Option<i64>,
    pub create_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::attachments::Entity")]
    Attachments,
}

impl Related<super::attachments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Attachments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Project> for ActiveModel {
    fn from(value: &Project) -> Self {
        Self {
            id: ActiveValue::NotSet,
            project_name: ActiveValue::Set(value.project_name.clone()),
            project_full_name: ActiveValue::Set(value.project_full_name.clone()),
            project_scale: ActiveValue::Set(value.project_scale.clone()),
            start_date: ActiveValue::Set(value.start_date),
            end_date: ActiveValue::Set(value.end_date),
            project_status: ActiveValue::Set(value.project_status.clone()),
            project_amount: ActiveValue::Set(value.project_amount.map(MoneyCents::cents)),
            create_at: ActiveValue::Set(value.create_at),
        }
    }
}
