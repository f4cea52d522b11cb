//! Files attached to a project.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};

#[derive(Clone, Debug, PartialEq)]
pub struct Attachment {
    pub id: i32,
    pub project_id: i32,
    pub attachment_code: String,
    /// Stored file name (sanitized, timestamped).
    pub filename: String,
    pub original_filename: String,
    /// Public path, e.g. `/uploads/plan_20260101_120000.pdf`.
    pub file_path: String,
    pub file_size: i64,
    pub create_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "attachments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub project_id: i32,
    pub attachment_code: String,
    pub filename: String,
    pub original_filename: String,
    pub file_path: String,
    pub file_size: i64,
    pub create_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::projects::Entity",
        from = "Column::ProjectId",
        to = "super::projects::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Projects,
}

impl Related<super::projects::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Projects.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Attachment> for ActiveModel {
    fn from(value: &Attachment) -> Self {
        Self {
            id: ActiveValue::NotSet,
            project_id: ActiveValue::Set(value.project_id),
            attachment_code: ActiveValue::Set(value.attachment_code.clone()),
            filename: ActiveValue::Set(value.filename.clone()),
            original_filename: ActiveValue::Set(value.original_filename.clone()),
            file_path: ActiveValue::Set(value.file_path.clone()),
            file_size: ActiveValue::Set(value.file_size),
            create_at: ActiveValue::Set(value.create_at),
        }
    }
}

impl From<Model> for Attachment {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            project_id: model.project_id,
            attachment_code: model.attachment_code,
            filename: model.filename,
            original_filename: model.original_filename,
            file_path: model.file_path,
            file_size: model.file_size,
            create_at: model.create_at,
        }
    }
}
