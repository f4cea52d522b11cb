use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, Condition, DatabaseTransaction, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, TransactionTrait, prelude::*,
};

use crate::{
    Attachment, AttachmentInput, AttachmentNew, EngineError, Page, PageRequest, Project,
    ProjectNew, ProjectUpdate, ResultEngine, attachments, projects,
    util::{ensure_non_negative, normalize_optional_text, normalize_required},
};

use super::{
    Engine, amount_like_filter, apply_nullable, apply_optional, apply_required, like_filter,
    with_tx,
};

/// Filters for listing projects. All filters match substrings.
#[derive(Clone, Debug, Default)]
pub struct ProjectFilter {
    pub project_name: Option<String>,
    pub project_full_name: Option<String>,
    pub project_scale: Option<String>,
    pub project_status: Option<String>,
    pub project_amount: Option<String>,
}

impl ProjectFilter {
    fn condition(&self) -> Condition {
        let mut cond = Condition::all();
        cond = like_filter(
            cond,
            projects::Column::ProjectName,
            self.project_name.as_deref(),
        );
        cond = like_filter(
            cond,
            projects::Column::ProjectFullName,
            self.project_full_name.as_deref(),
        );
        cond = like_filter(
            cond,
            projects::Column::ProjectScale,
            self.project_scale.as_deref(),
        );
        cond = like_filter(
            cond,
            projects::Column::ProjectStatus,
            self.project_status.as_deref(),
        );
        amount_like_filter(
            cond,
            "projects.project_amount",
            self.project_amount.as_deref(),
        )
    }
}

/// Build a new attachment row from a client reference, if it names a file.
fn attachment_from_input(
    project_id: i32,
    input: &AttachmentInput,
    create_at: DateTime<Utc>,
) -> Option<Attachment> {
    let url = normalize_optional_text(input.url.as_deref());
    let filename = normalize_optional_text(input.filename.as_deref()).or_else(|| {
        url.as_deref()
            .and_then(|u| u.rsplit('/').next())
            .filter(|name| !name.is_empty())
            .map(ToString::to_string)
    })?;
    let file_path = url.unwrap_or_else(|| format!("/uploads/{filename}"));
    Some(Attachment {
        id: 0,
        project_id,
        attachment_code: normalize_optional_text(input.attachment_code.as_deref())
            .unwrap_or_default(),
        original_filename: normalize_optional_text(input.original_filename.as_deref())
            .unwrap_or_else(|| filename.clone()),
        filename,
        file_path,
        file_size: input.file_size.unwrap_or(0).max(0),
        create_at,
    })
}

impl Engine {
    async fn project_attachments_tx(
        &self,
        db_tx: &DatabaseTransaction,
        project_id: i32,
    ) -> ResultEngine<Vec<Attachment>> {
        let models = attachments::Entity::find()
            .filter(attachments::Column::ProjectId.eq(project_id))
            .order_by_asc(attachments::Column::Id)
            .all(db_tx)
            .await?;
        Ok(models.into_iter().map(Attachment::from).collect())
    }

    async fn require_project(
        &self,
        db_tx: &DatabaseTransaction,
        id: i32,
    ) -> ResultEngine<projects::Model> {
        projects::Entity::find_by_id(id)
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("project {id}")))
    }

    /// Link (or create) the given attachments against `project_id`.
    ///
    /// Returns the ids of every attachment now linked through `inputs`.
    async fn link_attachments(
        &self,
        db_tx: &DatabaseTransaction,
        project_id: i32,
        inputs: &[AttachmentInput],
        only_own: bool,
    ) -> ResultEngine<HashSet<i32>> {
        let now = Utc::now();
        let mut linked = HashSet::new();
        for input in inputs {
            match input.id {
                Some(attachment_id) => {
                    let Some(model) = attachments::Entity::find_by_id(attachment_id)
                        .one(db_tx)
                        .await?
                    else {
                        if only_own {
                            continue;
                        }
                        return Err(EngineError::KeyNotFound(format!(
                            "attachment {attachment_id}"
                        )));
                    };
                    if only_own && model.project_id != project_id {
                        continue;
                    }
                    let mut active: attachments::ActiveModel = model.into();
                    active.project_id = ActiveValue::Set(project_id);
                    if let Some(code) = normalize_optional_text(input.attachment_code.as_deref())
                    {
                        active.attachment_code = ActiveValue::Set(code);
                    }
                    active.update(db_tx).await?;
                    linked.insert(attachment_id);
                }
                None => {
                    if let Some(attachment) = attachment_from_input(project_id, input, now) {
                        let model = attachments::ActiveModel::from(&attachment)
                            .insert(db_tx)
                            .await?;
                        linked.insert(model.id);
                    }
                }
            }
        }
        Ok(linked)
    }

    /// Return a project with its attachments.
    pub async fn project(&self, id: i32) -> ResultEngine<Project> {
        with_tx!(self, |db_tx| {
            let model = self.require_project(&db_tx, id).await?;
            let attachments = self.project_attachments_tx(&db_tx, id).await?;
            Ok(Project::from_model(model, attachments))
        })
    }

    /// Add a new project.
    ///
    /// Attachment entries with an id are moved to the new project; entries
    /// without id create new attachment rows.
    pub async fn new_project(&self, cmd: ProjectNew) -> ResultEngine<Project> {
        ensure_non_negative(cmd.project_amount, "project_amount")?;
        let project = Project {
            id: 0,
            project_name: normalize_required(&cmd.project_name, "project_name")?,
            project_full_name: normalize_optional_text(cmd.project_full_name.as_deref()),
            project_scale: normalize_optional_text(cmd.project_scale.as_deref()),
            start_date: cmd.start_date,
            end_date: cmd.end_date,
            project_status: normalize_optional_text(cmd.project_status.as_deref()),
            project_amount: cmd.project_amount,
            create_at: Utc::now(),
            attachments: Vec::new(),
        };

        with_tx!(self, |db_tx| {
            let model = projects::ActiveModel::from(&project)
                .insert(&db_tx)
                .await?;
            if let Some(inputs) = &cmd.attachments {
                self.link_attachments(&db_tx, model.id, inputs, false)
                    .await?;
            }
            let attachments = self.project_attachments_tx(&db_tx, model.id).await?;
            Ok(Project::from_model(model, attachments))
        })
    }

    /// Partially update a project.
    ///
    /// When `cmd.attachments` is present it becomes the full attachment list:
    /// listed attachments of this project are kept, new entries are created and
    /// every other attachment of the project is removed.
    pub async fn update_project(&self, id: i32, cmd: ProjectUpdate) -> ResultEngine<Project> {
        ensure_non_negative(cmd.project_amount.flatten(), "project_amount")?;
        with_tx!(self, |db_tx| {
            let model = self.require_project(&db_tx, id).await?;
            let mut project = Project::from_model(model, Vec::new());

            apply_required(
                &mut project.project_name,
                cmd.project_name.as_deref(),
                "project_name",
            )?;
            apply_optional(
                &mut project.project_full_name,
                cmd.project_full_name.as_deref(),
            );
            apply_optional(&mut project.project_scale, cmd.project_scale.as_deref());
            apply_optional(&mut project.project_status, cmd.project_status.as_deref());
            apply_nullable(&mut project.start_date, cmd.start_date);
            apply_nullable(&mut project.end_date, cmd.end_date);
            apply_nullable(&mut project.project_amount, cmd.project_amount);

            let mut active = projects::ActiveModel::from(&project);
            active.id = ActiveValue::Unchanged(id);
            let model = active.update(&db_tx).await?;

            if let Some(inputs) = &cmd.attachments {
                let keep = self.link_attachments(&db_tx, id, inputs, true).await?;
                let mut stale = attachments::Entity::delete_many()
                    .filter(attachments::Column::ProjectId.eq(id));
                if !keep.is_empty() {
                    stale = stale.filter(
                        attachments::Column::Id.is_not_in(keep.iter().copied().collect::<Vec<_>>()),
                    );
                }
                stale.exec(&db_tx).await?;
            }

            let attachments = self.project_attachments_tx(&db_tx, id).await?;
            Ok(Project::from_model(model, attachments))
        })
    }

    /// Delete a project together with its attachment rows.
    ///
    /// Files on disk are left alone.
    pub async fn delete_project(&self, id: i32) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_project(&db_tx, id).await?;
            attachments::Entity::delete_many()
                .filter(attachments::Column::ProjectId.eq(id))
                .exec(&db_tx)
                .await?;
            projects::Entity::delete_by_id(id).exec(&db_tx).await?;
            Ok(())
        })
    }

    /// List projects, newest first, each with its attachments.
    pub async fn list_projects(
        &self,
        filter: &ProjectFilter,
        page: PageRequest,
    ) -> ResultEngine<Page<Project>> {
        with_tx!(self, |db_tx| {
            let query = projects::Entity::find().filter(filter.condition());
            let total = query.clone().count(&db_tx).await?;
            let models = query
                .order_by_desc(projects::Column::Id)
                .offset(page.offset())
                .limit(page.limit)
                .all(&db_tx)
                .await?;

            let ids: Vec<i32> = models.iter().map(|m| m.id).collect();
            let mut by_project: HashMap<i32, Vec<Attachment>> = HashMap::new();
            if !ids.is_empty() {
                for model in attachments::Entity::find()
                    .filter(attachments::Column::ProjectId.is_in(ids))
                    .order_by_asc(attachments::Column::Id)
                    .all(&db_tx)
                    .await?
                {
                    by_project
                        .entry(model.project_id)
                        .or_default()
                        .push(Attachment::from(model));
                }
            }

            let items = models
                .into_iter()
                .map(|model| {
                    let attachments = by_project.remove(&model.id).unwrap_or_default();
                    Project::from_model(model, attachments)
                })
                .collect();
            Ok(Page { items, total })
        })
    }

    /// Attachments of a project, oldest first.
    pub async fn project_attachments(&self, project_id: i32) -> ResultEngine<Vec<Attachment>> {
        with_tx!(self, |db_tx| {
            self.require_project(&db_tx, project_id).await?;
            self.project_attachments_tx(&db_tx, project_id).await
        })
    }

    /// Record an uploaded file against a project.
    pub async fn new_attachment(&self, cmd: AttachmentNew) -> ResultEngine<Attachment> {
        let attachment = Attachment {
            id: 0,
            project_id: cmd.project_id,
            attachment_code: normalize_required(&cmd.attachment_code, "attachment_code")?,
            filename: normalize_required(&cmd.filename, "filename")?,
            original_filename: cmd.original_filename,
            file_path: cmd.file_path,
            file_size: cmd.file_size,
            create_at: Utc::now(),
        };
        with_tx!(self, |db_tx| {
            self.require_project(&db_tx, attachment.project_id).await?;
            let model = attachments::ActiveModel::from(&attachment)
                .insert(&db_tx)
                .await?;
            Ok(Attachment::from(model))
        })
    }

    /// Delete one attachment row and return it.
    pub async fn delete_attachment(&self, id: i32) -> ResultEngine<Attachment> {
        with_tx!(self, |db_tx| {
            let model = attachments::Entity::find_by_id(id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound(format!("attachment {id}")))?;
            attachments::Entity::delete_by_id(id).exec(&db_tx).await?;
            Ok(Attachment::from(model))
        })
    }
}
