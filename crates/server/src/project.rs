//! Projects and attachments API endpoints.

use api_types::{
    ApiResponse,
    project::{
        AttachmentRef, AttachmentView, ProjectNew, ProjectQuery, ProjectUpdate, ProjectView,
    },
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{Attachment, AttachmentInput, Project, ProjectFilter};

use crate::{ServerError, server::ServerState, views};

pub(crate) fn attachment_view(attachment: Attachment) -> AttachmentView {
    AttachmentView {
        id: attachment.id,
        project_id: attachment.project_id,
        attachment_code: attachment.attachment_code,
        filename: attachment.filename,
        original_filename: attachment.original_filename,
        file_path: attachment.file_path,
        file_size: attachment.file_size,
        create_at: views::timestamp(attachment.create_at),
    }
}

fn view(project: Project) -> ProjectView {
    ProjectView {
        id: project.id,
        project_name: project.project_name,
        project_full_name: project.project_full_name,
        project_scale: project.project_scale,
        start_date: project.start_date.map(views::date),
        end_date: project.end_date.map(views::date),
        project_status: project.project_status,
        project_amount: project.project_amount.map(|amount| amount.to_string()),
        create_at: views::timestamp(project.create_at),
        attachments: project
            .attachments
            .into_iter()
            .map(attachment_view)
            .collect(),
    }
}

fn attachment_inputs(refs: Option<Vec<AttachmentRef>>) -> Option<Vec<AttachmentInput>> {
    refs.map(|refs| {
        refs.into_iter()
            .map(|r| AttachmentInput {
                id: r.id,
                attachment_code: r.attachment_code,
                filename: r.filename,
                original_filename: r.original_filename,
                url: r.url,
                file_size: r.file_size,
            })
            .collect()
    })
}

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ProjectQuery>,
) -> Result<Json<ApiResponse<Vec<ProjectView>>>, ServerError> {
    let filter = ProjectFilter {
        project_name: query.project_name,
        project_full_name: query.project_full_name,
        project_scale: query.project_scale,
        project_status: query.project_status,
        project_amount: query.project_amount,
    };
    let page = state
        .engine
        .list_projects(&filter, views::page(query.page, query.limit))
        .await?
        .map(view);

    Ok(Json(ApiResponse::page(page.items, page.total)))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<ProjectView>>, ServerError> {
    let project = state.engine.project(id).await?;
    Ok(Json(ApiResponse::ok(view(project))))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ProjectNew>,
) -> Result<(StatusCode, Json<ApiResponse<ProjectView>>), ServerError> {
    let cmd = engine::ProjectNew {
        project_name: payload.project_name,
        project_full_name: payload.project_full_name,
        project_scale: payload.project_scale,
        start_date: views::optional_date(payload.start_date.as_deref(), "start_date")?,
        end_date: views::optional_date(payload.end_date.as_deref(), "end_date")?,
        project_status: payload.project_status,
        project_amount: views::optional_money(payload.project_amount.as_ref())?,
        attachments: attachment_inputs(payload.attachments),
    };
    let project = state.engine.new_project(cmd).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(view(project)).with_msg("created")),
    ))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<ProjectUpdate>,
) -> Result<Json<ApiResponse<ProjectView>>, ServerError> {
    let cmd = engine::ProjectUpdate {
        project_name: payload.project_name,
        project_full_name: payload.project_full_name,
        project_scale: payload.project_scale,
        start_date: views::patch_date(payload.start_date, "start_date")?,
        end_date: views::patch_date(payload.end_date, "end_date")?,
        project_status: payload.project_status,
        project_amount: views::patch_money(payload.project_amount)?,
        attachments: attachment_inputs(payload.attachments),
    };
    let project = state.engine.update_project(id, cmd).await?;

    Ok(Json(ApiResponse::ok(view(project)).with_msg("updated")))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>, ServerError> {
    state.engine.delete_project(id).await?;
    Ok(Json(ApiResponse::ok(()).with_msg("deleted")))
}

pub async fn attachments(
    State(state): State<ServerState>,
    Path(project_id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<AttachmentView>>>, ServerError> {
    let attachments = state.engine.project_attachments(project_id).await?;
    Ok(Json(ApiResponse::ok(
        attachments.into_iter().map(attachment_view).collect(),
    )))
}

/// Remove the attachment row. The stored file stays on disk.
pub async fn delete_attachment(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<AttachmentView>>, ServerError> {
    let attachment = state.engine.delete_attachment(id).await?;
    Ok(Json(
        ApiResponse::ok(attachment_view(attachment)).with_msg("deleted"),
    ))
}
