use chrono::NaiveDate;
use sea_orm::{Database, DatabaseConnection};

use engine::{
    AttachmentInput, AttachmentNew, Engine, EngineError, PageRequest, ProjectFilter, ProjectNew,
    ProjectUpdate,
};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

fn project_cmd(name: &str) -> ProjectNew {
    ProjectNew {
        project_name: name.to_string(),
        project_status: Some("in progress".to_string()),
        project_amount: Some("250000.00".parse().unwrap()),
        ..Default::default()
    }
}

fn upload(code: &str, filename: &str) -> AttachmentInput {
    AttachmentInput {
        attachment_code: Some(code.to_string()),
        filename: Some(filename.to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn project_created_with_new_attachments() {
    let (engine, _db) = engine_with_db().await;

    let project = engine
        .new_project(ProjectNew {
            attachments: Some(vec![
                upload("PLAN", "plan_20260101_080000.pdf"),
                AttachmentInput {
                    url: Some("/uploads/photo_20260101_080000.jpg".to_string()),
                    ..Default::default()
                },
                AttachmentInput::default(),
            ]),
            ..project_cmd("Riverside park")
        })
        .await
        .unwrap();

    assert_eq!(project.attachments.len(), 2);
    assert_eq!(project.attachments[0].attachment_code, "PLAN");
    assert_eq!(
        project.attachments[0].file_path,
        "/uploads/plan_20260101_080000.pdf"
    );
    assert_eq!(project.attachments[1].filename, "photo_20260101_080000.jpg");
}

#[tokio::test]
async fn new_project_relinks_existing_attachment() {
    let (engine, _db) = engine_with_db().await;
    let old = engine.new_project(project_cmd("Old site")).await.unwrap();
    let attachment = engine
        .new_attachment(AttachmentNew {
            project_id: old.id,
            attachment_code: "SURVEY".to_string(),
            filename: "survey_20260101_080000.dwg".to_string(),
            original_filename: "survey.dwg".to_string(),
            file_path: "/uploads/survey_20260101_080000.dwg".to_string(),
            file_size: 2048,
        })
        .await
        .unwrap();

    let new = engine
        .new_project(ProjectNew {
            attachments: Some(vec![AttachmentInput {
                id: Some(attachment.id),
                attachment_code: Some("SURVEY-2".to_string()),
                ..Default::default()
            }]),
            ..project_cmd("New site")
        })
        .await
        .unwrap();

    assert_eq!(new.attachments.len(), 1);
    assert_eq!(new.attachments[0].id, attachment.id);
    assert_eq!(new.attachments[0].attachment_code, "SURVEY-2");
    assert!(engine.project_attachments(old.id).await.unwrap().is_empty());

    let err = engine
        .new_project(ProjectNew {
            attachments: Some(vec![AttachmentInput {
                id: Some(9_999),
                ..Default::default()
            }]),
            ..project_cmd("Ghost")
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn update_replaces_attachment_list() {
    let (engine, _db) = engine_with_db().await;
    let project = engine
        .new_project(ProjectNew {
            attachments: Some(vec![
                upload("A", "a_20260101_080000.pdf"),
                upload("B", "b_20260101_080000.pdf"),
            ]),
            ..project_cmd("Riverside park")
        })
        .await
        .unwrap();
    let keep = project.attachments[0].id;

    let updated = engine
        .update_project(
            project.id,
            ProjectUpdate {
                project_status: Some("done".to_string()),
                attachments: Some(vec![
                    AttachmentInput {
                        id: Some(keep),
                        attachment_code: Some("A2".to_string()),
                        ..Default::default()
                    },
                    upload("C", "c_20260101_080000.pdf"),
                ]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.project_status.as_deref(), Some("done"));
    let codes: Vec<&str> = updated
        .attachments
        .iter()
        .map(|a| a.attachment_code.as_str())
        .collect();
    assert_eq!(codes, vec!["A2", "C"]);

    // Without a list the attachments stay as they are.
    let untouched = engine
        .update_project(
            project.id,
            ProjectUpdate {
                project_scale: Some("12 ha".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(untouched.attachments.len(), 2);

    // An empty list removes everything.
    let cleared = engine
        .update_project(
            project.id,
            ProjectUpdate {
                attachments: Some(Vec::new()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(cleared.attachments.is_empty());
}

#[tokio::test]
async fn update_clears_dates_and_amount() {
    let (engine, _db) = engine_with_db().await;
    let start = NaiveDate::from_ymd_opt(2026, 1, 1);
    let project = engine
        .new_project(ProjectNew {
            start_date: start,
            end_date: NaiveDate::from_ymd_opt(2026, 12, 31),
            ..project_cmd("Riverside park")
        })
        .await
        .unwrap();

    let cleared = engine
        .update_project(
            project.id,
            ProjectUpdate {
                end_date: Some(None),
                project_amount: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(cleared.start_date, start);
    assert_eq!(cleared.end_date, None);
    assert_eq!(cleared.project_amount, None);

    let err = engine
        .update_project(
            project.id,
            ProjectUpdate {
                project_amount: Some(Some("-1.00".parse().unwrap())),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));
}

#[tokio::test]
async fn delete_project_removes_attachments() {
    let (engine, _db) = engine_with_db().await;
    let project = engine
        .new_project(ProjectNew {
            attachments: Some(vec![upload("A", "a_20260101_080000.pdf")]),
            ..project_cmd("Riverside park")
        })
        .await
        .unwrap();
    let attachment_id = project.attachments[0].id;

    engine.delete_project(project.id).await.unwrap();

    let err = engine.project(project.id).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
    let err = engine.delete_attachment(attachment_id).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn list_projects_filters_and_embeds_attachments() {
    let (engine, _db) = engine_with_db().await;
    engine
        .new_project(ProjectNew {
            attachments: Some(vec![upload("A", "a_20260101_080000.pdf")]),
            ..project_cmd("Riverside park")
        })
        .await
        .unwrap();
    engine
        .new_project(ProjectNew {
            project_amount: Some("1200.00".parse().unwrap()),
            ..project_cmd("Hill garden")
        })
        .await
        .unwrap();

    let page = engine
        .list_projects(
            &ProjectFilter {
                project_name: Some("River".to_string()),
                ..Default::default()
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].attachments.len(), 1);

    let page = engine
        .list_projects(
            &ProjectFilter {
                project_amount: Some("1200".to_string()),
                ..Default::default()
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].project_name, "Hill garden");
}

#[tokio::test]
async fn attachment_requires_existing_project_and_code() {
    let (engine, _db) = engine_with_db().await;

    let cmd = AttachmentNew {
        project_id: 404,
        attachment_code: "X".to_string(),
        filename: "x_20260101_080000.txt".to_string(),
        original_filename: "x.txt".to_string(),
        file_path: "/uploads/x_20260101_080000.txt".to_string(),
        file_size: 1,
    };
    let err = engine.new_attachment(cmd.clone()).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    let project = engine.new_project(project_cmd("Riverside park")).await.unwrap();
    let err = engine
        .new_attachment(AttachmentNew {
            project_id: project.id,
            attachment_code: " ".to_string(),
            ..cmd.clone()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));

    let attachment = engine
        .new_attachment(AttachmentNew {
            project_id: project.id,
            ..cmd
        })
        .await
        .unwrap();
    let removed = engine.delete_attachment(attachment.id).await.unwrap();
    assert_eq!(removed.filename, "x_20260101_080000.txt");
}
