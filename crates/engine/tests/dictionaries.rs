use sea_orm::{Database, DatabaseConnection};

use engine::{
    DictionaryDetailNew, DictionaryDetailUpdate, DictionaryNew, DictionaryUpdate, Engine,
    EngineError, PageRequest,
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

#[tokio::test]
async fn seeded_dictionaries_are_available() {
    let (engine, _db) = engine_with_db().await;

    let statuses = engine.dictionary_details_by_code("fkzt").await.unwrap();
    let codes: Vec<&str> = statuses.iter().map(|d| d.code.as_str()).collect();
    assert_eq!(codes, vec!["unpaid", "partially_paid", "paid"]);

    let types = engine.dictionary_details_by_code("gyslx").await.unwrap();
    assert_eq!(types.len(), 2);

    let err = engine
        .dictionary_details_by_code("missing")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn dictionary_crud_records_audit_users() {
    let (engine, _db) = engine_with_db().await;

    let dictionary = engine
        .new_dictionary(
            DictionaryNew {
                code: "unit".to_string(),
                name: "Units".to_string(),
            },
            "alice",
        )
        .await
        .unwrap();
    assert_eq!(dictionary.valid_mark, "Y");
    assert_eq!(dictionary.create_user.as_deref(), Some("alice"));

    let err = engine
        .new_dictionary(
            DictionaryNew {
                code: "unit".to_string(),
                name: "Again".to_string(),
            },
            "alice",
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));

    let dictionary = engine
        .update_dictionary(
            dictionary.id,
            DictionaryUpdate {
                name: Some("Measurement units".to_string()),
                valid_mark: Some("n".to_string()),
                ..Default::default()
            },
            "bob",
        )
        .await
        .unwrap();
    assert_eq!(dictionary.name, "Measurement units");
    assert_eq!(dictionary.valid_mark, "N");
    assert_eq!(dictionary.update_user.as_deref(), Some("bob"));

    let page = engine
        .list_dictionaries(Some("Measure"), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.total, 1);
}

#[tokio::test]
async fn details_are_ordered_and_block_dictionary_delete() {
    let (engine, _db) = engine_with_db().await;
    let dictionary = engine
        .new_dictionary(
            DictionaryNew {
                code: "unit".to_string(),
                name: "Units".to_string(),
            },
            "alice",
        )
        .await
        .unwrap();

    let tree = engine
        .new_dictionary_detail(
            DictionaryDetailNew {
                dic_id: dictionary.id,
                code: "tree".to_string(),
                value: "Tree".to_string(),
                order_no: None,
            },
            "alice",
        )
        .await
        .unwrap();
    let pot = engine
        .new_dictionary_detail(
            DictionaryDetailNew {
                dic_id: dictionary.id,
                code: "pot".to_string(),
                value: "Pot".to_string(),
                order_no: None,
            },
            "alice",
        )
        .await
        .unwrap();
    assert_eq!(tree.order_no, 1);
    assert_eq!(pot.order_no, 2);

    engine
        .update_dictionary_detail(
            pot.id,
            DictionaryDetailUpdate {
                order_no: Some(0),
                ..Default::default()
            },
            "bob",
        )
        .await
        .unwrap();
    let page = engine
        .list_dictionary_details(Some(dictionary.id), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.total, 2);
    assert_eq!(page.items[0].code, "pot");

    engine
        .update_dictionary_detail(
            tree.id,
            DictionaryDetailUpdate {
                valid_mark: Some("N".to_string()),
                ..Default::default()
            },
            "bob",
        )
        .await
        .unwrap();
    let valid = engine.dictionary_details_by_code("unit").await.unwrap();
    assert_eq!(valid.len(), 1);

    let err = engine.delete_dictionary(dictionary.id).await.unwrap_err();
    assert!(matches!(err, EngineError::InUse(_)));

    engine.delete_dictionary_detail(tree.id).await.unwrap();
    engine.delete_dictionary_detail(pot.id).await.unwrap();
    engine.delete_dictionary(dictionary.id).await.unwrap();
}

#[tokio::test]
async fn users_authenticate_with_hashed_password() {
    let (engine, _db) = engine_with_db().await;

    let user = engine.new_user("alice", "correct horse").await.unwrap();
    assert_eq!(user.username, "alice");

    let err = engine.new_user("alice", "another password").await.unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));
    let err = engine.new_user("bob", "short").await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));

    assert_eq!(
        engine.authenticate("alice", "correct horse").await.unwrap(),
        user
    );
    assert_eq!(
        engine.authenticate("alice", "wrong").await.unwrap_err(),
        EngineError::Unauthorized
    );
    assert_eq!(
        engine.authenticate("nobody", "correct horse").await.unwrap_err(),
        EngineError::Unauthorized
    );
}
