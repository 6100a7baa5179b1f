use chrono::Utc;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{Engine, EngineError, Role, Session};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO users (username, password_hash, role_id, is_active, created_date) \
         VALUES (?, ?, 1, ?, ?)",
        vec![
            "admin".into(),
            engine::md5_hex("secret").into(),
            true.into(),
            Utc::now().into(),
        ],
    ))
    .await
    .unwrap();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO users (username, password_hash, role_id, is_active, created_date) \
         VALUES (?, ?, 3, ?, ?)",
        vec![
            "fired".into(),
            engine::md5_hex("gone").into(),
            false.into(),
            Utc::now().into(),
        ],
    ))
    .await
    .unwrap();

    let engine = Engine::builder().database(db.clone()).build().await.unwrap();
    (engine, db)
}

#[tokio::test]
async fn login_returns_the_role_and_stamps_last_login() {
    let (engine, db) = engine_with_db().await;

    let session = engine.login("admin", "secret").await.unwrap();
    assert_eq!(session.role, Role::Administrator);

    let backend = db.get_database_backend();
    let row = db
        .query_one(Statement::from_string(
            backend,
            "SELECT COUNT(*) AS cnt FROM users \
             WHERE username = 'admin' AND last_login_date IS NOT NULL"
                .to_string(),
        ))
        .await
        .unwrap()
        .unwrap();
    let cnt: i64 = row.try_get("", "cnt").unwrap();
    assert_eq!(cnt, 1);
}

#[tokio::test]
async fn wrong_password_unknown_user_and_inactive_account_fail_alike() {
    let (engine, _db) = engine_with_db().await;

    let wrong_password = engine.login("admin", "nope").await.unwrap_err();
    let unknown_user = engine.login("ghost", "secret").await.unwrap_err();
    let inactive = engine.login("fired", "gone").await.unwrap_err();

    assert_eq!(wrong_password, unknown_user);
    assert_eq!(unknown_user, inactive);
    assert!(matches!(wrong_password, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn blank_credentials_are_rejected_before_the_query() {
    let (engine, _db) = engine_with_db().await;

    assert!(matches!(
        engine.login("  ", "secret").await.unwrap_err(),
        EngineError::Validation(_)
    ));
    assert!(matches!(
        engine.login("admin", "").await.unwrap_err(),
        EngineError::Validation(_)
    ));
}

#[tokio::test]
async fn change_password_verifies_the_current_one() {
    let (engine, _db) = engine_with_db().await;
    let session = Session {
        user_id: 1,
        role: Role::Administrator,
    };

    let err = engine
        .change_password(&session, "wrong", "new-password")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    engine
        .change_password(&session, "secret", "new-password")
        .await
        .unwrap();

    assert!(engine.login("admin", "secret").await.is_err());
    engine.login("admin", "new-password").await.unwrap();
}
