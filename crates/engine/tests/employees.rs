use chrono::Utc;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    AccountDraft, AssetDraft, EmployeeDraft, EmployeeListFilter, Engine, EngineError, Role,
    Session,
};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    for sql in [
        "INSERT INTO categories (category_name) VALUES ('Компьютеры')",
        "INSERT INTO locations (location_name) VALUES ('Офис 101')",
        "INSERT INTO departments (department_name) VALUES ('ИТ')",
        "INSERT INTO departments (department_name) VALUES ('Бухгалтерия')",
        "INSERT INTO positions (position_name) VALUES ('Инженер')",
    ] {
        db.execute(Statement::from_string(backend, sql.to_string()))
            .await
            .unwrap();
    }
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

    let engine = Engine::builder().database(db.clone()).build().await.unwrap();
    (engine, db)
}

fn admin() -> Session {
    Session {
        user_id: 1,
        role: Role::Administrator,
    }
}

fn employee_draft(last: &str, first: &str) -> EmployeeDraft {
    EmployeeDraft {
        last_name: last.to_string(),
        first_name: first.to_string(),
        position_id: Some(1),
        department_id: Some(1),
        ..Default::default()
    }
}

fn account_draft(username: &str, password: Option<&str>) -> AccountDraft {
    AccountDraft {
        username: username.to_string(),
        password: password.map(ToString::to_string),
        role_id: 3,
        is_active: None,
    }
}

#[tokio::test]
async fn account_row_carries_the_generated_employee_id() {
    let (engine, db) = engine_with_db().await;
    let session = admin();

    let mut draft = employee_draft("Иванов", "Пётр");
    draft.account = Some(account_draft("ivanov", Some("pass123")));
    let employee_id = engine.create_employee(&session, &draft).await.unwrap();

    let backend = db.get_database_backend();
    let row = db
        .query_one(Statement::from_sql_and_values(
            backend,
            "SELECT employee_id AS eid, password_hash AS hash FROM users WHERE username = ?",
            vec!["ivanov".into()],
        ))
        .await
        .unwrap()
        .unwrap();
    let linked: Option<i32> = row.try_get("", "eid").unwrap();
    let hash: String = row.try_get("", "hash").unwrap();
    assert_eq!(linked, Some(employee_id));
    assert_eq!(hash, engine::md5_hex("pass123"));
}

#[tokio::test]
async fn new_account_requires_a_password() {
    let (engine, _db) = engine_with_db().await;
    let session = admin();

    let mut draft = employee_draft("Петров", "Иван");
    draft.account = Some(account_draft("petrov", None));
    let err = engine.create_employee(&session, &draft).await.unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn usernames_are_unique() {
    let (engine, _db) = engine_with_db().await;
    let session = admin();

    let mut first = employee_draft("Иванов", "Пётр");
    first.account = Some(account_draft("shared", Some("pass1")));
    engine.create_employee(&session, &first).await.unwrap();

    let mut second = employee_draft("Сидоров", "Олег");
    second.account = Some(account_draft("shared", Some("pass2")));
    let err = engine.create_employee(&session, &second).await.unwrap_err();
    assert_eq!(err, EngineError::Duplicate("shared".to_string()));
}

#[tokio::test]
async fn emails_are_unique_excluding_self() {
    let (engine, _db) = engine_with_db().await;
    let session = admin();

    let mut first = employee_draft("Иванов", "Пётр");
    first.email = Some("ivanov@example.com".to_string());
    let id = engine.create_employee(&session, &first).await.unwrap();

    let mut second = employee_draft("Сидоров", "Олег");
    second.email = Some("ivanov@example.com".to_string());
    let err = engine.create_employee(&session, &second).await.unwrap_err();
    assert_eq!(err, EngineError::Duplicate("ivanov@example.com".to_string()));

    // Updating the employee with its own email is not a collision.
    engine.update_employee(&session, id, &first).await.unwrap();
}

#[tokio::test]
async fn malformed_email_is_a_format_error() {
    let (engine, _db) = engine_with_db().await;
    let session = admin();

    let mut draft = employee_draft("Иванов", "Пётр");
    draft.email = Some("not-an-email".to_string());
    let err = engine.create_employee(&session, &draft).await.unwrap_err();
    assert!(matches!(err, EngineError::Format(_)));
}

#[tokio::test]
async fn hire_date_defaults_to_today() {
    let (engine, _db) = engine_with_db().await;
    let session = admin();

    let id = engine
        .create_employee(&session, &employee_draft("Иванов", "Пётр"))
        .await
        .unwrap();

    let page = engine
        .list_employees(&session, &EmployeeListFilter::default())
        .await
        .unwrap();
    let row = page.items.iter().find(|e| e.employee_id == id).unwrap();
    assert_eq!(row.hire_date, Utc::now().date_naive());
}

#[tokio::test]
async fn unchecking_the_account_toggle_deactivates_but_keeps_the_row() {
    let (engine, db) = engine_with_db().await;
    let session = admin();

    let mut draft = employee_draft("Иванов", "Пётр");
    draft.account = Some(account_draft("ivanov", Some("pass123")));
    let id = engine.create_employee(&session, &draft).await.unwrap();

    let without_account = employee_draft("Иванов", "Пётр");
    engine
        .update_employee(&session, id, &without_account)
        .await
        .unwrap();

    let backend = db.get_database_backend();
    let row = db
        .query_one(Statement::from_sql_and_values(
            backend,
            "SELECT is_active AS active FROM users WHERE username = ?",
            vec!["ivanov".into()],
        ))
        .await
        .unwrap()
        .unwrap();
    let active: bool = row.try_get("", "active").unwrap();
    assert!(!active);
}

#[tokio::test]
async fn omitted_password_keeps_the_stored_hash() {
    let (engine, db) = engine_with_db().await;
    let session = admin();

    let mut draft = employee_draft("Иванов", "Пётр");
    draft.account = Some(account_draft("ivanov", Some("original")));
    let id = engine.create_employee(&session, &draft).await.unwrap();

    // Update without a password: hash untouched.
    let mut update = employee_draft("Иванов", "Пётр");
    update.account = Some(account_draft("ivanov", None));
    engine.update_employee(&session, id, &update).await.unwrap();

    let backend = db.get_database_backend();
    let fetch_hash = || async {
        let row = db
            .query_one(Statement::from_sql_and_values(
                backend,
                "SELECT password_hash AS hash FROM users WHERE username = ?",
                vec!["ivanov".into()],
            ))
            .await
            .unwrap()
            .unwrap();
        let hash: String = row.try_get("", "hash").unwrap();
        hash
    };
    assert_eq!(fetch_hash().await, engine::md5_hex("original"));

    // Update with a password: hash replaced.
    let mut update = employee_draft("Иванов", "Пётр");
    update.account = Some(account_draft("ivanov", Some("rotated")));
    engine.update_employee(&session, id, &update).await.unwrap();
    assert_eq!(fetch_hash().await, engine::md5_hex("rotated"));
}

#[tokio::test]
async fn toggle_flips_the_linked_account() {
    let (engine, _db) = engine_with_db().await;
    let session = admin();

    let mut draft = employee_draft("Иванов", "Пётр");
    draft.account = Some(account_draft("ivanov", Some("pass123")));
    let with_account = engine.create_employee(&session, &draft).await.unwrap();

    assert!(!engine
        .toggle_employee_status(&session, with_account)
        .await
        .unwrap());
    assert!(engine
        .toggle_employee_status(&session, with_account)
        .await
        .unwrap());

    let without_account = engine
        .create_employee(&session, &employee_draft("Сидоров", "Олег"))
        .await
        .unwrap();
    let err = engine
        .toggle_employee_status(&session, without_account)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn delete_is_blocked_while_assets_are_assigned() {
    let (engine, db) = engine_with_db().await;
    let session = admin();

    let mut draft = employee_draft("Иванов", "Пётр");
    draft.account = Some(account_draft("ivanov", Some("pass123")));
    let employee_id = engine.create_employee(&session, &draft).await.unwrap();

    let asset = AssetDraft {
        code: "AST-1".to_string(),
        name: "Ноутбук".to_string(),
        category_id: Some(1),
        status_id: Some(1),
        location_id: Some(1),
        responsible_employee_id: Some(employee_id),
        ..Default::default()
    };
    let asset_id = engine.create_asset(&session, &asset).await.unwrap();

    let err = engine
        .delete_employee(&session, employee_id)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));

    // Unassign and retry: both the employee and the account row go away.
    engine.delete_assets(&session, &[asset_id]).await.unwrap();
    engine.delete_employee(&session, employee_id).await.unwrap();

    let backend = db.get_database_backend();
    let row = db
        .query_one(Statement::from_sql_and_values(
            backend,
            "SELECT COUNT(*) AS cnt FROM users WHERE employee_id = ?",
            vec![employee_id.into()],
        ))
        .await
        .unwrap()
        .unwrap();
    let cnt: i64 = row.try_get("", "cnt").unwrap();
    assert_eq!(cnt, 0);
}

#[tokio::test]
async fn delete_is_admin_only() {
    let (engine, _db) = engine_with_db().await;
    let session = admin();
    let manager = Session {
        user_id: 1,
        role: Role::Manager,
    };

    let id = engine
        .create_employee(&session, &employee_draft("Иванов", "Пётр"))
        .await
        .unwrap();
    assert!(matches!(
        engine.delete_employee(&manager, id).await.unwrap_err(),
        EngineError::Forbidden(_)
    ));
}

#[tokio::test]
async fn listing_filters_by_account_activity_and_department() {
    let (engine, _db) = engine_with_db().await;
    let session = admin();

    // Active account.
    let mut active = employee_draft("Иванов", "Пётр");
    active.account = Some(account_draft("ivanov", Some("pass1")));
    engine.create_employee(&session, &active).await.unwrap();

    // Deactivated account.
    let mut inactive = employee_draft("Петров", "Иван");
    inactive.account = Some(AccountDraft {
        username: "petrov".to_string(),
        password: Some("pass2".to_string()),
        role_id: 3,
        is_active: Some(false),
    });
    engine.create_employee(&session, &inactive).await.unwrap();

    // No account at all, other department.
    let mut no_account = employee_draft("Сидорова", "Анна");
    no_account.department_id = Some(2);
    engine.create_employee(&session, &no_account).await.unwrap();

    let all = engine
        .list_employees(&session, &EmployeeListFilter::default())
        .await
        .unwrap();
    assert_eq!(all.total_items, 3);

    let active_only = engine
        .list_employees(
            &session,
            &EmployeeListFilter {
                active: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    // Employees without an account count as active.
    assert_eq!(active_only.total_items, 2);

    let inactive_only = engine
        .list_employees(
            &session,
            &EmployeeListFilter {
                active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(inactive_only.total_items, 1);
    assert_eq!(inactive_only.items[0].full_name, "Петров Иван");

    let by_department = engine
        .list_employees(
            &session,
            &EmployeeListFilter {
                department_id: Some(2),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(by_department.total_items, 1);
    assert_eq!(by_department.items[0].department_name, "Бухгалтерия");

    let by_email = engine
        .list_employees(
            &session,
            &EmployeeListFilter {
                search: Some("ivanov@".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    // No email on these employees, so nothing matches.
    assert_eq!(by_email.total_items, 0);
}
