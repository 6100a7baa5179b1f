use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    AssetDraft, AssetListFilter, CategoryDraft, Engine, EngineError, Role, Session,
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

fn draft(code: &str, name: &str) -> AssetDraft {
    AssetDraft {
        code: code.to_string(),
        name: name.to_string(),
        category_id: Some(1),
        status_id: Some(1),
        location_id: Some(1),
        ..Default::default()
    }
}

fn filter_search(term: &str) -> AssetListFilter {
    AssetListFilter {
        search: Some(term.to_string()),
        page: 1,
        page_size: 20,
        ..Default::default()
    }
}

#[tokio::test]
async fn duplicate_code_rejected_but_own_code_kept_on_update() {
    let (engine, _db) = engine_with_db().await;
    let session = admin();

    let id = engine
        .create_asset(&session, &draft("AST-1", "Ноутбук"))
        .await
        .unwrap();

    let err = engine
        .create_asset(&session, &draft("AST-1", "Другой ноутбук"))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::Duplicate("AST-1".to_string()));

    // Re-submitting the asset's own code on update is fine.
    engine
        .update_asset(&session, id, &draft("AST-1", "Ноутбук (обновлён)"))
        .await
        .unwrap();

    let page = engine
        .list_assets(&session, &filter_search("AST-1"))
        .await
        .unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].asset_name, "Ноутбук (обновлён)");
}

#[tokio::test]
async fn price_text_is_parsed_on_save() {
    let (engine, _db) = engine_with_db().await;
    let session = admin();

    let mut with_locale_price = draft("AST-2", "Принтер");
    with_locale_price.price_text = Some("12 345,67 ₽".to_string());
    engine
        .create_asset(&session, &with_locale_price)
        .await
        .unwrap();

    let mut with_dot_price = draft("AST-3", "Сканер");
    with_dot_price.price_text = Some("12345.67".to_string());
    engine.create_asset(&session, &with_dot_price).await.unwrap();

    let mut no_price = draft("AST-4", "Стол");
    no_price.price_text = Some("".to_string());
    engine.create_asset(&session, &no_price).await.unwrap();

    let expected = Decimal::new(12_345_67, 2);
    for (code, price) in [
        ("AST-2", Some(expected)),
        ("AST-3", Some(expected)),
        ("AST-4", None),
    ] {
        let page = engine
            .list_assets(&session, &filter_search(code))
            .await
            .unwrap();
        assert_eq!(page.items[0].purchase_price, price, "code {code}");
    }

    let mut bad = draft("AST-5", "Кресло");
    bad.price_text = Some("abc".to_string());
    let err = engine.create_asset(&session, &bad).await.unwrap_err();
    assert!(matches!(err, EngineError::Format(_)));
}

#[tokio::test]
async fn missing_required_fields_are_validation_errors() {
    let (engine, _db) = engine_with_db().await;
    let session = admin();

    let mut no_name = draft("AST-6", "  ");
    no_name.name = "  ".to_string();
    assert!(matches!(
        engine.create_asset(&session, &no_name).await.unwrap_err(),
        EngineError::Validation(_)
    ));

    let mut no_category = draft("AST-6", "Монитор");
    no_category.category_id = None;
    assert!(matches!(
        engine.create_asset(&session, &no_category).await.unwrap_err(),
        EngineError::Validation(_)
    ));
}

#[tokio::test]
async fn disposed_status_forces_inactive() {
    let (engine, _db) = engine_with_db().await;
    let session = admin();

    // The seeded status list is Активен(1), На складе(2), На ремонте(3),
    // Списан(4).
    let mut disposed = draft("AST-7", "Старый сервер");
    disposed.status_id = Some(4);
    disposed.is_active = Some(true);
    engine.create_asset(&session, &disposed).await.unwrap();

    let page = engine
        .list_assets(&session, &filter_search("AST-7"))
        .await
        .unwrap();
    assert_eq!(page.items[0].status_name, "Списан");
    assert!(!page.items[0].is_active);

    let active = draft("AST-8", "Новый сервер");
    engine.create_asset(&session, &active).await.unwrap();
    let page = engine
        .list_assets(&session, &filter_search("AST-8"))
        .await
        .unwrap();
    assert!(page.items[0].is_active);
}

#[tokio::test]
async fn dispose_batch_updates_all_and_stamps_modifier() {
    let (engine, db) = engine_with_db().await;
    let session = admin();

    let mut ids = Vec::new();
    for i in 1..=3 {
        ids.push(
            engine
                .create_asset(&session, &draft(&format!("DSP-{i}"), "Системный блок"))
                .await
                .unwrap(),
        );
    }

    let count = engine.dispose_assets(&session, &ids).await.unwrap();
    assert_eq!(count, 3);

    let page = engine
        .list_assets(&session, &filter_search("DSP-"))
        .await
        .unwrap();
    assert_eq!(page.items.len(), 3);
    assert!(
        page.items
            .iter()
            .all(|a| a.status_name == "Списан" && !a.is_active)
    );

    let backend = db.get_database_backend();
    for id in ids {
        let row = db
            .query_one(Statement::from_sql_and_values(
                backend,
                "SELECT modified_by_user_id AS uid FROM assets \
                 WHERE asset_id = ? AND modified_date IS NOT NULL",
                vec![id.into()],
            ))
            .await
            .unwrap()
            .unwrap();
        let uid: Option<i32> = row.try_get("", "uid").unwrap();
        assert_eq!(uid, Some(1));
    }
}

#[tokio::test]
async fn dispose_fails_whole_batch_when_disposed_status_missing() {
    let (engine, db) = engine_with_db().await;
    let session = admin();

    let id = engine
        .create_asset(&session, &draft("DSP-9", "Стеллаж"))
        .await
        .unwrap();

    let backend = db.get_database_backend();
    db.execute(Statement::from_string(
        backend,
        "DELETE FROM asset_statuses WHERE status_name = 'Списан'".to_string(),
    ))
    .await
    .unwrap();

    let err = engine.dispose_assets(&session, &[id]).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    // Nothing changed.
    let page = engine
        .list_assets(&session, &filter_search("DSP-9"))
        .await
        .unwrap();
    assert_eq!(page.items[0].status_name, "Активен");
    assert!(page.items[0].is_active);
}

#[tokio::test]
async fn hard_delete_skips_assets_with_movement_history() {
    let (engine, db) = engine_with_db().await;
    let session = admin();

    let backend = db.get_database_backend();
    db.execute(Statement::from_string(
        backend,
        "INSERT INTO locations (location_name) VALUES ('Склад')".to_string(),
    ))
    .await
    .unwrap();

    let moved = engine
        .create_asset(&session, &draft("DEL-1", "Проектор"))
        .await
        .unwrap();
    let plain = engine
        .create_asset(&session, &draft("DEL-2", "Экран"))
        .await
        .unwrap();

    engine
        .move_asset(&session, moved, 2, Some("переезд на склад"))
        .await
        .unwrap();

    let outcome = engine
        .delete_assets(&session, &[moved, plain])
        .await
        .unwrap();
    assert_eq!(outcome.deleted, vec![plain]);
    assert_eq!(outcome.skipped, vec![moved]);

    let page = engine
        .list_assets(&session, &filter_search("DEL-"))
        .await
        .unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].asset_code, "DEL-1");
    assert_eq!(page.items[0].location_name, "Склад");
}

#[tokio::test]
async fn move_asset_records_history_row() {
    let (engine, db) = engine_with_db().await;
    let session = admin();

    let backend = db.get_database_backend();
    db.execute(Statement::from_string(
        backend,
        "INSERT INTO locations (location_name) VALUES ('Склад')".to_string(),
    ))
    .await
    .unwrap();

    let id = engine
        .create_asset(&session, &draft("MOV-1", "Кондиционер"))
        .await
        .unwrap();
    engine.move_asset(&session, id, 2, None).await.unwrap();

    let row = db
        .query_one(Statement::from_sql_and_values(
            backend,
            "SELECT COUNT(*) AS cnt FROM asset_movements WHERE asset_id = ?",
            vec![id.into()],
        ))
        .await
        .unwrap()
        .unwrap();
    let cnt: i64 = row.try_get("", "cnt").unwrap();
    assert_eq!(cnt, 1);
}

#[tokio::test]
async fn listing_paginates_and_clamps_the_requested_page() {
    let (engine, _db) = engine_with_db().await;
    let session = admin();

    for i in 0..45 {
        engine
            .create_asset(&session, &draft(&format!("PAG-{i:02}"), "Телефон"))
            .await
            .unwrap();
    }

    let page = engine
        .list_assets(&session, &filter_search("PAG"))
        .await
        .unwrap();
    assert_eq!(page.total_items, 45);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.items.len(), 20);
    // Most recent first.
    assert_eq!(page.items[0].asset_code, "PAG-44");

    let mut last = filter_search("PAG");
    last.page = 3;
    let page = engine.list_assets(&session, &last).await.unwrap();
    assert_eq!(page.items.len(), 5);

    // Page 4 survives a filter change that narrows the total to 10 rows:
    // it clamps back to page 1.
    let mut narrowed = filter_search("PAG-3");
    narrowed.page = 4;
    let page = engine.list_assets(&session, &narrowed).await.unwrap();
    assert_eq!(page.total_items, 10);
    assert_eq!(page.total_pages, 1);
    assert_eq!(page.page, 1);
    assert_eq!(page.items.len(), 10);

    // Page size 0 disables pagination.
    let mut all = filter_search("PAG");
    all.page_size = engine::NO_LIMIT;
    let page = engine.list_assets(&session, &all).await.unwrap();
    assert_eq!(page.items.len(), 45);
    assert_eq!(page.total_pages, 1);
}

#[tokio::test]
async fn search_matches_code_name_model_and_serial() {
    let (engine, _db) = engine_with_db().await;
    let session = admin();

    let mut d = draft("SRCH-1", "Ultrabook");
    d.model = Some("ThinkPad X1".to_string());
    d.serial_number = Some("SN-778899".to_string());
    engine.create_asset(&session, &d).await.unwrap();

    for term in ["srch-1", "ultrabook", "thinkpad", "778899"] {
        let page = engine
            .list_assets(&session, &filter_search(term))
            .await
            .unwrap();
        assert_eq!(page.items.len(), 1, "term {term}");
    }

    let page = engine
        .list_assets(&session, &filter_search("nothing-matches"))
        .await
        .unwrap();
    assert!(page.items.is_empty());
}

#[tokio::test]
async fn mutations_are_role_gated() {
    let (engine, _db) = engine_with_db().await;
    let plain_user = Session {
        user_id: 1,
        role: Role::User,
    };
    let manager = Session {
        user_id: 1,
        role: Role::Manager,
    };

    assert!(matches!(
        engine
            .create_asset(&plain_user, &draft("GT-1", "Ноутбук"))
            .await
            .unwrap_err(),
        EngineError::Forbidden(_)
    ));
    assert!(matches!(
        engine.dispose_assets(&plain_user, &[1]).await.unwrap_err(),
        EngineError::Forbidden(_)
    ));
    // Hard delete is administrator-only: a manager is refused too.
    assert!(matches!(
        engine.delete_assets(&manager, &[1]).await.unwrap_err(),
        EngineError::Forbidden(_)
    ));
}

#[tokio::test]
async fn category_delete_blocked_while_assets_reference_it() {
    let (engine, _db) = engine_with_db().await;
    let session = admin();

    engine
        .create_asset(&session, &draft("CAT-1", "Моноблок"))
        .await
        .unwrap();

    let err = engine.delete_category(&session, 1).await.unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));

    let unused = engine
        .save_category(
            &session,
            &CategoryDraft {
                category_id: None,
                name: "Мебель".to_string(),
                description: None,
            },
        )
        .await
        .unwrap();
    engine.delete_category(&session, unused).await.unwrap();
}

#[tokio::test]
async fn category_names_are_unique_case_insensitively() {
    let (engine, _db) = engine_with_db().await;
    let session = admin();

    engine
        .save_category(
            &session,
            &CategoryDraft {
                category_id: None,
                name: "Printers".to_string(),
                description: None,
            },
        )
        .await
        .unwrap();

    let err = engine
        .save_category(
            &session,
            &CategoryDraft {
                category_id: None,
                name: "printers".to_string(),
                description: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Duplicate(_)));
}

#[tokio::test]
async fn lookups_are_sorted_by_name() {
    let (engine, _db) = engine_with_db().await;
    let session = admin();

    let lookups = engine.lookups(&session).await.unwrap();
    let status_names: Vec<&str> = lookups.statuses.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(
        status_names,
        vec!["Активен", "На ремонте", "На складе", "Списан"]
    );
    assert_eq!(lookups.roles.len(), 3);
}

#[tokio::test]
async fn dashboard_stats_reflect_status_counts() {
    let (engine, _db) = engine_with_db().await;
    let session = admin();

    for i in 1..=3 {
        engine
            .create_asset(&session, &draft(&format!("ST-{i}"), "Ноутбук"))
            .await
            .unwrap();
    }
    let mut repair = draft("ST-4", "Принтер");
    repair.status_id = Some(3);
    engine.create_asset(&session, &repair).await.unwrap();
    let disposed = engine
        .create_asset(&session, &draft("ST-5", "Факс"))
        .await
        .unwrap();
    engine.dispose_assets(&session, &[disposed]).await.unwrap();

    let snapshot = engine.refresh_dashboard_stats(&session).await.unwrap();
    assert_eq!(snapshot.total_assets, 4); // active rows only
    assert_eq!(snapshot.active_assets, 3);
    assert_eq!(snapshot.in_repair_assets, 1);
    assert_eq!(snapshot.disposed_assets, 1);

    let breakdown = engine.category_breakdown(&session).await.unwrap();
    assert_eq!(breakdown.len(), 1);
    assert_eq!(breakdown[0].count, 4);
    assert!((breakdown[0].percentage - 100.0).abs() < f64::EPSILON);

    let recent = engine.recent_assets(&session, 2).await.unwrap();
    assert_eq!(recent.len(), 2);
}
