use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};

pub async fn init_db(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(database_url).await?;

    // Run migrations manually (simple SQL)
    run_migrations(&db).await?;

    Ok(db)
}

async fn run_migrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS items (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            purchase_date TEXT NOT NULL,
            price REAL NOT NULL,
            receipt_photo TEXT,
            item_photo TEXT,
            status TEXT NOT NULL DEFAULT 'available',
            bag_id TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#
        .to_owned(),
    ))
    .await?;

    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS bags (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            responsible TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'available',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#
        .to_owned(),
    ))
    .await?;

    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS events (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            date TEXT NOT NULL,
            time TEXT NOT NULL,
            location TEXT NOT NULL,
            customer TEXT NOT NULL,
            responsible TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'active',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#
        .to_owned(),
    ))
    .await?;

    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS event_bags (
            event_id TEXT NOT NULL,
            bag_id TEXT NOT NULL,
            PRIMARY KEY (event_id, bag_id)
        )
        "#
        .to_owned(),
    ))
    .await?;

    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS activity_logs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            action TEXT NOT NULL,
            table_name TEXT NOT NULL,
            record_id TEXT,
            old_data TEXT,
            new_data TEXT,
            actor TEXT,
            created_at TEXT NOT NULL
        )
        "#
        .to_owned(),
    ))
    .await?;

    // Lookup indexes for the hot filters
    for sql in [
        "CREATE INDEX IF NOT EXISTS idx_items_bag_id ON items (bag_id)",
        "CREATE INDEX IF NOT EXISTS idx_items_status ON items (status)",
        "CREATE INDEX IF NOT EXISTS idx_logs_action ON activity_logs (action)",
        "CREATE INDEX IF NOT EXISTS idx_logs_table_name ON activity_logs (table_name)",
        "CREATE INDEX IF NOT EXISTS idx_logs_created_at ON activity_logs (created_at)",
    ] {
        db.execute(Statement::from_string(
            db.get_database_backend(),
            sql.to_owned(),
        ))
        .await?;
    }

    Ok(())
}
