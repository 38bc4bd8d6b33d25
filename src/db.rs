use sqlx::SqlitePool;

pub async fn init_db(pool: &SqlitePool) -> anyhow::Result<()> {
    // Pragmas for better durability/performance
    if let Err(e) = sqlx::query("PRAGMA journal_mode=WAL;").execute(pool).await {
        tracing::warn!("Failed to set WAL journal mode: {}", e);
    }
    if let Err(e) = sqlx::query("PRAGMA synchronous=NORMAL;").execute(pool).await {
        tracing::warn!("Failed to set synchronous mode: {}", e);
    }
    if let Err(e) = sqlx::query("PRAGMA busy_timeout=10000;").execute(pool).await {
        tracing::warn!("Failed to set busy_timeout: {}", e);
    }

    // Reference columns carry no FOREIGN KEY clause: the store accepts orphans and
    // the configured delete policy decides what happens to dependents.
    let tables = [
        (
            "students",
            r#"CREATE TABLE IF NOT EXISTS students (
                id TEXT PRIMARY KEY CHECK (length(id) <= 10),
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                major TEXT NOT NULL
            )"#,
        ),
        (
            "professors",
            r#"CREATE TABLE IF NOT EXISTS professors (
                id TEXT PRIMARY KEY CHECK (length(id) <= 10),
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                department TEXT NOT NULL
            )"#,
        ),
        (
            "courses",
            r#"CREATE TABLE IF NOT EXISTS courses (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                code TEXT NOT NULL UNIQUE,
                credits INTEGER NOT NULL DEFAULT 3,
                professor_id TEXT NOT NULL
            )"#,
        ),
        (
            "enrollments",
            r#"CREATE TABLE IF NOT EXISTS enrollments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                student_id TEXT NOT NULL,
                course_id INTEGER NOT NULL,
                grade TEXT NULL CHECK (grade IS NULL OR length(grade) <= 2)
            )"#,
        ),
        (
            "tuition_payments",
            r#"CREATE TABLE IF NOT EXISTS tuition_payments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                student_id TEXT NOT NULL,
                course_id INTEGER NOT NULL,
                amount_paid REAL NOT NULL,
                payment_date TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'paid'
            )"#,
        ),
        (
            "id_counters",
            r#"CREATE TABLE IF NOT EXISTS id_counters (
                entity TEXT PRIMARY KEY,
                last_value INTEGER NOT NULL
            )"#,
        ),
    ];

    for (name, ddl) in tables {
        if let Err(e) = sqlx::query(ddl).execute(pool).await {
            tracing::error!("Failed to create table {}: {}", name, e);
            return Err(anyhow::anyhow!("Migration failed: {}", e));
        }
    }

    let indexes = [
        ("idx_courses_professor", "CREATE INDEX IF NOT EXISTS idx_courses_professor ON courses(professor_id)"),
        ("idx_enrollments_student", "CREATE INDEX IF NOT EXISTS idx_enrollments_student ON enrollments(student_id)"),
        ("idx_enrollments_course", "CREATE INDEX IF NOT EXISTS idx_enrollments_course ON enrollments(course_id)"),
        ("idx_payments_student", "CREATE INDEX IF NOT EXISTS idx_payments_student ON tuition_payments(student_id)"),
        ("idx_payments_course", "CREATE INDEX IF NOT EXISTS idx_payments_course ON tuition_payments(course_id)"),
    ];

    for (name, query) in indexes {
        if let Err(e) = sqlx::query(query).execute(pool).await {
            match &e {
                sqlx::Error::Database(db_err) => {
                    let msg = db_err.message().to_lowercase();
                    if msg.contains("already exists") || msg.contains("duplicate") {
                        tracing::debug!("Index {} already exists, skipping", name);
                    } else {
                        tracing::warn!("Failed to create index {}: {}", name, e);
                    }
                }
                _ => {
                    tracing::warn!("Failed to create index {}: {}", name, e);
                }
            }
        }
    }

    Ok(())
}
