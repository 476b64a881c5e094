//! Table creation, in-place migrations of older databases, seed data and
//! schema inspection.
//!
//! MySQL commits DDL implicitly, so each step is its own statement and every
//! step checks `information_schema` first. Running any of these twice is a
//! no-op.

use serde::Serialize;
use sqlx::MySqlPool;
use utoipa::ToSchema;

/// Every table owned by the service, in dependency order.
pub const TABLES: [&str; 7] = [
    "departments",
    "employees",
    "attendance",
    "leave_requests",
    "payroll",
    "salary_advances",
    "announcements",
];

const CREATE_TABLES: [&str; 7] = [
    r#"
    CREATE TABLE IF NOT EXISTS departments (
        id BIGINT UNSIGNED AUTO_INCREMENT PRIMARY KEY,
        name VARCHAR(100) NOT NULL,
        description TEXT NULL,
        created_at TIMESTAMP NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at TIMESTAMP NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP,
        UNIQUE KEY uq_departments_name (name)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS employees (
        id BIGINT UNSIGNED AUTO_INCREMENT PRIMARY KEY,
        name VARCHAR(100) NOT NULL,
        email VARCHAR(100) NOT NULL,
        phone VARCHAR(20) NULL,
        department_id BIGINT UNSIGNED NULL,
        position VARCHAR(100) NULL,
        salary DECIMAL(10, 2) NULL,
        experience VARCHAR(50) NULL,
        hire_date DATE NULL,
        status VARCHAR(20) NOT NULL DEFAULT 'Approved',
        casual_leave_balance INT NOT NULL DEFAULT 12,
        sick_leave_balance INT NOT NULL DEFAULT 10,
        created_at TIMESTAMP NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at TIMESTAMP NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP,
        UNIQUE KEY uq_employees_email (email),
        CONSTRAINT fk_employees_department FOREIGN KEY (department_id)
            REFERENCES departments (id) ON DELETE SET NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS attendance (
        id BIGINT UNSIGNED AUTO_INCREMENT PRIMARY KEY,
        employee_id BIGINT UNSIGNED NOT NULL,
        date DATE NOT NULL,
        check_in TIME NULL,
        check_out TIME NULL,
        status VARCHAR(20) NOT NULL DEFAULT 'Present',
        hours DECIMAL(4, 2) NULL,
        created_at TIMESTAMP NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at TIMESTAMP NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP,
        UNIQUE KEY uq_attendance_employee_date (employee_id, date),
        CONSTRAINT fk_attendance_employee FOREIGN KEY (employee_id)
            REFERENCES employees (id) ON DELETE CASCADE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS leave_requests (
        id BIGINT UNSIGNED AUTO_INCREMENT PRIMARY KEY,
        employee_id BIGINT UNSIGNED NOT NULL,
        leave_type VARCHAR(50) NOT NULL,
        start_date DATE NOT NULL,
        end_date DATE NOT NULL,
        days INT NOT NULL,
        reason TEXT NULL,
        status VARCHAR(20) NOT NULL DEFAULT 'Pending',
        created_at TIMESTAMP NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at TIMESTAMP NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP,
        KEY idx_leave_requests_dates (start_date, end_date),
        CONSTRAINT fk_leave_requests_employee FOREIGN KEY (employee_id)
            REFERENCES employees (id) ON DELETE CASCADE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS payroll (
        id BIGINT UNSIGNED AUTO_INCREMENT PRIMARY KEY,
        employee_id BIGINT UNSIGNED NOT NULL,
        month INT NOT NULL,
        year INT NOT NULL,
        basic_salary DECIMAL(10, 2) NOT NULL,
        allowances DECIMAL(10, 2) NOT NULL DEFAULT 0,
        deductions DECIMAL(10, 2) NOT NULL DEFAULT 0,
        net_salary DECIMAL(10, 2) NOT NULL,
        status VARCHAR(20) NOT NULL DEFAULT 'Pending',
        payment_date DATE NULL,
        created_at TIMESTAMP NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at TIMESTAMP NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP,
        UNIQUE KEY uq_payroll_employee_period (employee_id, month, year),
        CONSTRAINT fk_payroll_employee FOREIGN KEY (employee_id)
            REFERENCES employees (id) ON DELETE CASCADE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS salary_advances (
        id BIGINT UNSIGNED AUTO_INCREMENT PRIMARY KEY,
        employee_id BIGINT UNSIGNED NOT NULL,
        amount DECIMAL(10, 2) NOT NULL,
        date DATE NOT NULL,
        month INT NOT NULL,
        year INT NOT NULL,
        deduction_type VARCHAR(20) NOT NULL DEFAULT 'Full',
        installment_amount DECIMAL(10, 2) NULL,
        remaining_amount DECIMAL(10, 2) NOT NULL,
        status VARCHAR(20) NOT NULL DEFAULT 'Active',
        created_at TIMESTAMP NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at TIMESTAMP NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP,
        KEY idx_salary_advances_period (employee_id, year, month),
        CONSTRAINT fk_salary_advances_employee FOREIGN KEY (employee_id)
            REFERENCES employees (id) ON DELETE CASCADE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS announcements (
        id BIGINT UNSIGNED AUTO_INCREMENT PRIMARY KEY,
        title VARCHAR(200) NOT NULL,
        content TEXT NOT NULL,
        priority VARCHAR(20) NOT NULL DEFAULT 'Normal',
        created_by VARCHAR(100) NULL DEFAULT 'Admin',
        created_at TIMESTAMP NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at TIMESTAMP NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP
    )
    "#,
];

pub async fn create_tables(pool: &MySqlPool) -> Result<(), sqlx::Error> {
    for ddl in CREATE_TABLES {
        sqlx::query(ddl).execute(pool).await?;
    }
    log::info!("All {} tables are present", TABLES.len());
    Ok(())
}

/// Lower-cased `DATA_TYPE` of a column, `None` when the column is missing.
async fn column_type(
    pool: &MySqlPool,
    table: &str,
    column: &str,
) -> Result<Option<String>, sqlx::Error> {
    // information_schema text comes back as binary on some servers
    let data_type = sqlx::query_scalar::<_, String>(
        r#"
        SELECT CAST(DATA_TYPE AS CHAR)
        FROM information_schema.COLUMNS
        WHERE TABLE_SCHEMA = DATABASE()
        AND TABLE_NAME = ?
        AND COLUMN_NAME = ?
        "#,
    )
    .bind(table)
    .bind(column)
    .fetch_optional(pool)
    .await?;

    Ok(data_type.map(|t| t.to_lowercase()))
}

async fn has_unique_key_on(pool: &MySqlPool, table: &str, columns: &[&str]) -> Result<bool, sqlx::Error> {
    let keys = sqlx::query_as::<_, (String, String)>(
        r#"
        SELECT CAST(INDEX_NAME AS CHAR), CAST(COLUMN_NAME AS CHAR)
        FROM information_schema.STATISTICS
        WHERE TABLE_SCHEMA = DATABASE()
        AND TABLE_NAME = ?
        AND NON_UNIQUE = 0
        ORDER BY INDEX_NAME, SEQ_IN_INDEX
        "#,
    )
    .bind(table)
    .fetch_all(pool)
    .await?;

    let mut by_index: Vec<(String, Vec<String>)> = Vec::new();
    for (index, column) in keys {
        match by_index.last_mut() {
            Some((name, cols)) if *name == index => cols.push(column),
            _ => by_index.push((index, vec![column])),
        }
    }

    Ok(by_index.iter().any(|(_, cols)| cols.iter().map(String::as_str).eq(columns.iter().copied())))
}

/// Brings an older database up to the current layout. Returns one line per
/// check or change, in order.
pub async fn run_migrations(pool: &MySqlPool) -> Result<Vec<String>, sqlx::Error> {
    let mut details = vec!["Checking database schema...".to_string()];

    // payroll.month used to be stored as text
    match column_type(pool, "payroll", "month").await? {
        None => details.push("Payroll table or month column does not exist yet".to_string()),
        Some(t) if t == "int" => {
            details.push("No migration needed: payroll.month is already INT".to_string())
        }
        Some(t) if t.contains("char") || t.contains("text") => {
            details.push(format!("Converting payroll.month from {t} to INT"));
            sqlx::query("ALTER TABLE payroll MODIFY COLUMN month INT NOT NULL")
                .execute(pool)
                .await?;
            details.push("payroll.month is now INT".to_string());
        }
        Some(t) => details.push(format!("Unexpected type for payroll.month: {t}")),
    }

    for (column, default) in [("casual_leave_balance", 12), ("sick_leave_balance", 10)] {
        if column_type(pool, "employees", column).await?.is_none() {
            sqlx::query(&format!(
                "ALTER TABLE employees ADD COLUMN {column} INT NOT NULL DEFAULT {default}"
            ))
            .execute(pool)
            .await?;
            details.push(format!("Added employees.{column}"));
        } else {
            details.push(format!("employees.{column} already exists"));
        }
    }

    let mut backfill_advances = false;
    for column in ["month", "year"] {
        if column_type(pool, "salary_advances", column).await?.is_none() {
            sqlx::query(&format!("ALTER TABLE salary_advances ADD COLUMN {column} INT NULL"))
                .execute(pool)
                .await?;
            details.push(format!("Added salary_advances.{column}"));
            backfill_advances = true;
        }
    }
    if backfill_advances {
        // advances created before the columns existed target their own month
        let filled = sqlx::query(
            "UPDATE salary_advances SET month = MONTH(date), year = YEAR(date) WHERE month IS NULL OR year IS NULL",
        )
        .execute(pool)
        .await?
        .rows_affected();
        sqlx::query("ALTER TABLE salary_advances MODIFY COLUMN month INT NOT NULL, MODIFY COLUMN year INT NOT NULL")
            .execute(pool)
            .await?;
        details.push(format!("Backfilled period of {filled} salary advances"));
    } else {
        details.push("salary_advances month/year columns already exist".to_string());
    }

    if has_unique_key_on(pool, "attendance", &["employee_id", "date"]).await? {
        details.push("attendance (employee_id, date) unique key already exists".to_string());
    } else {
        sqlx::query(
            "ALTER TABLE attendance ADD UNIQUE KEY uq_attendance_employee_date (employee_id, date)",
        )
        .execute(pool)
        .await?;
        details.push("Added attendance (employee_id, date) unique key".to_string());
    }

    details.push("Migration check complete".to_string());
    for line in &details {
        log::info!("{}", line);
    }

    Ok(details)
}

const SEED_DEPARTMENTS: [(&str, &str); 6] = [
    ("Engineering", "Software Development and IT"),
    ("Finance", "Financial Management and Accounting"),
    ("HR", "Human Resources Management"),
    ("Marketing", "Marketing and Sales"),
    ("Operations", "Operations and Logistics"),
    ("Support", "Customer Support"),
];

/// Default departments, two sample employees and a welcome announcement.
/// Rows that already exist are left alone.
pub async fn seed_initial_data(pool: &MySqlPool) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    for (name, description) in SEED_DEPARTMENTS {
        sqlx::query("INSERT IGNORE INTO departments (name, description) VALUES (?, ?)")
            .bind(name)
            .bind(description)
            .execute(&mut *tx)
            .await?;
    }

    let employees = [
        ("Sumit Kumar", "sumit@example.com", "1234567890", "Engineering", "Developer", "10000.00", "2 years", "2023-01-15"),
        ("Mohan Kumar", "mohan@example.com", "0987654321", "Finance", "Accountant", "9000.00", "3 years", "2022-06-20"),
    ];
    for (name, email, phone, department, position, salary, experience, hire_date) in employees {
        sqlx::query(
            r#"
            INSERT IGNORE INTO employees
                (name, email, phone, department_id, position, salary, experience, hire_date, status)
            VALUES (?, ?, ?, (SELECT id FROM departments WHERE name = ?), ?, CAST(? AS DECIMAL(10, 2)), ?, CAST(? AS DATE), 'Approved')
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(phone)
        .bind(department)
        .bind(position)
        .bind(salary)
        .bind(experience)
        .bind(hire_date)
        .execute(&mut *tx)
        .await?;
    }

    sqlx::query(
        r#"
        INSERT INTO announcements (title, content, priority, created_by)
        SELECT ?, ?, 'High', 'Admin' FROM DUAL
        WHERE NOT EXISTS (SELECT 1 FROM announcements WHERE title = ?)
        "#,
    )
    .bind("Welcome to EMS")
    .bind("Welcome to our new Employee Management System!")
    .bind("Welcome to EMS")
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    log::info!("Initial data seeded");
    Ok(())
}

#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct ColumnInfo {
    #[schema(example = "month")]
    pub column_name: String,
    #[schema(example = "int")]
    pub data_type: String,
    #[schema(example = "NO")]
    pub is_nullable: String,
}

pub async fn check_schema(pool: &MySqlPool, table: &str) -> Result<Vec<ColumnInfo>, sqlx::Error> {
    sqlx::query_as::<_, ColumnInfo>(
        r#"
        SELECT
            CAST(COLUMN_NAME AS CHAR) AS column_name,
            CAST(DATA_TYPE AS CHAR) AS data_type,
            CAST(IS_NULLABLE AS CHAR) AS is_nullable
        FROM information_schema.COLUMNS
        WHERE TABLE_SCHEMA = DATABASE()
        AND TABLE_NAME = ?
        ORDER BY ORDINAL_POSITION
        "#,
    )
    .bind(table)
    .fetch_all(pool)
    .await
}
