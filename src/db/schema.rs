use crate::config::Backend;

const POSTGRES: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS client (
        id_client BIGSERIAL PRIMARY KEY,
        name VARCHAR(255) NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS employee (
        id BIGSERIAL PRIMARY KEY,
        name VARCHAR(255) NOT NULL,
        last_name VARCHAR(255) NOT NULL DEFAULT '',
        phone_number VARCHAR(32) NOT NULL DEFAULT '',
        email VARCHAR(255) NOT NULL DEFAULT ''
    )
    "#,
];

const SQLITE: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS client (
        id_client INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS employee (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        last_name TEXT NOT NULL DEFAULT '',
        phone_number TEXT NOT NULL DEFAULT '',
        email TEXT NOT NULL DEFAULT ''
    )
    "#,
];

/// DDL creating both tables when they are missing
pub fn statements(backend: Backend) -> &'static [&'static str] {
    match backend {
        Backend::Postgres => POSTGRES,
        Backend::Sqlite => SQLITE,
    }
}
