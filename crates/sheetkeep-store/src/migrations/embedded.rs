//! Migrations embedded at compile time

pub struct Migration {
    pub id: &'static str,
    pub sql: &'static str,
}

/// All embedded migrations, in application order
pub fn get_migrations() -> &'static [Migration] {
    &[
        Migration {
            id: "001_app_tables",
            sql: include_str!("../../migrations/001_app_tables.sql"),
        },
        Migration {
            id: "002_workbook_snapshots",
            sql: include_str!("../../migrations/002_workbook_snapshots.sql"),
        },
    ]
}
