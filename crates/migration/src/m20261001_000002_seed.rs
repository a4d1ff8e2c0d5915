//! Seeds the built-in roles and the system default categories.

use chrono::Utc;
use sea_orm::{ConnectionTrait, Statement};
use sea_orm_migration::prelude::*;
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};
use uuid::Uuid;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Roles {
    Table,
    Id,
    Name,
}

#[derive(Iden)]
enum Categories {
    Table,
    Id,
    Name,
    NameNorm,
    Type,
    Color,
    Icon,
    IsDefault,
    IsShared,
    UserId,
    CreatedAt,
}

const ROLES: [&str; 2] = ["admin", "user"];

const DEFAULT_CATEGORIES: [(&str, &str, &str, &str); 12] = [
    ("Salary", "INCOME", "#2e7d32", "briefcase"),
    ("Freelance", "INCOME", "#388e3c", "laptop"),
    ("Investments", "INCOME", "#1b5e20", "trending-up"),
    ("Other income", "INCOME", "#66bb6a", "plus-circle"),
    ("Food", "EXPENSE", "#e53935", "utensils"),
    ("Housing", "EXPENSE", "#8e24aa", "home"),
    ("Transport", "EXPENSE", "#fb8c00", "car"),
    ("Health", "EXPENSE", "#d81b60", "heart"),
    ("Education", "EXPENSE", "#3949ab", "book"),
    ("Leisure", "EXPENSE", "#00897b", "music"),
    ("Bills", "EXPENSE", "#6d4c41", "file-text"),
    ("Other expenses", "EXPENSE", "#757575", "more-horizontal"),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        let backend = manager.get_database_backend();

        for name in ROLES {
            let insert = Query::insert()
                .into_table(Roles::Table)
                .columns([Roles::Id, Roles::Name])
                .values_panic([Uuid::new_v4().as_bytes().to_vec().into(), name.into()])
                .to_owned();
            db.execute(backend.build(&insert)).await?;
        }

        let now = Utc::now();
        for (name, kind, color, icon) in DEFAULT_CATEGORIES {
            let insert = Query::insert()
                .into_table(Categories::Table)
                .columns([
                    Categories::Id,
                    Categories::Name,
                    Categories::NameNorm,
                    Categories::Type,
                    Categories::Color,
                    Categories::Icon,
                    Categories::IsDefault,
                    Categories::IsShared,
                    Categories::UserId,
                    Categories::CreatedAt,
                ])
                .values_panic([
                    Uuid::new_v4().as_bytes().to_vec().into(),
                    name.into(),
                    normalize_key(name).into(),
                    kind.into(),
                    color.into(),
                    icon.into(),
                    true.into(),
                    false.into(),
                    None::<String>.into(),
                    now.into(),
                ])
                .to_owned();
            db.execute(backend.build(&insert)).await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        let backend = manager.get_database_backend();
        db.execute(Statement::from_string(
            backend,
            "DELETE FROM categories WHERE is_default = 1",
        ))
        .await?;
        db.execute(Statement::from_string(backend, "DELETE FROM roles"))
            .await?;
        Ok(())
    }
}

// Must stay in sync with `engine::util::normalize_category_key`.
fn normalize_key(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut pending_space = false;
    for ch in value.nfkd().filter(|c| !is_combining_mark(*c)) {
        if ch.is_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.extend(ch.to_lowercase());
        } else {
            pending_space = true;
        }
    }
    out
}
