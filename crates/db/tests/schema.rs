//! Schema tests.
//!
//! These check migration ordering and the foreign keys implied by the entity
//! relations without a running database.

#![allow(clippy::unwrap_used)]

use racehub_db::{
    entities::{AccountDeletionRequest, Comment, Race},
    migrations::Migrator,
};
use sea_orm::{DbBackend, EntityTrait, Schema};
use sea_orm_migration::prelude::{MigrationName, MigratorTrait};

fn create_table_sql<E: EntityTrait>(entity: E) -> String {
    let schema = Schema::new(DbBackend::Postgres);
    DbBackend::Postgres
        .build(&schema.create_table_from_entity(entity))
        .to_string()
}

#[test]
fn test_migrations_run_in_name_order() {
    let names: Vec<String> = Migrator::migrations()
        .iter()
        .map(|m| m.name().to_string())
        .collect();

    let mut sorted = names.clone();
    sorted.sort();

    assert_eq!(names.len(), 4);
    assert_eq!(names, sorted);
    assert!(names[0].ends_with("create_user_table"));
}

#[test]
fn test_race_belongs_to_creator_and_approver() {
    let sql = create_table_sql(Race);

    assert!(sql.contains(r#"REFERENCES "user" ("id")"#));
    assert!(sql.contains("ON DELETE CASCADE"));
    assert!(sql.contains("ON DELETE SET NULL"));
}

#[test]
fn test_comments_cascade_with_race() {
    let sql = create_table_sql(Comment);

    assert!(sql.contains(r#"REFERENCES "race" ("id")"#));
    assert!(sql.contains("ON DELETE CASCADE"));
}

#[test]
fn test_one_deletion_request_per_user() {
    let sql = create_table_sql(AccountDeletionRequest);

    assert!(sql.contains(r#"REFERENCES "user" ("id")"#));
    assert!(sql.contains("UNIQUE"));
}
