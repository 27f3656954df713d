use sea_orm_migration::{MigrationTrait, MigratorTrait, async_trait::async_trait};

mod m20260701_000001_create_users;
mod m20260701_000002_create_projects;

pub struct Migrator;

#[async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260701_000001_create_users::Migration),
            Box::new(m20260701_000002_create_projects::Migration),
        ]
    }
}
