pub use sea_orm_migration::prelude::*;

mod m20250705_101500_create_users_table;
mod m20250705_102200_create_charity_funds_table;
mod m20250705_103000_create_fundraisers_table;
mod m20250705_103800_create_help_requests_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250705_101500_create_users_table::Migration),
            Box::new(m20250705_102200_create_charity_funds_table::Migration),
            Box::new(m20250705_103000_create_fundraisers_table::Migration),
            Box::new(m20250705_103800_create_help_requests_table::Migration),
        ]
    }
}
