//! Seeders insert predetermined data. They run in order through
//! [`run_seeders`] and share repositories via [`SeedContext`].

mod students;
mod users;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{error, info};

use crate::config::SeedConfig;
use crate::students::repo::{PgStudentRepo, StudentRepo};
use crate::users::repo::{PgUserRepo, UserRepo};

pub use students::StudentsTableSeeder;
pub use users::UsersTableSeeder;

#[derive(Clone)]
pub struct SeedContext {
    pub users: Arc<dyn UserRepo>,
    pub students: Arc<dyn StudentRepo>,
}

impl SeedContext {
    pub fn postgres(db: PgPool) -> Self {
        Self {
            users: Arc::new(PgUserRepo::new(db.clone())),
            students: Arc::new(PgStudentRepo::new(db)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub seeder: &'static str,
    pub created: usize,
    pub skipped: usize,
}

#[async_trait]
pub trait Seeder: Send + Sync {
    fn name(&self) -> &'static str;
    async fn run(&self, ctx: &SeedContext) -> anyhow::Result<SeedReport>;
}

/// Seeders run by the `seed` command.
pub fn default_seeders(config: &SeedConfig) -> Vec<Box<dyn Seeder>> {
    vec![
        Box::new(UsersTableSeeder),
        Box::new(StudentsTableSeeder {
            count: config.students,
        }),
    ]
}

/// Runs `seeders` in order and stops at the first failure.
pub async fn run_seeders(
    seeders: &[Box<dyn Seeder>],
    ctx: &SeedContext,
) -> anyhow::Result<Vec<SeedReport>> {
    let mut reports = Vec::with_capacity(seeders.len());
    for seeder in seeders {
        info!(seeder = seeder.name(), "seeding");
        let report = seeder.run(ctx).await.map_err(|e| {
            error!(seeder = seeder.name(), error = %e, "seeder failed");
            e.context(format!("seeder {} failed", seeder.name()))
        })?;
        info!(
            seeder = report.seeder,
            created = report.created,
            skipped = report.skipped,
            "seeded"
        );
        reports.push(report);
    }
    Ok(reports)
}
