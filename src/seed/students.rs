use async_trait::async_trait;

use super::{SeedContext, SeedReport, Seeder};
use crate::students::factory::StudentFactory;

/// Inserts `count` factory-generated students.
pub struct StudentsTableSeeder {
    pub count: usize,
}

#[async_trait]
impl Seeder for StudentsTableSeeder {
    fn name(&self) -> &'static str {
        "students"
    }

    async fn run(&self, ctx: &SeedContext) -> anyhow::Result<SeedReport> {
        let created = StudentFactory::create_many(ctx.students.as_ref(), self.count).await?;
        Ok(SeedReport {
            seeder: self.name(),
            created: created.len(),
            skipped: 0,
        })
    }
}
