use async_trait::async_trait;
use tracing::{info, warn};

use super::{SeedContext, SeedReport, Seeder};
use crate::users::{
    model::NewUser,
    password::{check_password, hash_password, PasswordCheck},
};

/// Creates the fixture user. Skips when a user with the same email exists.
pub struct UsersTableSeeder;

impl UsersTableSeeder {
    pub const NAME: &'static str = "Jack Nicolson";
    pub const EMAIL: &'static str = "jack@example.com";
    pub const PHONE: &'static str = "0123456789";
    const PASSWORD: &'static str = "password";
}

#[async_trait]
impl Seeder for UsersTableSeeder {
    fn name(&self) -> &'static str {
        "users"
    }

    async fn run(&self, ctx: &SeedContext) -> anyhow::Result<SeedReport> {
        if let Some(existing) = ctx.users.find_by_email(Self::EMAIL).await? {
            match check_password(Self::PASSWORD, &existing.password_hash) {
                PasswordCheck::Match => {}
                PasswordCheck::Mismatch => {
                    warn!(user_id = %existing.id, "fixture user exists with a changed password")
                }
                PasswordCheck::Foreign => {
                    warn!(user_id = %existing.id, "fixture user password is not an argon2 hash")
                }
            }
            // tables created before the unique index may still hold copies
            let copies = ctx.users.count_by_email(Self::EMAIL).await?;
            if copies > 1 {
                warn!(copies, email = Self::EMAIL, "duplicate fixture users present");
            }
            info!(user_id = %existing.id, email = %existing.email, "fixture user already present");
            return Ok(SeedReport {
                seeder: self.name(),
                created: 0,
                skipped: 1,
            });
        }

        let user = ctx
            .users
            .create(NewUser {
                name: Self::NAME.into(),
                email: Self::EMAIL.into(),
                phone: Self::PHONE.into(),
                password_hash: hash_password(Self::PASSWORD)?,
            })
            .await?;
        info!(user_id = %user.id, email = %user.email, "fixture user created");

        Ok(SeedReport {
            seeder: self.name(),
            created: 1,
            skipped: 0,
        })
    }
}
