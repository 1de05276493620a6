//! In-memory repositories standing in for PostgreSQL in tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use uuid::Uuid;

use crate::model::{hydrate, Attributes};
use crate::seed::SeedContext;
use crate::students::{model::Student, repo::StudentRepo};
use crate::users::{
    model::{NewUser, User},
    repo::UserRepo,
};

fn now() -> Value {
    json!(OffsetDateTime::now_utc().format(&Rfc3339).unwrap())
}

#[derive(Default)]
pub struct MemoryStudentRepo {
    rows: Mutex<Vec<Student>>,
}

impl MemoryStudentRepo {
    /// Stores a student with a hidden password set, bypassing mass assignment.
    pub async fn insert_with_password(&self, name: &str, password: &str) -> Student {
        let student: Student = hydrate(json!({
            "id": Uuid::new_v4(),
            "name": name,
            "email": null,
            "age": null,
            "class": null,
            "address": null,
            "password": password,
            "created_at": now(),
            "updated_at": now(),
        }))
        .unwrap();
        self.rows.lock().unwrap().push(student.clone());
        student
    }
}

#[async_trait]
impl StudentRepo for MemoryStudentRepo {
    async fn list(&self, limit: i64, offset: i64) -> anyhow::Result<Vec<Student>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn find(&self, id: Uuid) -> anyhow::Result<Option<Student>> {
        Ok(self.rows.lock().unwrap().iter().find(|s| s.id == id).cloned())
    }

    async fn create(&self, attrs: Attributes) -> anyhow::Result<Student> {
        let mut row = attrs.into_map();
        row.insert("id".into(), json!(Uuid::new_v4()));
        row.insert("created_at".into(), now());
        row.insert("updated_at".into(), now());
        let student: Student = hydrate(Value::Object(row))?;
        self.rows.lock().unwrap().push(student.clone());
        Ok(student)
    }

    async fn update(&self, id: Uuid, attrs: Attributes) -> anyhow::Result<Option<Student>> {
        let mut rows = self.rows.lock().unwrap();
        let Some(slot) = rows.iter_mut().find(|s| s.id == id) else {
            return Ok(None);
        };
        let mut row = match serde_json::to_value(&*slot)? {
            Value::Object(map) => map,
            _ => anyhow::bail!("student did not serialize to an object"),
        };
        row.extend(attrs.into_map());
        row.insert("updated_at".into(), now());
        let password = slot.password.take();
        let mut updated: Student = hydrate(Value::Object(row))?;
        updated.password = password;
        *slot = updated.clone();
        Ok(Some(updated))
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|s| s.id != id);
        Ok(rows.len() < before)
    }
}

#[derive(Default)]
pub struct MemoryUserRepo {
    rows: Mutex<Vec<User>>,
}

#[async_trait]
impl UserRepo for MemoryUserRepo {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        Ok(self.rows.lock().unwrap().iter().find(|u| u.email == email).cloned())
    }

    async fn create(&self, user: NewUser) -> anyhow::Result<User> {
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|u| u.email == user.email) {
            anyhow::bail!("duplicate key value violates unique constraint \"users_email_key\"");
        }
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            phone: user.phone,
            password_hash: user.password_hash,
            created_at: now,
            updated_at: now,
        };
        rows.push(user.clone());
        Ok(user)
    }

    async fn count_by_email(&self, email: &str) -> anyhow::Result<i64> {
        Ok(self.rows.lock().unwrap().iter().filter(|u| u.email == email).count() as i64)
    }
}

pub fn memory_context() -> SeedContext {
    SeedContext {
        users: Arc::new(MemoryUserRepo::default()),
        students: Arc::new(MemoryStudentRepo::default()),
    }
}
