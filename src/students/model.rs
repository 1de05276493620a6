use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::model::{Cast, Column, Model};

/// Student record in the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: Option<String>,
    pub age: Option<i32>,
    pub class: Option<String>,
    pub address: Option<String>,
    #[serde(default, skip_serializing)]
    pub password: Option<String>, // never exposed in JSON
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Model for Student {
    const TABLE: &'static str = "students";
    const FILLABLE: &'static [Column] = &[
        Column::text("name"),
        Column::text("email"),
        Column::integer("age"),
        Column::text("class"),
        Column::text("address"),
    ];
    const HIDDEN: &'static [&'static str] = &["password"];
    const CASTS: &'static [(&'static str, Cast)] = &[
        ("created_at", Cast::DateTime),
        ("updated_at", Cast::DateTime),
    ];
}
