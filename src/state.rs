use std::sync::Arc;

use sqlx::PgPool;

use crate::students::repo::{PgStudentRepo, StudentRepo};

#[derive(Clone)]
pub struct AppState {
    pub students: Arc<dyn StudentRepo>,
}

impl AppState {
    pub fn new(students: Arc<dyn StudentRepo>) -> Self {
        Self { students }
    }

    pub fn postgres(db: PgPool) -> Self {
        Self::new(Arc::new(PgStudentRepo::new(db)))
    }
}
