//! Fake student data for seeding and tests.

use fake::{
    faker::{
        address::en::{BuildingNumber, CityName, StreetName},
        internet::en::SafeEmail,
        name::en::Name,
    },
    Fake,
};
use rand::Rng;
use serde_json::{json, Map, Value};

use crate::model::{Attributes, ModelError};
use crate::students::{model::Student, repo::StudentRepo};

pub struct StudentFactory;

impl StudentFactory {
    /// Raw attribute map with plausible values for every fillable column.
    pub fn definition<R: Rng + ?Sized>(rng: &mut R) -> Map<String, Value> {
        let name: String = Name().fake_with_rng(rng);
        let email: String = SafeEmail().fake_with_rng(rng);
        let age: i32 = (6..=18).fake_with_rng(rng);
        let grade = (age - 5).clamp(1, 12);
        let section = rng.gen_range('A'..='D');
        let building: String = BuildingNumber().fake_with_rng(rng);
        let street: String = StreetName().fake_with_rng(rng);
        let city: String = CityName().fake_with_rng(rng);

        let mut attrs = Map::new();
        attrs.insert("name".into(), json!(name));
        attrs.insert("email".into(), json!(email));
        attrs.insert("age".into(), json!(age));
        attrs.insert("class".into(), json!(format!("{grade}-{section}")));
        attrs.insert("address".into(), json!(format!("{building} {street}, {city}")));
        attrs
    }

    pub fn make() -> Result<Attributes, ModelError> {
        Attributes::fill::<Student>(&Self::definition(&mut rand::thread_rng()))
    }

    pub async fn create(repo: &dyn StudentRepo) -> anyhow::Result<Student> {
        repo.create(Self::make()?).await
    }

    pub async fn create_many(repo: &dyn StudentRepo, count: usize) -> anyhow::Result<Vec<Student>> {
        let mut created = Vec::with_capacity(count);
        for _ in 0..count {
            created.push(Self::create(repo).await?);
        }
        Ok(created)
    }
}
