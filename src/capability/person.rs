use async_trait::async_trait;

use crate::domain::person::Person;

#[async_trait]
pub trait PersonCapability {
    /// Inserts `person`, or overwrites the stored row when `person.id` names
    /// one. An `id` that names no row is dropped and a fresh one assigned.
    async fn save(&self, person: Person) -> Result<Person, String>;
    async fn find_all(&self) -> Result<Vec<Person>, String>;
}
