use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use crate::capability::person::PersonCapability;
use crate::domain::person::Person;
use crate::domain::person_id::PersonId;

#[derive(Debug)]
struct Table {
    next_id: PersonId,
    rows: BTreeMap<PersonId, Person>,
}

/// Capabilities held in process memory, for tests and for running the
/// server without Postgres. Cloning shares the table.
#[derive(Clone, Debug)]
pub struct InMemoryWorker {
    table: Arc<Mutex<Table>>,
}

impl InMemoryWorker {
    pub fn new() -> Self {
        Self {
            table: Arc::new(Mutex::new(Table {
                next_id: PersonId::first(),
                rows: BTreeMap::new(),
            })),
        }
    }
}

#[async_trait]
impl PersonCapability for InMemoryWorker {
    async fn save(&self, person: Person) -> Result<Person, String> {
        let mut table = self
            .table
            .lock()
            .map_err(|err| format!("Error locking people table: {}", err))?;

        let id = match person.id {
            Some(id) if table.rows.contains_key(&id) => id,
            _ => {
                let id = table.next_id;
                table.next_id = id.next();
                id
            }
        };

        let stored = Person {
            id: Some(id),
            ..person
        };
        table.rows.insert(id, stored.clone());

        Ok(stored)
    }

    async fn find_all(&self) -> Result<Vec<Person>, String> {
        let table = self
            .table
            .lock()
            .map_err(|err| format!("Error locking people table: {}", err))?;

        Ok(table.rows.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_assigns_increasing_ids() {
        let worker = InMemoryWorker::new();

        let alice = worker
            .save(Person::new("Alice", "alice@example.com"))
            .await
            .unwrap();
        let bob = worker
            .save(Person::new("Bob", "bob@example.com"))
            .await
            .unwrap();

        assert_eq!(alice.id, Some(PersonId::from_i64(1)));
        assert_eq!(bob.id, Some(PersonId::from_i64(2)));
    }

    #[tokio::test]
    async fn save_with_existing_id_overwrites() {
        let worker = InMemoryWorker::new();
        let alice = worker
            .save(Person::new("Alice", "alice@example.com"))
            .await
            .unwrap();

        let renamed = worker
            .save(Person::new("Alicia", "alicia@example.com").with_id(alice.id.unwrap()))
            .await
            .unwrap();

        assert_eq!(renamed.id, alice.id);
        assert_eq!(worker.find_all().await.unwrap(), vec![renamed]);
    }

    #[tokio::test]
    async fn save_with_unknown_id_gets_a_fresh_one() {
        let worker = InMemoryWorker::new();

        let stored = worker
            .save(Person::new("Carol", "carol@example.com").with_id(PersonId::from_i64(99)))
            .await
            .unwrap();
        let next = worker
            .save(Person::new("Dan", "dan@example.com"))
            .await
            .unwrap();

        assert_eq!(stored.id, Some(PersonId::from_i64(1)));
        assert_eq!(next.id, Some(PersonId::from_i64(2)));
    }

    #[tokio::test]
    async fn find_all_on_empty_table_is_empty() {
        let worker = InMemoryWorker::new();
        assert!(worker.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn clones_share_the_table() {
        let worker = InMemoryWorker::new();
        let other = worker.clone();

        other
            .save(Person::new("Erin", "erin@example.com"))
            .await
            .unwrap();

        assert_eq!(worker.find_all().await.unwrap().len(), 1);
    }
}
