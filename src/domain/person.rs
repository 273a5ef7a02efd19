use super::person_id::PersonId;
use serde::{Deserialize, Serialize};

/// A row of `table_1`. Inbound bodies may leave any field out; a stored
/// person always has an `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    #[serde(default)]
    pub id: Option<PersonId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[cfg(test)]
impl Person {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Person {
            id: None,
            name: Some(name.into()),
            email: Some(email.into()),
        }
    }

    pub fn with_id(mut self, id: PersonId) -> Self {
        self.id = Some(id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_fields_deserialize_as_none() {
        let person: Person = serde_json::from_value(json!({ "name": "Alice" })).unwrap();

        assert_eq!(person.id, None);
        assert_eq!(person.name, Some("Alice".to_string()));
        assert_eq!(person.email, None);
    }

    #[test]
    fn stored_person_serializes_all_three_fields() {
        let person = Person::new("Bob", "bob@example.com").with_id(PersonId::from_i64(2));

        assert_eq!(
            serde_json::to_value(&person).unwrap(),
            json!({ "id": 2, "name": "Bob", "email": "bob@example.com" })
        );
    }
}
