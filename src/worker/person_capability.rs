use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::Row;

use crate::capability::person::PersonCapability;
use crate::domain::person::Person;
use crate::domain::person_id::PersonId;
use crate::worker::Worker;

fn person_from_row(row: &PgRow) -> Result<Person, String> {
    let id: i64 = row
        .try_get::<i64, _>("id")
        .map_err(|err| format!("Error reading id from row: {}", err))?;

    let name = row
        .try_get::<Option<String>, _>("name")
        .map_err(|err| format!("Error reading name from row: {}", err))?;

    let email = row
        .try_get::<Option<String>, _>("email")
        .map_err(|err| format!("Error reading email from row: {}", err))?;

    Ok(Person {
        id: Some(PersonId::from_i64(id)),
        name,
        email,
    })
}

#[async_trait]
impl PersonCapability for Worker {
    async fn save(&self, person: Person) -> Result<Person, String> {
        if let Some(id) = person.id {
            let maybe_row = sqlx::query(
                r#"
                    UPDATE table_1
                    SET name = $2, email = $3
                    WHERE id = $1
                    RETURNING id, name, email;
                "#,
            )
            .bind(id.to_i64())
            .bind(&person.name)
            .bind(&person.email)
            .fetch_optional(&self.sqlx)
            .await
            .map_err(|err| format!("Error updating person {}: {}", id.to_i64(), err))?;

            if let Some(row) = maybe_row {
                return person_from_row(&row);
            }

            tracing::debug!(id = id.to_i64(), "no person with supplied id, inserting instead");
        }

        let row = sqlx::query(
            r#"
                INSERT INTO table_1 (name, email)
                VALUES ($1, $2)
                RETURNING id, name, email;
            "#,
        )
        .bind(&person.name)
        .bind(&person.email)
        .fetch_one(&self.sqlx)
        .await
        .map_err(|err| format!("Error inserting new person: {}", err))?;

        person_from_row(&row)
    }

    async fn find_all(&self) -> Result<Vec<Person>, String> {
        let rows = sqlx::query(
            r#"
                SELECT id, name, email
                FROM table_1
                ORDER BY id;
            "#,
        )
        .fetch_all(&self.sqlx)
        .await
        .map_err(|err| format!("Error fetching people: {}", err))?;

        rows.iter().map(person_from_row).collect()
    }
}
