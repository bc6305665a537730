use async_trait::async_trait;

use super::{check, expect_affected, Database, Repository};
use crate::error::{Result, StoreError};
use crate::models::{Employee, RecordKind};

#[async_trait]
impl Repository<Employee> for Database {
    async fn list(&self) -> Result<Vec<Employee>> {
        let employees = sqlx::query_as::<_, Employee>(
            "SELECT id, name, last_name, phone_number, email FROM employee ORDER BY id ASC",
        )
        .fetch_all(self.get_pool())
        .await?;

        Ok(employees)
    }

    async fn get(&self, id: i64) -> Result<Employee> {
        sqlx::query_as::<_, Employee>(
            "SELECT id, name, last_name, phone_number, email FROM employee WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.get_pool())
        .await?
        .ok_or(StoreError::NotFound { kind: RecordKind::Employee, id })
    }

    async fn insert(&self, employee: &Employee) -> Result<i64> {
        check(employee)?;

        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO employee (name, last_name, phone_number, email)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(employee.name.as_str())
        .bind(employee.last_name.as_str())
        .bind(employee.phone_number.as_str())
        .bind(employee.email.as_str())
        .fetch_one(self.get_pool())
        .await?;

        tracing::info!(id, "inserted employee");
        Ok(id)
    }

    async fn update(&self, employee: &Employee) -> Result<u64> {
        check(employee)?;

        let result = sqlx::query(
            r#"
            UPDATE employee
            SET name = $1, last_name = $2, phone_number = $3, email = $4
            WHERE id = $5
            "#,
        )
        .bind(employee.name.as_str())
        .bind(employee.last_name.as_str())
        .bind(employee.phone_number.as_str())
        .bind(employee.email.as_str())
        .bind(employee.id)
        .execute(self.get_pool())
        .await?;

        let rows_affected =
            expect_affected(result.rows_affected(), RecordKind::Employee, employee.id)?;
        tracing::info!(id = employee.id, rows_affected, "updated employee");
        Ok(rows_affected)
    }

    async fn delete(&self, id: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM employee WHERE id = $1")
            .bind(id)
            .execute(self.get_pool())
            .await?;

        let rows_affected = expect_affected(result.rows_affected(), RecordKind::Employee, id)?;
        tracing::info!(id, rows_affected, "deleted employee");
        Ok(rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ana() -> Employee {
        Employee::new("Ana", "López", "555-0101", "ana@taqueria.mx")
    }

    #[tokio::test]
    async fn insert_stores_every_column() {
        let db = Database::in_memory().await;

        let id = Repository::<Employee>::insert(&db, &ana()).await.unwrap();
        let stored: Employee = Repository::<Employee>::get(&db, id).await.unwrap();

        assert_eq!(stored.id, id);
        assert_eq!(stored.name, "Ana");
        assert_eq!(stored.last_name, "López");
        assert_eq!(stored.phone_number, "555-0101");
        assert_eq!(stored.email, "ana@taqueria.mx");
    }

    #[tokio::test]
    async fn update_rewrites_all_fields() {
        let db = Database::in_memory().await;
        let id = Repository::<Employee>::insert(&db, &ana()).await.unwrap();

        let mut changed = Employee::new("Ana", "López Ruiz", "555-0199", "ana.lopez@taqueria.mx");
        changed.id = id;
        Repository::<Employee>::update(&db, &changed).await.unwrap();

        let stored: Employee = Repository::<Employee>::get(&db, id).await.unwrap();
        assert_eq!(stored.last_name, "López Ruiz");
        assert_eq!(stored.phone_number, "555-0199");
        assert_eq!(stored.email, "ana.lopez@taqueria.mx");
    }

    #[tokio::test]
    async fn delete_then_list_excludes_row() {
        let db = Database::in_memory().await;
        let id = Repository::<Employee>::insert(&db, &ana()).await.unwrap();
        Repository::<Employee>::insert(&db, &Employee::new("Luis", "", "", ""))
            .await
            .unwrap();

        Repository::<Employee>::delete(&db, id).await.unwrap();

        let employees = Repository::<Employee>::list(&db).await.unwrap();
        assert_eq!(employees.len(), 1);
        assert_eq!(employees[0].name, "Luis");
        assert!(matches!(
            Repository::<Employee>::delete(&db, id).await,
            Err(StoreError::NotFound { kind: RecordKind::Employee, .. })
        ));
    }

    #[tokio::test]
    async fn client_and_employee_tables_are_independent() {
        let db = Database::in_memory().await;
        Repository::<Employee>::insert(&db, &ana()).await.unwrap();

        let clients = Repository::<crate::models::Client>::list(&db).await.unwrap();
        assert!(clients.is_empty());
    }
}
