use async_trait::async_trait;

use super::{check, expect_affected, Database, Repository};
use crate::error::{Result, StoreError};
use crate::models::{Client, Record, RecordKind};

#[async_trait]
impl Repository<Client> for Database {
    async fn list(&self) -> Result<Vec<Client>> {
        let clients = sqlx::query_as::<_, Client>(
            "SELECT id_client, name FROM client ORDER BY id_client ASC",
        )
        .fetch_all(self.get_pool())
        .await?;

        Ok(clients)
    }

    async fn get(&self, id: i64) -> Result<Client> {
        sqlx::query_as::<_, Client>("SELECT id_client, name FROM client WHERE id_client = $1")
            .bind(id)
            .fetch_optional(self.get_pool())
            .await?
            .ok_or(StoreError::NotFound { kind: RecordKind::Client, id })
    }

    async fn insert(&self, client: &Client) -> Result<i64> {
        check(client)?;

        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO client (name) VALUES ($1) RETURNING id_client",
        )
        .bind(client.name.as_str())
        .fetch_one(self.get_pool())
        .await?;

        tracing::info!(id, "inserted client");
        Ok(id)
    }

    async fn update(&self, client: &Client) -> Result<u64> {
        check(client)?;

        let result = sqlx::query("UPDATE client SET name = $1 WHERE id_client = $2")
            .bind(client.name.as_str())
            .bind(client.id())
            .execute(self.get_pool())
            .await?;

        let rows_affected = expect_affected(result.rows_affected(), RecordKind::Client, client.id)?;
        tracing::info!(id = client.id, rows_affected, "updated client");
        Ok(rows_affected)
    }

    async fn delete(&self, id: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM client WHERE id_client = $1")
            .bind(id)
            .execute(self.get_pool())
            .await?;

        let rows_affected = expect_affected(result.rows_affected(), RecordKind::Client, id)?;
        tracing::info!(id, rows_affected, "deleted client");
        Ok(rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_then_list_includes_generated_id() {
        let db = Database::in_memory().await;

        let id = Repository::<Client>::insert(&db, &Client::new("Ana")).await.unwrap();
        assert!(id > 0);

        let clients: Vec<Client> = Repository::<Client>::list(&db).await.unwrap();
        assert_eq!(clients.len(), 1);
        assert_eq!(clients[0].id, id);
        assert_eq!(clients[0].name, "Ana");
    }

    #[tokio::test]
    async fn ids_are_assigned_in_order() {
        let db = Database::in_memory().await;

        let first = Repository::<Client>::insert(&db, &Client::new("Ana")).await.unwrap();
        let second = Repository::<Client>::insert(&db, &Client::new("Beto")).await.unwrap();
        assert!(second > first);

        let names: Vec<String> = Repository::<Client>::list(&db)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, ["Ana", "Beto"]);
    }

    #[tokio::test]
    async fn quotes_are_stored_verbatim() {
        let db = Database::in_memory().await;
        let name = "O'Brien'); DROP TABLE client; --";

        let id = Repository::<Client>::insert(&db, &Client::new(name)).await.unwrap();
        let stored: Client = Repository::<Client>::get(&db, id).await.unwrap();
        assert_eq!(stored.name, name);
        assert_eq!(Repository::<Client>::list(&db).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_changes_name() {
        let db = Database::in_memory().await;
        let id = Repository::<Client>::insert(&db, &Client::new("Ana")).await.unwrap();

        let rows = Repository::<Client>::update(&db, &Client { id, name: "Ana María".into() })
            .await
            .unwrap();
        assert_eq!(rows, 1);

        let stored: Client = Repository::<Client>::get(&db, id).await.unwrap();
        assert_eq!(stored.name, "Ana María");
    }

    #[tokio::test]
    async fn missing_rows_are_not_found() {
        let db = Database::in_memory().await;

        let err = Repository::<Client>::get(&db, 42).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { kind: RecordKind::Client, id: 42 }));

        let err = Repository::<Client>::update(&db, &Client { id: 42, name: "Nadie".into() })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));

        let err = Repository::<Client>::delete(&db, 42).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn delete_removes_row() {
        let db = Database::in_memory().await;
        let keep = Repository::<Client>::insert(&db, &Client::new("Ana")).await.unwrap();
        let gone = Repository::<Client>::insert(&db, &Client::new("Beto")).await.unwrap();

        assert_eq!(Repository::<Client>::delete(&db, gone).await.unwrap(), 1);

        let clients = Repository::<Client>::list(&db).await.unwrap();
        assert_eq!(clients, vec![Client { id: keep, name: String::new() }]);
    }

    #[tokio::test]
    async fn blank_name_is_rejected_before_writing() {
        let db = Database::in_memory().await;

        let err = Repository::<Client>::insert(&db, &Client::new("  ")).await.unwrap_err();
        assert!(matches!(err, StoreError::Invalid(_)));
        assert!(Repository::<Client>::list(&db).await.unwrap().is_empty());
    }
}
