use std::hash::{Hash, Hasher};

use super::{Record, RecordKind, Snapshot};

#[derive(sqlx::FromRow, Debug, Clone, Default)]
pub struct Client {
    #[sqlx(rename = "id_client")]
    pub id: i64,
    pub name: String,
}

impl Client {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
        }
    }
}

impl PartialEq for Client {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Client {}

impl Hash for Client {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Record for Client {
    const KIND: RecordKind = RecordKind::Client;

    fn id(&self) -> i64 {
        self.id
    }

    fn label(&self) -> String {
        format!("Client #{} \"{}\"", self.id, self.name)
    }

    fn trimmed(&self) -> Self {
        Self {
            id: self.id,
            name: self.name.trim().to_string(),
        }
    }

    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Client name is required".to_string());
        }
        Ok(())
    }

    fn snapshot(records: Vec<Self>) -> Snapshot {
        Snapshot::Clients(records)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn equality_is_by_identity() {
        let a = Client { id: 7, name: "Ana".into() };
        let b = Client { id: 7, name: "Beto".into() };
        let c = Client { id: 8, name: "Ana".into() };
        assert_eq!(a, b);
        assert_ne!(a, c);

        let set: HashSet<Client> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn blank_name_is_rejected() {
        assert!(Client::new("   ").validate().is_err());
        assert!(Client::new("Ana").validate().is_ok());
    }

    #[test]
    fn new_client_is_a_draft() {
        let mut client = Client::new("  Ana ");
        assert!(client.is_new());
        assert_eq!(client.trimmed().name, "Ana");
        client.id = 3;
        assert!(!client.is_new());
        assert_eq!(client.label(), "Client #3 \"  Ana \"");
    }
}
