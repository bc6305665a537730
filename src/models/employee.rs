use std::hash::{Hash, Hasher};

use super::{Record, RecordKind, Snapshot};

#[derive(sqlx::FromRow, Debug, Clone, Default)]
pub struct Employee {
    pub id: i64,
    pub name: String,
    pub last_name: String,
    pub phone_number: String,
    pub email: String,
}

impl Employee {
    pub fn new(
        name: impl Into<String>,
        last_name: impl Into<String>,
        phone_number: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id: 0,
            name: name.into(),
            last_name: last_name.into(),
            phone_number: phone_number.into(),
            email: email.into(),
        }
    }

    pub fn full_name(&self) -> String {
        if self.last_name.is_empty() {
            self.name.clone()
        } else {
            format!("{} {}", self.name, self.last_name)
        }
    }
}

impl PartialEq for Employee {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Employee {}

impl Hash for Employee {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Record for Employee {
    const KIND: RecordKind = RecordKind::Employee;

    fn id(&self) -> i64 {
        self.id
    }

    fn label(&self) -> String {
        format!("Employee #{} \"{}\"", self.id, self.full_name())
    }

    fn trimmed(&self) -> Self {
        Self {
            id: self.id,
            name: self.name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            phone_number: self.phone_number.trim().to_string(),
            email: self.email.trim().to_string(),
        }
    }

    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Employee name is required".to_string());
        }
        Ok(())
    }

    fn snapshot(records: Vec<Self>) -> Snapshot {
        Snapshot::Employees(records)
    }
}
