use tui::layout::Constraint;

use crate::models::Client;
use crate::ui::form::FormLayout;
use crate::ui::list::{Column, ListLayout};

const COLUMNS: &[Column] = &[
    Column { header: "ID", width: Constraint::Length(8) },
    Column { header: "Name", width: Constraint::Min(20) },
];

impl ListLayout for Client {
    fn columns() -> &'static [Column] {
        COLUMNS
    }

    fn cells(&self) -> Vec<String> {
        vec![self.id.to_string(), self.name.clone()]
    }
}

impl FormLayout for Client {
    fn labels() -> &'static [&'static str] {
        &["Name"]
    }

    fn field(&self, index: usize) -> Option<&str> {
        match index {
            0 => Some(self.name.as_str()),
            _ => None,
        }
    }

    fn field_mut(&mut self, index: usize) -> Option<&mut String> {
        match index {
            0 => Some(&mut self.name),
            _ => None,
        }
    }

    fn blank() -> Self {
        Client::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_match_columns() {
        let client = Client { id: 3, name: "Ana".into() };
        assert_eq!(client.cells().len(), Client::columns().len());
        assert_eq!(client.cells(), ["3", "Ana"]);
        assert_eq!(client.field(1), None);
    }
}
