use tui::layout::Constraint;

use crate::models::Employee;
use crate::ui::form::FormLayout;
use crate::ui::list::{Column, ListLayout};

const COLUMNS: &[Column] = &[
    Column { header: "ID", width: Constraint::Length(6) },
    Column { header: "Name", width: Constraint::Percentage(20) },
    Column { header: "Last name", width: Constraint::Percentage(25) },
    Column { header: "Phone", width: Constraint::Percentage(18) },
    Column { header: "Email", width: Constraint::Percentage(30) },
];

const LABELS: &[&str] = &["Name", "Last name", "Phone number", "Email"];

impl ListLayout for Employee {
    fn columns() -> &'static [Column] {
        COLUMNS
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.last_name.clone(),
            self.phone_number.clone(),
            self.email.clone(),
        ]
    }
}

impl FormLayout for Employee {
    fn labels() -> &'static [&'static str] {
        LABELS
    }

    fn field(&self, index: usize) -> Option<&str> {
        match index {
            0 => Some(self.name.as_str()),
            1 => Some(self.last_name.as_str()),
            2 => Some(self.phone_number.as_str()),
            3 => Some(self.email.as_str()),
            _ => None,
        }
    }

    fn field_mut(&mut self, index: usize) -> Option<&mut String> {
        match index {
            0 => Some(&mut self.name),
            1 => Some(&mut self.last_name),
            2 => Some(&mut self.phone_number),
            3 => Some(&mut self.email),
            _ => None,
        }
    }

    fn blank() -> Self {
        Employee::default()
    }
}
