pub mod clients;
pub mod components;
pub mod employees;
pub mod form;
pub mod list;
