pub mod catalog;
pub mod form;
pub mod health;
pub mod sessions;
