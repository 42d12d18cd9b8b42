pub mod catalog;
pub mod config;
pub mod duplicate;
pub mod error;
pub mod flatten;
pub mod form;
pub mod io;
pub mod paths;
pub mod remote;
pub mod session;
pub mod store;
pub mod submit;
pub mod types;
pub mod validate;
pub mod wizard;

pub use error::{Result, SurveyError};
