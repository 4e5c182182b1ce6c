pub mod error;
pub mod sql_guard;
