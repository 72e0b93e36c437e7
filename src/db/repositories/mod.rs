pub mod admin;
pub mod ballot;
pub mod contestant;
pub mod user;
