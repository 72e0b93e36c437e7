pub mod prelude;

pub mod admins;
pub mod contestants;
pub mod users;
