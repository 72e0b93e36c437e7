pub use super::admins::Entity as Admins;
pub use super::contestants::Entity as Contestants;
pub use super::users::Entity as Users;
