//! Database entities.

#![allow(missing_docs)]

pub mod account_deletion_request;
pub mod comment;
pub mod race;
pub mod user;

pub use account_deletion_request::Entity as AccountDeletionRequest;
pub use comment::Entity as Comment;
pub use race::Entity as Race;
pub use user::Entity as User;
