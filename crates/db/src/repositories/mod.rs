//! Repository layer.

mod account_deletion_request;
mod comment;
mod race;
mod user;

pub use account_deletion_request::AccountDeletionRequestRepository;
pub use comment::CommentRepository;
pub use race::RaceRepository;
pub use user::UserRepository;
