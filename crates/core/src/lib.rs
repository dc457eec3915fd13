//! Core business logic for racehub.
//!
//! [`policy`] and [`moderation`] hold the pure rules: who sees which race and
//! how approval states move. [`services`] wires them to the repositories.

pub mod moderation;
pub mod policy;
pub mod services;

pub use policy::{Viewer, has_admin_capability, is_visible};
pub use services::*;
