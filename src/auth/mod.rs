//! Authentication and the current actor
//!
//! The lifecycle dispatcher only ever asks an `ActorProvider` who is acting.
//! `Session` is the provider the register ships; `AuthService` signs users in
//! and out of it.

pub mod password;
mod service;
mod session;

pub use password::{hash_password, is_hashed, verify_password};
pub use service::AuthService;
pub use session::{ActorProvider, Session, SessionFile};
