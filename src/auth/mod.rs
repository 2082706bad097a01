//! Core authentication and session logic.
//!
//! Each sign-in attempt is an independent, request-scoped operation. The only
//! shared state is the external user store, handed to every component as an
//! explicit [`store::UserStore`] dependency.
//!
//! Faults from the store or password primitive never cross a component
//! boundary as errors. The credential validator fails closed (faults become a
//! rejection); token enrichment fails degraded (faults leave the durable id
//! claim unset rather than blocking session issuance).

pub mod callbacks;
pub mod password;
pub mod reconcile;
pub mod session;
pub mod store;
pub mod token;
pub mod validator;

pub use session::{project, SessionView};
pub use store::{DynUserStore, NewUser, UserRecord, UserStore};
pub use token::{SignInEvent, TokenClaims};
