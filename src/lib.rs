//! # Ensaluto
//!
//! `ensaluto` authenticates users through two credential paths, federated
//! Google OAuth and local email/password, and produces a normalized session
//! identity for the rest of an application.
//!
//! ## Sign-in flow
//!
//! Every sign-in attempt, regardless of path, funnels through the same
//! pipeline:
//!
//! 1. credential verification (credentials path only)
//! 2. sign-in gate: guarantee a backing user record exists
//! 3. token mint, with durable-identity enrichment for Google sign-ins
//! 4. session projection of the token claims for consumers
//!
//! ## Session strategy
//!
//! Sessions are token-based. The server keeps no session store; the signed
//! token carried in the session cookie is the only session state, and the
//! `/auth/session` endpoint projects it into a read-only view on every read.

pub mod auth;
pub mod cli;
pub mod ensaluto;
