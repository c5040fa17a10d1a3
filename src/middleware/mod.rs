//! Middleware stages of the request pipeline.
//!
//! Baseline stages (every request): [`recover`], [`logging`], [`security_headers`].
//! Dynamic stages (routes with session state): session activation, [`csrf`], then
//! [`auth::authenticate`], with [`auth::require_authentication`] gating individual routes.
//! The chains are assembled in `routes::app`.

pub mod auth;
pub mod csrf;
pub mod ip;
pub mod logging;
pub mod recover;
pub mod security_headers;
