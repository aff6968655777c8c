//! Application services - orchestrate use cases.
//!
//! The session service coordinates the domain layer and the device ports:
//! select a scanner, claim it, run its camera preview and turn taps into
//! focus regions.

pub mod session;

pub use session::{SessionHandle, SessionService, spawn};
