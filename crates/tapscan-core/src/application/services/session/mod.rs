//! Scanner session service.
//!
//! A single actor task owns the claimed scanner, the camera and the display
//! request. Callers talk to it through a cloneable [`SessionHandle`] and
//! observe it through published [`SessionSnapshot`](crate::domain::SessionSnapshot)s.
//!
//! ## Lifecycle
//!
//! ```text
//! Idle ──select──▶ Selecting ──claimed──▶ Active
//!   ▲                  │                    │
//!   └──── Closing ◀────┴──── stop/background┘
//! ```
//!
//! Selection requests arriving mid-selection collapse into one pending slot
//! (the newest wins). A stop arriving mid-selection is deferred until the
//! selection finishes and then wins over any pending selection.

mod event;
mod focus;
mod handle;
mod preview;
mod service;

#[cfg(test)]
mod tests;

pub use handle::SessionHandle;
pub use service::{SessionService, spawn};
