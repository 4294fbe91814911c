//! Core types for caltask.
//!
//! This crate provides everything the CLI needs that is independent of any
//! concrete service: the provider-neutral `Event` type and its normalization,
//! the `CalendarSource`/`TaskStore` capability traits, the note formatter,
//! and the reconcile engine that decides which tasks and notes to create.

pub mod error;
pub mod event;
pub mod note;
pub mod reconcile;
pub mod store;

pub use error::{CaltaskError, CaltaskResult};
pub use event::{Event, EventStart, RawEvent};
pub use reconcile::{ReconcileEngine, SyncReport};
pub use store::{CalendarSource, Note, Project, Task, TaskStore};
