//! Multiple-choice quiz trainer core: question source loading, a persistent
//! wrong-answer ledger, practice pool selection and the quiz session state
//! machine. The terminal front-end in `app`/`ui` is one renderer over it.

pub mod app;
pub mod config;
pub mod error;
pub mod event;
pub mod fetch;
pub mod quiz;
pub mod store;
pub mod ui;

pub use error::{FetchError, LoadError, StorageDecodeError};
