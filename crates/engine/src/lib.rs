pub mod autosave;
pub mod config;
pub mod desk;
pub mod draft;
pub mod error;
pub mod group;
pub mod ledger;
pub mod list_ops;
pub mod lock;
pub mod notify;
pub mod session;

pub use autosave::AutosaveController;
pub use config::EngineConfig;
pub use desk::Desk;
pub use draft::DraftState;
pub use error::EngineError;
pub use group::{GroupSpec, LedgerSpec, ListSpec};
pub use lock::{FieldLock, LockMap};
pub use notify::TracingNotifier;
pub use session::{FormSession, ListChange, SaveOutcome};
