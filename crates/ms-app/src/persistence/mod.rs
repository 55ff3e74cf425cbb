mod selector;

pub use selector::{PersistError, PersistenceBackendSelector, SaveOutcome};
