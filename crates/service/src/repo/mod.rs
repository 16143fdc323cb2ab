//! Storage backends implementing the catalog, identity and ledger
//! repositories.

pub mod memory;
pub mod seaorm;

pub use memory::MemoryStore;
pub use seaorm::SeaOrmStore;
