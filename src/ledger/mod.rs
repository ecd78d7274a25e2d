pub mod memory;
pub mod sqlite;
pub mod store;

pub use memory::MemoryLedger;
pub use sqlite::SqliteLedger;
pub use store::{BidInsert, CloseResult, LedgerError, LedgerStore, SettlementPlan, Transfer};
