//! Purchase ledger core
//!
//! - [`aggregate`] - customer aggregate recompute
//! - [`loyalty`] - trailing-month loyalty candidate selection
//! - [`order_number`] - order number generation
//! - [`workflow`] - transactional purchase writes
//! - [`money`] - decimal arithmetic over stored amounts

pub mod aggregate;
pub mod loyalty;
pub mod money;
pub mod order_number;
pub mod workflow;

pub use aggregate::{CustomerAggregate, recompute_aggregates};
pub use loyalty::{
    LoyaltyCandidate, LoyaltyWindow, find_loyalty_candidates, find_loyalty_candidates_bulk,
};
pub use order_number::{OrderNumberGenerator, SequentialOrderNumbers};
pub use workflow::{PurchaseWorkflow, PurchaseWrite, TriggerPolicy};
