//! Human overrides of automated decisions plus the points sub-ledger.

pub mod ledger;
pub mod router;

pub use ledger::{
    ModerationAction, ModerationError, ModerationLedger, ModerationReceipt, DEFAULT_CURRENCY,
};
pub use router::moderation_router;
