//! Foundational types: household members and ledger transactions.

pub mod member;
pub mod transaction;
