// signed_ledger/verifying_server/src/ledger.rs

use shared_auth::{Identity, Operation};
use std::collections::BTreeMap;
use std::sync::Mutex;

/// Per-identity running balances.
pub trait Ledger: Send + Sync {
    /// Applies `operation` for `identity` and returns the balance afterwards.
    fn apply(&self, identity: &Identity, operation: Operation, operand: i64) -> i64;
}

#[derive(Debug, Default)]
pub struct MemoryLedger {
    balances: Mutex<BTreeMap<Identity, i64>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        MemoryLedger::default()
    }

    #[cfg(test)]
    pub fn balance(&self, identity: &Identity) -> Option<i64> {
        let balances = self.balances.lock().unwrap_or_else(|e| e.into_inner());
        balances.get(identity).copied()
    }
}

impl Ledger for MemoryLedger {
    fn apply(&self, identity: &Identity, operation: Operation, operand: i64) -> i64 {
        let mut balances = self.balances.lock().unwrap_or_else(|e| e.into_inner());
        let balance = balances.entry(identity.clone()).or_insert(0);
        match operation {
            Operation::Add => *balance = balance.saturating_add(operand),
            Operation::Min => *balance = balance.saturating_sub(operand),
            Operation::Get => {}
        }
        *balance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(text: &str) -> Identity {
        text.parse().unwrap()
    }

    #[test]
    fn test_balances_start_at_zero() {
        let ledger = MemoryLedger::new();
        assert_eq!(ledger.balance(&id("1")), None);
        assert_eq!(ledger.apply(&id("1"), Operation::Get, 0), 0);
        assert_eq!(ledger.apply(&id("2"), Operation::Min, 4), -4);
    }

    #[test]
    fn test_add_and_subtract() {
        let ledger = MemoryLedger::new();
        assert_eq!(ledger.apply(&id("1"), Operation::Add, 5), 5);
        assert_eq!(ledger.apply(&id("1"), Operation::Add, 7), 12);
        assert_eq!(ledger.apply(&id("1"), Operation::Min, 2), 10);
        assert_eq!(ledger.apply(&id("1"), Operation::Get, 999), 10);
        assert_eq!(ledger.balance(&id("1")), Some(10));
    }

    #[test]
    fn test_identities_are_isolated() {
        let ledger = MemoryLedger::new();
        ledger.apply(&id("1"), Operation::Add, 5);
        assert_eq!(ledger.apply(&id("2"), Operation::Get, 0), 0);
    }

    #[test]
    fn test_saturates_on_overflow() {
        let ledger = MemoryLedger::new();
        ledger.apply(&id("1"), Operation::Add, i64::MAX);
        assert_eq!(ledger.apply(&id("1"), Operation::Add, 1), i64::MAX);
        assert_eq!(ledger.apply(&id("2"), Operation::Min, i64::MIN), i64::MAX);
    }
}
