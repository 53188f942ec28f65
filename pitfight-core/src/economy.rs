//! Economy collaborator.
//!
//! The host platform owns account balances and inventories; the core
//! only needs the capability interface below. Exactly one
//! implementation is selected at process start, and the core never
//! branches on which one is active.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Capability interface over the host economy.
///
/// Calls that gate a state change (withdrawals) are awaited before the
/// core commits anything that depends on the result.
#[async_trait]
pub trait Economy: Send + Sync {
    /// Whether the account can cover `amount`.
    async fn has_funds(&self, fighter_id: &str, amount: i64) -> bool;

    /// Withdraw `amount`; returns false (and takes nothing) if the
    /// account cannot cover it.
    async fn withdraw(&self, fighter_id: &str, amount: i64) -> bool;

    /// Credit `amount` to the account.
    async fn deposit(&self, fighter_id: &str, amount: i64) -> bool;

    /// Grant an inventory item.
    async fn add_item(&self, fighter_id: &str, item: &str, count: u32) -> bool;
}

/// In-process economy for standalone deployments and tests.
///
/// Accounts are created lazily with a configurable starting balance.
pub struct MemoryEconomy {
    starting_balance: i64,
    accounts: Mutex<HashMap<String, Account>>,
}

#[derive(Default)]
struct Account {
    balance: i64,
    items: HashMap<String, u32>,
}

impl MemoryEconomy {
    pub fn new(starting_balance: i64) -> Self {
        Self {
            starting_balance,
            accounts: Mutex::new(HashMap::new()),
        }
    }

    /// Current balance, creating the account if needed.
    pub async fn balance(&self, fighter_id: &str) -> i64 {
        let mut accounts = self.accounts.lock().await;
        self.account_mut(&mut accounts, fighter_id).balance
    }

    /// How many of `item` the account holds.
    pub async fn item_count(&self, fighter_id: &str, item: &str) -> u32 {
        let mut accounts = self.accounts.lock().await;
        let account = self.account_mut(&mut accounts, fighter_id);
        account.items.get(item).copied().unwrap_or(0)
    }

    fn account_mut<'a>(
        &self,
        accounts: &'a mut HashMap<String, Account>,
        fighter_id: &str,
    ) -> &'a mut Account {
        accounts.entry(fighter_id.to_owned()).or_insert(Account {
            balance: self.starting_balance,
            items: HashMap::new(),
        })
    }
}

#[async_trait]
impl Economy for MemoryEconomy {
    async fn has_funds(&self, fighter_id: &str, amount: i64) -> bool {
        self.balance(fighter_id).await >= amount
    }

    async fn withdraw(&self, fighter_id: &str, amount: i64) -> bool {
        let mut accounts = self.accounts.lock().await;
        let account = self.account_mut(&mut accounts, fighter_id);
        if account.balance < amount {
            return false;
        }
        account.balance -= amount;
        true
    }

    async fn deposit(&self, fighter_id: &str, amount: i64) -> bool {
        let mut accounts = self.accounts.lock().await;
        self.account_mut(&mut accounts, fighter_id).balance += amount;
        true
    }

    async fn add_item(&self, fighter_id: &str, item: &str, count: u32) -> bool {
        let mut accounts = self.accounts.lock().await;
        let account = self.account_mut(&mut accounts, fighter_id);
        *account.items.entry(item.to_owned()).or_insert(0) += count;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn withdraw_refuses_overdraft() {
        let economy = MemoryEconomy::new(500);
        assert!(!economy.withdraw("f1", 600).await);
        assert_eq!(economy.balance("f1").await, 500);
        assert!(economy.withdraw("f1", 500).await);
        assert_eq!(economy.balance("f1").await, 0);
    }

    #[tokio::test]
    async fn deposit_and_items() {
        let economy = MemoryEconomy::new(0);
        assert!(economy.deposit("f1", 1000).await);
        assert!(economy.has_funds("f1", 1000).await);
        assert!(economy.add_item("f1", "bandage", 3).await);
        assert_eq!(economy.item_count("f1", "bandage").await, 3);
    }
}
