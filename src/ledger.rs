// src/ledger.rs
//
// Ledger storage: accounts keyed by name, categories keyed by id, and
// transactions booked per category and date. The renderer never reads from
// here directly; report code turns ledger reads into markup.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::NaiveDate;
use indexmap::IndexMap;
use log::debug;

/// Amounts are stored in minor units (cents).
pub type Amount = i64;

pub type CategoryId = u64;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("account `{0}' already exists")]
    AccountExists(String),
    #[error("account `{0}' not found")]
    AccountNotFound(String),
    #[error("category `{name}' ({kind}) already exists in account `{account}'")]
    CategoryExists {
        account: String,
        name: String,
        kind: CategoryKind,
    },
    #[error("category {0} not found")]
    CategoryNotFound(CategoryId),
    #[error("category `{name}' ({kind}) not found in account `{account}'")]
    CategoryNameNotFound {
        account: String,
        name: String,
        kind: CategoryKind,
    },
    #[error("no transaction #{index} for category {category_id} at {date}")]
    TransactionNotFound {
        category_id: CategoryId,
        date: NaiveDate,
        index: usize,
    },
    #[error("invalid date range: {from} is after {to}")]
    InvalidDateRange { from: NaiveDate, to: NaiveDate },
    #[error("amount total overflows in account `{0}'")]
    AmountOverflow(String),
}

pub type Result<T> = std::result::Result<T, LedgerError>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CategoryKind {
    Income,
    Expense,
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryKind::Income => write!(f, "income"),
            CategoryKind::Expense => write!(f, "expense"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Account {
    pub name: String,
    pub opening_balance: Amount,
}

impl Account {
    pub fn new(name: &str, opening_balance: Amount) -> Self {
        Account {
            name: name.to_string(),
            opening_balance,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Category {
    pub id: CategoryId,
    pub account: String,
    pub name: String,
    pub kind: CategoryKind,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub category_id: CategoryId,
    pub date: NaiveDate,
    pub amount: Amount,
    pub memo: String,
}

/// Create/read/update/delete over accounts, categories and transactions.
///
/// Each call stands alone; nothing groups several calls atomically.
pub trait LedgerStore {
    fn create_account(&mut self, account: Account) -> Result<()>;
    fn account(&self, name: &str) -> Result<Account>;
    /// Replace the account stored as `name`. Renaming carries its categories
    /// along.
    fn update_account(&mut self, name: &str, account: Account) -> Result<()>;
    /// Remove the account with all its categories and their transactions.
    fn delete_account(&mut self, name: &str) -> Result<()>;

    fn create_category(&mut self, account: &str, name: &str, kind: CategoryKind)
        -> Result<CategoryId>;
    fn category(&self, id: CategoryId) -> Result<Category>;
    fn find_category(&self, account: &str, name: &str, kind: CategoryKind) -> Result<Category>;
    /// Categories of `account` in creation order.
    fn categories(&self, account: &str) -> Result<Vec<Category>>;
    fn rename_category(&mut self, id: CategoryId, name: &str) -> Result<()>;
    fn delete_category(&mut self, id: CategoryId) -> Result<()>;

    fn add_transaction(&mut self, txn: Transaction) -> Result<()>;
    /// Transactions of a category dated `from..=to`, by date then insertion.
    fn transactions(&self, category_id: CategoryId, from: NaiveDate, to: NaiveDate)
        -> Result<Vec<Transaction>>;
    /// Replace the `index`-th transaction booked on `date`.
    fn update_transaction(
        &mut self,
        category_id: CategoryId,
        date: NaiveDate,
        index: usize,
        txn: Transaction,
    ) -> Result<()>;
    /// Remove every transaction of a category on `date`, returning how many.
    fn delete_transactions(&mut self, category_id: CategoryId, date: NaiveDate) -> Result<usize>;
}

type DayBook = Vec<Transaction>;

/// In-memory [`LedgerStore`].
#[derive(Debug, Default)]
pub struct MemoryLedger {
    accounts: IndexMap<String, Account>,
    categories: IndexMap<CategoryId, Category>,
    bookings: HashMap<CategoryId, BTreeMap<NaiveDate, DayBook>>,
    next_id: CategoryId,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_account(&self, name: &str) -> Result<()> {
        if self.accounts.contains_key(name) {
            Ok(())
        } else {
            Err(LedgerError::AccountNotFound(name.to_string()))
        }
    }

    fn ensure_category(&self, id: CategoryId) -> Result<()> {
        if self.categories.contains_key(&id) {
            Ok(())
        } else {
            Err(LedgerError::CategoryNotFound(id))
        }
    }

    fn lookup(&self, account: &str, name: &str, kind: CategoryKind) -> Option<&Category> {
        self.categories
            .values()
            .find(|c| c.account == account && c.name == name && c.kind == kind)
    }

    fn book(&mut self, txn: Transaction) {
        self.bookings
            .entry(txn.category_id)
            .or_default()
            .entry(txn.date)
            .or_default()
            .push(txn);
    }
}

impl LedgerStore for MemoryLedger {
    fn create_account(&mut self, account: Account) -> Result<()> {
        if self.accounts.contains_key(&account.name) {
            return Err(LedgerError::AccountExists(account.name));
        }
        debug!("ledger: open account `{}'", account.name);
        self.accounts.insert(account.name.clone(), account);
        Ok(())
    }

    fn account(&self, name: &str) -> Result<Account> {
        self.accounts
            .get(name)
            .cloned()
            .ok_or_else(|| LedgerError::AccountNotFound(name.to_string()))
    }

    fn update_account(&mut self, name: &str, account: Account) -> Result<()> {
        let Some(index) = self.accounts.get_index_of(name) else {
            return Err(LedgerError::AccountNotFound(name.to_string()));
        };
        if account.name == name {
            self.accounts.insert(account.name.clone(), account);
            return Ok(());
        }
        if self.accounts.contains_key(&account.name) {
            return Err(LedgerError::AccountExists(account.name));
        }
        for category in self.categories.values_mut() {
            if category.account == name {
                category.account = account.name.clone();
            }
        }
        self.accounts.shift_remove(name);
        self.accounts.shift_insert(index, account.name.clone(), account);
        Ok(())
    }

    fn delete_account(&mut self, name: &str) -> Result<()> {
        if self.accounts.shift_remove(name).is_none() {
            return Err(LedgerError::AccountNotFound(name.to_string()));
        }
        let doomed: Vec<CategoryId> = self
            .categories
            .values()
            .filter(|c| c.account == name)
            .map(|c| c.id)
            .collect();
        for id in doomed {
            self.categories.shift_remove(&id);
            self.bookings.remove(&id);
        }
        debug!("ledger: removed account `{name}'");
        Ok(())
    }

    fn create_category(
        &mut self,
        account: &str,
        name: &str,
        kind: CategoryKind,
    ) -> Result<CategoryId> {
        self.ensure_account(account)?;
        if self.lookup(account, name, kind).is_some() {
            return Err(LedgerError::CategoryExists {
                account: account.to_string(),
                name: name.to_string(),
                kind,
            });
        }
        self.next_id += 1;
        let id = self.next_id;
        self.categories.insert(
            id,
            Category {
                id,
                account: account.to_string(),
                name: name.to_string(),
                kind,
            },
        );
        debug!("ledger: category {id} `{name}' ({kind}) in `{account}'");
        Ok(id)
    }

    fn category(&self, id: CategoryId) -> Result<Category> {
        self.categories
            .get(&id)
            .cloned()
            .ok_or(LedgerError::CategoryNotFound(id))
    }

    fn find_category(&self, account: &str, name: &str, kind: CategoryKind) -> Result<Category> {
        self.lookup(account, name, kind)
            .cloned()
            .ok_or_else(|| LedgerError::CategoryNameNotFound {
                account: account.to_string(),
                name: name.to_string(),
                kind,
            })
    }

    fn categories(&self, account: &str) -> Result<Vec<Category>> {
        self.ensure_account(account)?;
        Ok(self
            .categories
            .values()
            .filter(|c| c.account == account)
            .cloned()
            .collect())
    }

    fn rename_category(&mut self, id: CategoryId, name: &str) -> Result<()> {
        let current = self.category(id)?;
        if let Some(other) = self.lookup(&current.account, name, current.kind) {
            if other.id != id {
                return Err(LedgerError::CategoryExists {
                    account: current.account,
                    name: name.to_string(),
                    kind: current.kind,
                });
            }
        }
        if let Some(category) = self.categories.get_mut(&id) {
            category.name = name.to_string();
        }
        Ok(())
    }

    fn delete_category(&mut self, id: CategoryId) -> Result<()> {
        self.categories
            .shift_remove(&id)
            .ok_or(LedgerError::CategoryNotFound(id))?;
        self.bookings.remove(&id);
        Ok(())
    }

    fn add_transaction(&mut self, txn: Transaction) -> Result<()> {
        self.ensure_category(txn.category_id)?;
        self.book(txn);
        Ok(())
    }

    fn transactions(
        &self,
        category_id: CategoryId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Transaction>> {
        self.ensure_category(category_id)?;
        if from > to {
            return Err(LedgerError::InvalidDateRange { from, to });
        }
        let Some(days) = self.bookings.get(&category_id) else {
            return Ok(Vec::new());
        };
        Ok(days
            .range(from..=to)
            .flat_map(|(_, book)| book.iter().cloned())
            .collect())
    }

    fn update_transaction(
        &mut self,
        category_id: CategoryId,
        date: NaiveDate,
        index: usize,
        txn: Transaction,
    ) -> Result<()> {
        self.ensure_category(txn.category_id)?;
        let not_found = LedgerError::TransactionNotFound {
            category_id,
            date,
            index,
        };
        let book = self
            .bookings
            .get_mut(&category_id)
            .and_then(|days| days.get_mut(&date))
            .filter(|book| index < book.len())
            .ok_or(not_found)?;

        if txn.category_id == category_id && txn.date == date {
            book[index] = txn;
            return Ok(());
        }

        book.remove(index);
        if book.is_empty() {
            if let Some(days) = self.bookings.get_mut(&category_id) {
                days.remove(&date);
            }
        }
        self.book(txn);
        Ok(())
    }

    fn delete_transactions(&mut self, category_id: CategoryId, date: NaiveDate) -> Result<usize> {
        self.ensure_category(category_id)?;
        let removed = self
            .bookings
            .get_mut(&category_id)
            .and_then(|days| days.remove(&date))
            .map_or(0, |book| book.len());
        Ok(removed)
    }
}
