//! In-memory user store
//!
//! Each account has its own async mutex, held by a transaction for its whole
//! life, and a committed record behind a short synchronous lock. A transaction
//! stages writes on a private copy and publishes it on commit. Reads by id or
//! listing copy the committed record and never wait on a held account.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{NewAccount, StoreError, UserStore, UserTransaction};
use crate::account::{ProfileUpdate, UserAccount, UserId};

/// One account: its write lock and its last committed state
#[derive(Debug, Clone)]
struct AccountEntry {
    id: UserId,
    lock: Arc<Mutex<()>>,
    record: Arc<RwLock<UserAccount>>,
}

impl AccountEntry {
    fn read(&self) -> Result<UserAccount, StoreError> {
        self.record
            .read()
            .map(|account| account.clone())
            .map_err(|_| StoreError::Backend("account record poisoned".into()))
    }

    fn write(&self, apply: impl FnOnce(&mut UserAccount)) -> Result<(), StoreError> {
        let mut account = self
            .record
            .write()
            .map_err(|_| StoreError::Backend("account record poisoned".into()))?;
        apply(&mut account);
        Ok(())
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Backend("account index poisoned".into())
}

#[derive(Debug, Default)]
struct Inner {
    accounts: RwLock<HashMap<String, AccountEntry>>,
    next_id: AtomicI64,
    fail_writes: AtomicBool,
}

impl Inner {
    fn entry(&self, username: &str) -> Result<Option<AccountEntry>, StoreError> {
        let accounts = self.accounts.read().map_err(poisoned)?;
        Ok(accounts.get(username).cloned())
    }

    fn entry_by_id(&self, id: UserId) -> Result<Option<AccountEntry>, StoreError> {
        let accounts = self.accounts.read().map_err(poisoned)?;
        Ok(accounts.values().find(|entry| entry.id == id).cloned())
    }

    fn entries(&self) -> Result<Vec<AccountEntry>, StoreError> {
        let accounts = self.accounts.read().map_err(poisoned)?;
        Ok(accounts.values().cloned().collect())
    }

    /// Whether `entry` is still the live entry for its id (not deleted meanwhile)
    fn is_current(&self, entry: &AccountEntry) -> Result<bool, StoreError> {
        let accounts = self.accounts.read().map_err(poisoned)?;
        Ok(accounts
            .values()
            .any(|live| Arc::ptr_eq(&live.lock, &entry.lock)))
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(StoreError::Backend("write rejected by store".into()))
        } else {
            Ok(())
        }
    }
}

/// In-memory [`UserStore`]
///
/// Clones share the same accounts.
#[derive(Debug, Clone, Default)]
pub struct MemoryUserStore {
    inner: Arc<Inner>,
}

impl MemoryUserStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every write and commit fail until switched off again.
    ///
    /// Used to exercise rollback paths.
    pub fn fail_writes(&self, fail: bool) {
        self.inner.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Current committed state of an account
    pub async fn snapshot(&self, username: &str) -> Option<UserAccount> {
        self.inner.entry(username).ok()??.read().ok()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn begin(&self) -> Result<Box<dyn UserTransaction + '_>, StoreError> {
        Ok(Box::new(MemoryTransaction {
            inner: Arc::clone(&self.inner),
            held: None,
            staged: None,
            finished: false,
        }))
    }

    async fn insert_user(&self, account: NewAccount) -> Result<UserId, StoreError> {
        self.inner.check_writable()?;

        let mut accounts = self.inner.accounts.write().map_err(poisoned)?;

        if accounts.contains_key(&account.username) {
            return Err(StoreError::DuplicateUsername(account.username));
        }

        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let record = UserAccount {
            id,
            username: account.username.clone(),
            credential: account.credential,
            first_name: account.first_name,
            last_name: account.last_name,
            email: account.email,
            role: account.role,
            failed_attempts: 0,
            lockout_until: None,
        };
        accounts.insert(
            account.username,
            AccountEntry {
                id,
                lock: Arc::new(Mutex::new(())),
                record: Arc::new(RwLock::new(record)),
            },
        );

        Ok(id)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<UserAccount>, StoreError> {
        match self.inner.entry_by_id(id)? {
            Some(entry) => entry.read().map(Some),
            None => Ok(None),
        }
    }

    async fn list_users(&self) -> Result<Vec<UserAccount>, StoreError> {
        let mut users = self
            .inner
            .entries()?
            .iter()
            .map(AccountEntry::read)
            .collect::<Result<Vec<_>, _>>()?;
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    async fn update_profile(&self, id: UserId, update: &ProfileUpdate) -> Result<bool, StoreError> {
        self.inner.check_writable()?;

        let Some(entry) = self.inner.entry_by_id(id)? else {
            return Ok(false);
        };

        let _held = entry.lock.lock().await;
        if !self.inner.is_current(&entry)? {
            return Ok(false);
        }
        entry.write(|account| {
            account.first_name = update.first_name.clone();
            account.last_name = update.last_name.clone();
            account.email = update.email.clone();
        })?;
        Ok(true)
    }

    async fn unlock(&self, username: &str) -> Result<bool, StoreError> {
        self.inner.check_writable()?;

        let Some(entry) = self.inner.entry(username)? else {
            return Ok(false);
        };

        let _held = entry.lock.lock().await;
        if !self.inner.is_current(&entry)? {
            return Ok(false);
        }
        entry.write(|account| {
            account.failed_attempts = 0;
            account.lockout_until = None;
        })?;
        Ok(true)
    }

    async fn delete_user(&self, id: UserId) -> Result<bool, StoreError> {
        self.inner.check_writable()?;

        let Some(entry) = self.inner.entry_by_id(id)? else {
            return Ok(false);
        };

        // Wait out any transaction on the account before removing it
        let _held = entry.lock.lock().await;
        let mut accounts = self.inner.accounts.write().map_err(poisoned)?;
        let before = accounts.len();
        accounts.retain(|_, live| !Arc::ptr_eq(&live.lock, &entry.lock));
        Ok(accounts.len() < before)
    }
}

/// Transaction over a [`MemoryUserStore`]
pub struct MemoryTransaction {
    inner: Arc<Inner>,
    held: Option<(AccountEntry, OwnedMutexGuard<()>)>,
    staged: Option<UserAccount>,
    finished: bool,
}

impl MemoryTransaction {
    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.finished {
            Err(StoreError::TransactionClosed)
        } else {
            Ok(())
        }
    }

    fn staged_mut(&mut self, id: UserId) -> Result<&mut UserAccount, StoreError> {
        self.ensure_open()?;
        self.inner.check_writable()?;
        match self.staged.as_mut() {
            Some(account) if account.id == id => Ok(account),
            _ => Err(StoreError::UserNotFound(id)),
        }
    }

    fn release(&mut self) {
        self.staged = None;
        self.held = None;
        self.finished = true;
    }
}

#[async_trait]
impl UserTransaction for MemoryTransaction {
    async fn find_by_username(&mut self, username: &str) -> Result<Option<UserAccount>, StoreError> {
        self.ensure_open()?;

        if let Some(staged) = &self.staged {
            if staged.username == username {
                return Ok(Some(staged.clone()));
            }
            return Err(StoreError::Backend(
                "transaction already holds another account".into(),
            ));
        }

        let Some(entry) = self.inner.entry(username)? else {
            return Ok(None);
        };

        let guard = Arc::clone(&entry.lock).lock_owned().await;
        if !self.inner.is_current(&entry)? {
            return Ok(None);
        }
        let account = entry.read()?;
        self.held = Some((entry, guard));
        self.staged = Some(account.clone());
        Ok(Some(account))
    }

    async fn record_failed_attempt(
        &mut self,
        id: UserId,
        failed_attempts: u32,
        lockout_until: Option<DateTime<Utc>>,
    ) -> Result<(), StoreError> {
        let account = self.staged_mut(id)?;
        account.failed_attempts = failed_attempts;
        account.lockout_until = lockout_until;
        Ok(())
    }

    async fn reset_failed_attempts(&mut self, id: UserId) -> Result<(), StoreError> {
        let account = self.staged_mut(id)?;
        account.failed_attempts = 0;
        account.lockout_until = None;
        Ok(())
    }

    async fn replace_credential(&mut self, id: UserId, credential: &str) -> Result<(), StoreError> {
        let account = self.staged_mut(id)?;
        account.credential = credential.to_string();
        Ok(())
    }

    async fn commit(&mut self) -> Result<(), StoreError> {
        self.ensure_open()?;
        self.inner.check_writable()?;

        if let (Some((entry, _)), Some(staged)) = (self.held.as_ref(), self.staged.take()) {
            entry.write(|account| *account = staged)?;
        }
        self.release();
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), StoreError> {
        self.ensure_open()?;
        self.release();
        Ok(())
    }
}
