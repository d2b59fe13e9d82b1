//! In-memory collaborators for development, tests and thin callers.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use rust_decimal::Decimal;

use super::{
    AccountDetails, AccountLookup, CollaboratorError, CompanySettings, CompanySettingsLookup,
    EntryStore, PartyLedgerStore,
};
use crate::ledger::{GlEntry, PartyLedgerEntry, VoucherRef};

#[derive(Debug, Default)]
struct StoreState {
    gl_entries: Vec<GlEntry>,
    party_entries: Vec<PartyLedgerEntry>,
}

/// Ledger and party-ledger storage behind one lock.
///
/// Each call holds the lock for its whole duration, so batch saves and
/// cancel-and-save are all-or-nothing with respect to other callers.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    state: Mutex<StoreState>,
}

impl InMemoryLedgerStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, CollaboratorError> {
        self.state
            .lock()
            .map_err(|_| CollaboratorError::Storage("ledger store lock poisoned".to_string()))
    }

    /// Snapshot of every stored ledger entry in insertion order.
    pub fn gl_entries(&self) -> Result<Vec<GlEntry>, CollaboratorError> {
        Ok(self.lock()?.gl_entries.clone())
    }

    /// Snapshot of every stored party-ledger entry in insertion order.
    pub fn party_entries(&self) -> Result<Vec<PartyLedgerEntry>, CollaboratorError> {
        Ok(self.lock()?.party_entries.clone())
    }
}

fn ensure_new_ids(existing: &[GlEntry], entries: &[GlEntry]) -> Result<(), CollaboratorError> {
    let mut ids: HashSet<_> = existing.iter().map(|e| e.id).collect();
    for entry in entries {
        if !ids.insert(entry.id) {
            return Err(CollaboratorError::Conflict(format!(
                "ledger entry {} already stored",
                entry.id
            )));
        }
    }
    Ok(())
}

impl EntryStore for InMemoryLedgerStore {
    fn save_batch(&self, entries: &[GlEntry]) -> Result<(), CollaboratorError> {
        let mut state = self.lock()?;
        ensure_new_ids(&state.gl_entries, entries)?;
        state.gl_entries.extend_from_slice(entries);
        Ok(())
    }

    fn entries_for_voucher(&self, voucher: &VoucherRef) -> Result<Vec<GlEntry>, CollaboratorError> {
        Ok(self
            .lock()?
            .gl_entries
            .iter()
            .filter(|e| e.voucher == *voucher)
            .cloned()
            .collect())
    }

    fn mark_cancelled(&self, voucher: &VoucherRef) -> Result<(), CollaboratorError> {
        self.lock()?
            .gl_entries
            .iter_mut()
            .filter(|e| e.voucher == *voucher)
            .for_each(|e| e.is_cancelled = true);
        Ok(())
    }

    fn cancel_and_save(
        &self,
        voucher: &VoucherRef,
        entries: &[GlEntry],
    ) -> Result<(), CollaboratorError> {
        let mut state = self.lock()?;
        ensure_new_ids(&state.gl_entries, entries)?;
        state
            .gl_entries
            .iter_mut()
            .filter(|e| e.voucher == *voucher)
            .for_each(|e| e.is_cancelled = true);
        state.gl_entries.extend_from_slice(entries);
        Ok(())
    }

    fn account_balance(&self, account: &str, company: &str) -> Result<Decimal, CollaboratorError> {
        Ok(self
            .lock()?
            .gl_entries
            .iter()
            .filter(|e| !e.is_cancelled && e.account == account && e.company == company)
            .map(|e| e.company_amount.net())
            .sum())
    }
}

impl PartyLedgerStore for InMemoryLedgerStore {
    fn save_party_entries(&self, entries: &[PartyLedgerEntry]) -> Result<(), CollaboratorError> {
        self.lock()?.party_entries.extend_from_slice(entries);
        Ok(())
    }

    fn party_entries_for_voucher(
        &self,
        voucher: &VoucherRef,
    ) -> Result<Vec<PartyLedgerEntry>, CollaboratorError> {
        Ok(self
            .lock()?
            .party_entries
            .iter()
            .filter(|e| e.voucher == *voucher)
            .cloned()
            .collect())
    }

    fn mark_delinked(&self, voucher: &VoucherRef) -> Result<(), CollaboratorError> {
        self.lock()?
            .party_entries
            .iter_mut()
            .filter(|e| e.voucher == *voucher)
            .for_each(|e| e.delinked = true);
        Ok(())
    }
}

/// Account and company master data held in maps.
#[derive(Debug, Clone, Default)]
pub struct ChartOfAccounts {
    accounts: HashMap<String, AccountDetails>,
    companies: HashMap<String, CompanySettings>,
}

impl ChartOfAccounts {
    /// Creates an empty chart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a company.
    #[must_use]
    pub fn with_company(mut self, settings: CompanySettings) -> Self {
        self.companies.insert(settings.name.clone(), settings);
        self
    }

    /// Adds or replaces an account.
    #[must_use]
    pub fn with_account(mut self, account: AccountDetails) -> Self {
        self.accounts.insert(account.name.clone(), account);
        self
    }
}

impl AccountLookup for ChartOfAccounts {
    fn account(&self, name: &str) -> Result<AccountDetails, CollaboratorError> {
        self.accounts
            .get(name)
            .cloned()
            .ok_or_else(|| CollaboratorError::NotFound(format!("account {name}")))
    }
}

impl CompanySettingsLookup for ChartOfAccounts {
    fn company_settings(&self, company: &str) -> Result<CompanySettings, CollaboratorError> {
        self.companies
            .get(company)
            .cloned()
            .ok_or_else(|| CollaboratorError::NotFound(format!("company {company}")))
    }
}
