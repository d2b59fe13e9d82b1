//! Posting engine.
//!
//! The engine owns no data. Every lookup and write goes through a
//! collaborator contract from [`crate::ports`]; optional collaborators left
//! unset simply skip their stage.

use std::collections::HashMap;

use chrono::NaiveDate;
use ledgerpost_shared::PostingConfig;
use ledgerpost_shared::types::PartyLedgerEntryId;
use tracing::{debug, info, warn};

use super::batch::LedgerBatch;
use super::entry::{GlEntry, VoucherRef};
use super::error::PostingError;
use super::merge::merge_similar_entries;
use super::normalize::toggle_negative_amounts;
use super::party::{PartyLedgerEntry, derive_party_ledger};
use super::reconcile::{RoundOffTarget, reconcile};
use super::reversal::reverse_entries;
use super::validation::{
    validate_account_details, validate_balance_sign, validate_books_closed,
    validate_disabled_accounts, validate_freezing_date, validate_single_voucher,
};
use crate::dimension::make_offsetting_entries;
use crate::ports::{
    AccountDetails, AccountLookup, AccountingPeriodChecker, BudgetValidator, CompanySettings,
    CompanySettingsLookup, DimensionProvider, EntryStore, FiscalYearLookup, PartyLedgerStore,
};

/// Options for one posting call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostingOptions {
    /// Reverse the stored entries of the batch's voucher instead of posting.
    pub cancel: bool,
    /// Merge entries sharing a ledger position.
    pub merge_entries: bool,
    /// Advance adjustment: bypasses frozen accounts, the freezing date and
    /// the balance-sign check.
    pub adv_adj: bool,
    /// Re-deriving a historical batch: supersedes existing entries and skips
    /// budget and account-detail checks.
    pub from_repost: bool,
}

impl Default for PostingOptions {
    fn default() -> Self {
        Self {
            cancel: false,
            merge_entries: true,
            adv_adj: false,
            from_repost: false,
        }
    }
}

impl PostingOptions {
    /// Options for cancelling a voucher.
    #[must_use]
    pub fn cancellation() -> Self {
        Self {
            cancel: true,
            ..Self::default()
        }
    }

    /// Options for reposting a voucher.
    #[must_use]
    pub fn repost() -> Self {
        Self {
            from_repost: true,
            ..Self::default()
        }
    }
}

/// What a successful call persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostingOutcome {
    /// Ledger entries written (reversals when cancelling).
    pub entries: Vec<GlEntry>,
    /// Party-ledger entries written.
    pub party_ledger: Vec<PartyLedgerEntry>,
    /// Round-off line among `entries`, if one was synthesized or adjusted.
    pub round_off: Option<GlEntry>,
}

type Accounts = HashMap<String, AccountDetails>;

/// Validates, transforms and persists ledger batches.
pub struct PostingEngine<'a> {
    accounts: &'a dyn AccountLookup,
    companies: &'a dyn CompanySettingsLookup,
    fiscal_years: &'a dyn FiscalYearLookup,
    store: &'a dyn EntryStore,
    periods: Option<&'a dyn AccountingPeriodChecker>,
    party_ledger: Option<&'a dyn PartyLedgerStore>,
    budget: Option<&'a dyn BudgetValidator>,
    dimensions: Option<&'a dyn DimensionProvider>,
    config: PostingConfig,
}

impl<'a> PostingEngine<'a> {
    /// Creates an engine with the required collaborators and default configuration.
    #[must_use]
    pub fn new(
        accounts: &'a dyn AccountLookup,
        companies: &'a dyn CompanySettingsLookup,
        fiscal_years: &'a dyn FiscalYearLookup,
        store: &'a dyn EntryStore,
    ) -> Self {
        Self {
            accounts,
            companies,
            fiscal_years,
            store,
            periods: None,
            party_ledger: None,
            budget: None,
            dimensions: None,
            config: PostingConfig::default(),
        }
    }

    /// Sets the rounding and tolerance policy.
    #[must_use]
    pub fn with_config(mut self, config: PostingConfig) -> Self {
        self.config = config;
        self
    }

    /// Enables accounting-period closing checks.
    #[must_use]
    pub fn with_period_checker(mut self, periods: &'a dyn AccountingPeriodChecker) -> Self {
        self.periods = Some(periods);
        self
    }

    /// Enables the party-ledger projection.
    #[must_use]
    pub fn with_party_ledger(mut self, store: &'a dyn PartyLedgerStore) -> Self {
        self.party_ledger = Some(store);
        self
    }

    /// Enables budget enforcement.
    #[must_use]
    pub fn with_budget_validator(mut self, budget: &'a dyn BudgetValidator) -> Self {
        self.budget = Some(budget);
        self
    }

    /// Enables dimension offsetting.
    #[must_use]
    pub fn with_dimension_provider(mut self, dimensions: &'a dyn DimensionProvider) -> Self {
        self.dimensions = Some(dimensions);
        self
    }

    /// Returns the active configuration.
    #[must_use]
    pub fn config(&self) -> &PostingConfig {
        &self.config
    }

    /// Posts a batch, or cancels its voucher when `options.cancel` is set.
    ///
    /// Any failing step aborts the call; nothing is persisted after a failure.
    #[tracing::instrument(
        skip_all,
        fields(
            voucher_type = batch.voucher().map(|v| v.voucher_type.as_str()),
            voucher_no = batch.voucher().map(|v| v.voucher_no.as_str()),
            cancel = options.cancel,
        )
    )]
    pub fn post(
        &self,
        batch: &LedgerBatch,
        options: PostingOptions,
    ) -> Result<PostingOutcome, PostingError> {
        let result = if options.cancel {
            validate_single_voucher(batch)
                .map(|first| first.voucher.clone())
                .and_then(|voucher| self.reverse(&voucher, options))
        } else {
            self.make_entries(batch, options)
        };
        result.inspect_err(|err| warn!(code = err.error_code(), error = %err, "posting aborted"))
    }

    /// Cancels every active entry of `voucher` by posting its reversal.
    #[tracing::instrument(
        skip_all,
        fields(voucher_type = voucher.voucher_type.as_str(), voucher_no = %voucher.voucher_no)
    )]
    pub fn cancel(
        &self,
        voucher: &VoucherRef,
        options: PostingOptions,
    ) -> Result<PostingOutcome, PostingError> {
        self.reverse(voucher, options)
            .inspect_err(|err| warn!(code = err.error_code(), error = %err, "cancellation aborted"))
    }

    #[allow(clippy::too_many_lines)]
    fn make_entries(
        &self,
        batch: &LedgerBatch,
        options: PostingOptions,
    ) -> Result<PostingOutcome, PostingError> {
        let first = validate_single_voucher(batch)?;
        let voucher = first.voucher.clone();
        let company = first.company.clone();
        let posting_date = first.posting_date;
        let closing = voucher.voucher_type.is_period_closing();
        let precision = self.config.precision;

        let previous = self.active_entries(&voucher)?;
        if !previous.is_empty() && !options.from_repost {
            return Err(PostingError::VoucherAlreadyPosted(voucher));
        }

        if let Some(budget) = self.budget
            && !closing
            && !options.from_repost
            && let Some(violation) = budget
                .check_budget(batch)
                .map_err(PostingError::collaborator("budget check"))?
        {
            return Err(PostingError::BudgetExceeded(violation));
        }

        let mut working = batch.clone();
        if let Some(provider) = self.dimensions
            && !closing
        {
            let dimensions = provider
                .offsetting_dimensions(&working, &company)
                .map_err(PostingError::collaborator("dimension lookup"))?;
            if !dimensions.is_empty() {
                let offsets = make_offsetting_entries(&working, &dimensions);
                debug!(
                    dimensions = dimensions.len(),
                    offsets = offsets.len(),
                    "appended dimension offsets"
                );
                working = working.appended(offsets);
            }
        }

        self.check_accounting_period(&company, &voucher, posting_date)?;

        let mut accounts = Accounts::new();
        self.resolve_accounts(working.entries(), &mut accounts)?;
        validate_disabled_accounts(&working, &accounts)?;

        let processed = self.process(&working, options, &accounts);
        if processed.len() < 2 {
            return Err(PostingError::InsufficientEntries {
                count: processed.len(),
            });
        }

        let party_ledger = if self.party_ledger.is_some() && !closing {
            derive_party_ledger(&processed, &accounts, false)
        } else {
            Vec::new()
        };

        let settings = self.company_settings(&company)?;
        let target = settings.round_off_account.clone().map(|account| RoundOffTarget {
            account,
            cost_center: settings.round_off_cost_center.clone(),
        });
        let reconciliation = reconcile(&processed, &self.config, target.as_ref())?;
        let round_off_id = reconciliation.round_off.as_ref().map(|e| e.id);
        let mut entries = reconciliation.batch.into_entries();

        if !options.from_repost {
            self.resolve_accounts(&entries, &mut accounts)?;
            for entry in &mut entries {
                if let Some(details) = accounts.get(&entry.account) {
                    validate_account_details(
                        entry,
                        details,
                        &settings.default_currency,
                        options.adv_adj,
                        precision,
                    )?;
                }
            }
        }

        validate_freezing_date(posting_date, &settings, options.adv_adj)?;
        validate_books_closed(&working, &settings)?;

        let fiscal_year = self.fiscal_year_name(posting_date, &company)?;
        for entry in &mut entries {
            entry.fiscal_year = Some(fiscal_year.clone());
        }

        let entries = LedgerBatch::new(entries);
        if !options.from_repost && !options.adv_adj {
            validate_balance_sign(&entries, &accounts, precision, |account| {
                self.store
                    .account_balance(account, &company)
                    .map_err(PostingError::collaborator("account balance lookup"))
            })?;
        }
        let entries = entries.into_entries();

        let party_store = self.party_ledger.filter(|_| !closing);
        Self::persist(party_store, &voucher, &party_ledger, !previous.is_empty(), || {
            if previous.is_empty() {
                self.store
                    .save_batch(&entries)
                    .map_err(PostingError::collaborator("save ledger entries"))
            } else {
                self.store
                    .cancel_and_save(&voucher, &entries)
                    .map_err(PostingError::collaborator("repost ledger entries"))
            }
        })?;

        info!(
            voucher = %voucher,
            entries = entries.len(),
            party_entries = party_ledger.len(),
            repost = !previous.is_empty(),
            "posted ledger entries"
        );

        let round_off = round_off_id.and_then(|id| entries.iter().find(|e| e.id == id).cloned());
        Ok(PostingOutcome {
            entries,
            party_ledger,
            round_off,
        })
    }

    fn reverse(
        &self,
        voucher: &VoucherRef,
        options: PostingOptions,
    ) -> Result<PostingOutcome, PostingError> {
        let originals = LedgerBatch::new(self.active_entries(voucher)?);
        let Some(first) = originals.entries().first() else {
            return Err(PostingError::VoucherNotFound(voucher.clone()));
        };
        let company = first.company.clone();
        let posting_date = first.posting_date;

        self.check_accounting_period(&company, voucher, posting_date)?;
        let settings = self.company_settings(&company)?;
        validate_freezing_date(posting_date, &settings, options.adv_adj)?;
        validate_books_closed(&originals, &settings)?;

        let precision = self.config.precision;
        let reversal: Vec<GlEntry> =
            reverse_entries(originals.entries(), &self.config.cancellation_remark_prefix)
                .into_iter()
                .filter(|e| !e.company_amount.is_zero_at(precision))
                .collect();

        let party_ledger = match self.party_ledger {
            Some(_) if !voucher.voucher_type.is_period_closing() => {
                let mut accounts = Accounts::new();
                let party_lines = originals.entries().iter().filter(|e| e.has_party());
                self.resolve_accounts(party_lines, &mut accounts)?;
                derive_party_ledger(&originals, &accounts, true)
            }
            _ => Vec::new(),
        };

        let party_store = self
            .party_ledger
            .filter(|_| !voucher.voucher_type.is_period_closing());
        Self::persist(party_store, voucher, &party_ledger, true, || {
            self.store
                .cancel_and_save(voucher, &reversal)
                .map_err(PostingError::collaborator("cancel ledger entries"))
        })?;

        info!(voucher = %voucher, entries = reversal.len(), "cancelled ledger entries");
        Ok(PostingOutcome {
            entries: reversal,
            party_ledger,
            round_off: None,
        })
    }

    /// Merge (unless disabled or closing) then normalize.
    fn process(
        &self,
        batch: &LedgerBatch,
        options: PostingOptions,
        accounts: &Accounts,
    ) -> LedgerBatch {
        let Some(voucher) = batch.voucher() else {
            return batch.clone();
        };

        let merged = if options.merge_entries && !voucher.voucher_type.is_period_closing() {
            let revaluation = voucher.voucher_type.books_exchange_gain_loss();
            let merged = merge_similar_entries(batch, self.config.precision, |e| {
                revaluation || accounts.get(&e.account).is_some_and(|a| a.is_exchange_gain_loss)
            });
            debug!(before = batch.len(), after = merged.len(), "merged similar entries");
            merged
        } else {
            batch.clone()
        };

        toggle_negative_amounts(&merged)
    }

    /// Writes the party ledger, then runs `commit` to write the ledger entries.
    ///
    /// The ledger write goes last because it is the only one that cannot be
    /// undone. With `supersede` the voucher's linked party rows are delinked
    /// before `rows` are saved. If any write fails, the voucher's party rows
    /// are delinked and the rows linked before the call are saved again
    /// under fresh ids.
    fn persist(
        party_store: Option<&dyn PartyLedgerStore>,
        voucher: &VoucherRef,
        rows: &[PartyLedgerEntry],
        supersede: bool,
        commit: impl FnOnce() -> Result<(), PostingError>,
    ) -> Result<(), PostingError> {
        let Some(store) = party_store else {
            return commit();
        };

        let linked: Vec<PartyLedgerEntry> = if supersede {
            store
                .party_entries_for_voucher(voucher)
                .map_err(PostingError::collaborator("fetch party ledger"))?
                .into_iter()
                .filter(|row| !row.delinked)
                .collect()
        } else {
            Vec::new()
        };

        let written =
            Self::write_party_rows(store, voucher, rows, supersede).and_then(|()| commit());
        if written.is_err() {
            Self::restore_party_rows(store, voucher, linked);
        }
        written
    }

    fn write_party_rows(
        store: &dyn PartyLedgerStore,
        voucher: &VoucherRef,
        rows: &[PartyLedgerEntry],
        supersede: bool,
    ) -> Result<(), PostingError> {
        if supersede {
            store
                .mark_delinked(voucher)
                .map_err(PostingError::collaborator("delink party ledger"))?;
        }
        if !rows.is_empty() {
            store
                .save_party_entries(rows)
                .map_err(PostingError::collaborator("save party ledger"))?;
        }
        Ok(())
    }

    fn restore_party_rows(
        store: &dyn PartyLedgerStore,
        voucher: &VoucherRef,
        linked: Vec<PartyLedgerEntry>,
    ) {
        let relinked: Vec<PartyLedgerEntry> = linked
            .into_iter()
            .map(|row| PartyLedgerEntry {
                id: PartyLedgerEntryId::new(),
                ..row
            })
            .collect();

        let restored = store.mark_delinked(voucher).and_then(|()| {
            if relinked.is_empty() {
                Ok(())
            } else {
                store.save_party_entries(&relinked)
            }
        });
        match restored {
            Ok(()) => debug!(voucher = %voucher, rows = relinked.len(), "restored party ledger"),
            Err(err) => warn!(voucher = %voucher, error = %err, "party ledger left unrestored"),
        }
    }

    fn active_entries(&self, voucher: &VoucherRef) -> Result<Vec<GlEntry>, PostingError> {
        Ok(self
            .store
            .entries_for_voucher(voucher)
            .map_err(PostingError::collaborator("fetch ledger entries"))?
            .into_iter()
            .filter(|e| !e.is_cancelled)
            .collect())
    }

    fn resolve_accounts<'e>(
        &self,
        entries: impl IntoIterator<Item = &'e GlEntry>,
        accounts: &mut Accounts,
    ) -> Result<(), PostingError> {
        for entry in entries {
            if accounts.contains_key(&entry.account) {
                continue;
            }
            let details = self
                .accounts
                .account(&entry.account)
                .map_err(PostingError::collaborator("account lookup"))?;
            accounts.insert(entry.account.clone(), details);
        }
        Ok(())
    }

    fn company_settings(&self, company: &str) -> Result<CompanySettings, PostingError> {
        self.companies
            .company_settings(company)
            .map_err(PostingError::collaborator("company settings lookup"))
    }

    fn check_accounting_period(
        &self,
        company: &str,
        voucher: &VoucherRef,
        date: NaiveDate,
    ) -> Result<(), PostingError> {
        let Some(periods) = self.periods else {
            return Ok(());
        };
        let document_type = voucher.voucher_type.as_str();
        match periods
            .closed_period(company, document_type, date)
            .map_err(PostingError::collaborator("accounting period check"))?
        {
            Some(period) => {
                debug!(period = %period.description, "accounting period closed");
                Err(PostingError::PeriodClosed {
                    company: company.to_string(),
                    document_type: document_type.to_string(),
                    date,
                    period: period.name,
                })
            }
            None => Ok(()),
        }
    }

    fn fiscal_year_name(&self, date: NaiveDate, company: &str) -> Result<String, PostingError> {
        self.fiscal_years
            .fiscal_year(date, company)
            .map_err(PostingError::collaborator("fiscal year lookup"))?
            .map(|year| year.name)
            .ok_or_else(|| PostingError::FiscalYearNotFound {
                date,
                company: company.to_string(),
            })
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
