//! Property-based tests for PostingEngine.
//!
//! - Property 1: Posted batches balance
//! - Property 2: Cancellation nets every account to zero
//! - Property 3: Small imbalances are absorbed by round-off

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::batch::LedgerBatch;
use super::entry::{GlEntry, VoucherRef, VoucherType};
use super::service::{PostingEngine, PostingOptions};
use crate::fiscal::{FiscalCalendar, FiscalYear};
use crate::ports::{
    AccountDetails, ChartOfAccounts, CompanySettings, EntryStore, InMemoryLedgerStore,
};

const ACCOUNTS: [&str; 4] = ["Bank", "Rent", "Sales", "Debtors"];

/// Strategy to generate positive amounts (0.01 to 10,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate debit lines as (account index, amount).
fn debit_lines() -> impl Strategy<Value = Vec<(usize, Decimal)>> {
    prop::collection::vec((0..ACCOUNTS.len(), positive_amount()), 1..6)
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 5, 20).unwrap()
}

fn chart() -> ChartOfAccounts {
    let mut settings = CompanySettings::new("Acme", "USD");
    settings.round_off_account = Some("Round Off".to_string());

    ACCOUNTS
        .iter()
        .chain(&["Clearing", "Round Off"])
        .fold(ChartOfAccounts::new().with_company(settings), |chart, name| {
            chart.with_account(AccountDetails::new(*name, "Acme"))
        })
}

fn calendar() -> FiscalCalendar {
    FiscalCalendar::new(vec![FiscalYear::new(
        "2026",
        NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2026, 12, 31).unwrap(),
    )])
}

/// Debit lines balanced by one credit on the clearing account, plus `skew`.
fn make_batch(voucher_type: VoucherType, lines: &[(usize, Decimal)], skew: Decimal) -> LedgerBatch {
    let voucher = VoucherRef::new(voucher_type, "V-PROP");
    let total: Decimal = lines.iter().map(|(_, amount)| *amount).sum();

    let mut entries: Vec<GlEntry> = lines
        .iter()
        .map(|(index, amount)| {
            GlEntry::new(voucher.clone(), "Acme", date(), ACCOUNTS[*index]).with_debit(*amount)
        })
        .collect();
    entries.push(GlEntry::new(voucher, "Acme", date(), "Clearing").with_credit(total - skew));
    LedgerBatch::new(entries)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property 1: Any balanced batch posts, and what is stored balances.
    #[test]
    fn prop_balanced_batch_posts(lines in debit_lines()) {
        let (chart, calendar, store) = (chart(), calendar(), InMemoryLedgerStore::new());
        let engine = PostingEngine::new(&chart, &chart, &calendar, &store);

        let batch = make_batch(VoucherType::JournalEntry, &lines, Decimal::ZERO);
        let outcome = engine.post(&batch, PostingOptions::default()).unwrap();

        prop_assert!(outcome.round_off.is_none());
        prop_assert!(outcome.entries.len() <= lines.len() + 1);
        prop_assert!(LedgerBatch::new(store.gl_entries().unwrap()).is_balanced());
    }

    /// Property 2: After cancelling, every touched account is back at zero.
    #[test]
    fn prop_cancellation_nets_to_zero(lines in debit_lines()) {
        let (chart, calendar, store) = (chart(), calendar(), InMemoryLedgerStore::new());
        let engine = PostingEngine::new(&chart, &chart, &calendar, &store);
        let batch = make_batch(VoucherType::JournalEntry, &lines, Decimal::ZERO);

        engine.post(&batch, PostingOptions::default()).unwrap();
        engine.post(&batch, PostingOptions::cancellation()).unwrap();

        for account in ACCOUNTS.iter().chain(&["Clearing"]) {
            prop_assert_eq!(store.account_balance(account, "Acme").unwrap(), Decimal::ZERO);
        }
        let net: Decimal = store.gl_entries().unwrap().iter().map(|e| e.company_amount.net()).sum();
        prop_assert_eq!(net, Decimal::ZERO);
    }

    /// Property 3: An imbalance within the allowance is booked to round-off.
    #[test]
    fn prop_small_imbalance_rounded_off(lines in debit_lines(), cents in -50i64..=50i64) {
        let skew = Decimal::new(cents, 2);
        prop_assume!(cents != 0);
        prop_assume!(lines.iter().map(|(_, amount)| *amount).sum::<Decimal>() != skew);
        let (chart, calendar, store) = (chart(), calendar(), InMemoryLedgerStore::new());
        let engine = PostingEngine::new(&chart, &chart, &calendar, &store);

        let batch = make_batch(VoucherType::SalesInvoice, &lines, skew);
        let outcome = engine.post(&batch, PostingOptions::default()).unwrap();

        let round_off = outcome.round_off.unwrap();
        prop_assert_eq!(round_off.account.as_str(), "Round Off");
        prop_assert_eq!(round_off.company_amount.net(), -skew);
        prop_assert!(LedgerBatch::new(outcome.entries).is_balanced());
    }
}
