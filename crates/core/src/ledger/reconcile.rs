//! Debit/credit reconciliation and round-off synthesis.

use ledgerpost_shared::PostingConfig;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::batch::LedgerBatch;
use super::entry::{DebitCredit, GlEntry, VoucherRef};
use super::error::PostingError;

/// Where round-off differences are booked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundOffTarget {
    /// Round-off account.
    pub account: String,
    /// Round-off cost center.
    pub cost_center: Option<String>,
}

/// Result of reconciling a batch.
#[derive(Debug, Clone)]
pub struct Reconciliation {
    /// The batch with company amounts rounded and any round-off applied.
    pub batch: LedgerBatch,
    /// The synthesized or adjusted round-off line, if one remains.
    pub round_off: Option<GlEntry>,
    /// Difference left after round-off.
    pub residual: Decimal,
}

/// Asserts the batch balances within its voucher type's allowance.
///
/// Company amounts are rounded to the configured precision first. A
/// difference of at least one minimal unit but within the allowance is
/// booked to `target`; without a target it is left in place. Exchange
/// gain/loss vouchers never fail on the difference.
pub fn reconcile(
    batch: &LedgerBatch,
    config: &PostingConfig,
    target: Option<&RoundOffTarget>,
) -> Result<Reconciliation, PostingError> {
    let Some(voucher) = batch.voucher().cloned() else {
        return Ok(Reconciliation {
            batch: batch.clone(),
            round_off: None,
            residual: Decimal::ZERO,
        });
    };

    let precision = config.precision;
    let allowance = config.allowance_for(voucher.voucher_type.as_str());

    let mut entries: Vec<GlEntry> = batch
        .entries()
        .iter()
        .cloned()
        .map(|mut e| {
            e.company_amount = e.company_amount.rounded(precision);
            e
        })
        .collect();

    let difference = LedgerBatch::new(entries.clone()).difference(precision);
    check_allowance(&voucher, difference, allowance)?;

    let mut round_off = None;
    if difference.abs() >= config.min_unit() && difference.abs() <= allowance {
        match target {
            Some(target) => {
                round_off = apply_round_off(&mut entries, difference, target, config.min_unit());
                debug!(
                    voucher = %voucher,
                    %difference,
                    account = %target.account,
                    "booked round-off"
                );
            }
            None => warn!(
                voucher = %voucher,
                %difference,
                "no round-off account configured, difference left unresolved"
            ),
        }
    }

    let batch = LedgerBatch::new(entries);
    let residual = batch.difference(precision);
    check_allowance(&voucher, residual, allowance)?;

    Ok(Reconciliation {
        batch,
        round_off,
        residual,
    })
}

fn check_allowance(
    voucher: &VoucherRef,
    difference: Decimal,
    allowance: Decimal,
) -> Result<(), PostingError> {
    if difference.abs() > allowance && !voucher.voucher_type.books_exchange_gain_loss() {
        return Err(PostingError::DebitCreditMismatch {
            voucher_type: voucher.voucher_type.clone(),
            voucher_no: voucher.voucher_no.clone(),
            difference,
        });
    }
    Ok(())
}

/// Amounts that cancel a debit-minus-credit difference.
fn offsetting_amounts(difference: Decimal) -> DebitCredit {
    if difference < Decimal::ZERO {
        DebitCredit::debit(difference.abs())
    } else {
        DebitCredit::credit(difference)
    }
}

/// Books `difference` to the round-off account.
///
/// An existing line on that account absorbs the difference and is removed
/// when it nets to zero; otherwise a new line is appended.
fn apply_round_off(
    entries: &mut Vec<GlEntry>,
    difference: Decimal,
    target: &RoundOffTarget,
    min_unit: Decimal,
) -> Option<GlEntry> {
    if let Some(position) = entries.iter().position(|e| e.account == target.account) {
        let remaining = difference - entries[position].company_amount.net();
        if remaining.abs() < min_unit {
            entries.remove(position);
            return None;
        }
        let line = &mut entries[position];
        line.company_amount = offsetting_amounts(remaining);
        line.account_amount = line.company_amount;
        line.transaction_amount = line.company_amount;
        return Some(line.clone());
    }

    let first = entries.first()?;
    let mut line = GlEntry::new(
        first.voucher.clone(),
        first.company.clone(),
        first.posting_date,
        target.account.clone(),
    )
    .with_amounts(offsetting_amounts(difference));
    line.cost_center.clone_from(&target.cost_center);
    line.remarks.clone_from(&first.remarks);
    line.finance_book.clone_from(&first.finance_book);

    entries.push(line.clone());
    Some(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::entry::VoucherType;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn entry(voucher_type: VoucherType, account: &str) -> GlEntry {
        GlEntry::new(
            VoucherRef::new(voucher_type, "V-0001"),
            "Acme",
            NaiveDate::from_ymd_opt(2026, 4, 4).unwrap(),
            account,
        )
    }

    fn target() -> RoundOffTarget {
        RoundOffTarget {
            account: "Round Off".to_string(),
            cost_center: Some("Main".to_string()),
        }
    }

    fn reconciled(batch: &LedgerBatch) -> Reconciliation {
        reconcile(batch, &PostingConfig::default(), Some(&target())).unwrap()
    }

    fn invoice(debit: Decimal, credit: Decimal) -> LedgerBatch {
        LedgerBatch::new(vec![
            entry(VoucherType::SalesInvoice, "Debtors").with_debit(debit),
            entry(VoucherType::SalesInvoice, "Sales").with_credit(credit),
        ])
    }

    #[test]
    fn test_balanced_batch_untouched() {
        let result = reconciled(&invoice(dec!(100), dec!(100)));

        assert_eq!(result.batch.len(), 2);
        assert!(result.round_off.is_none());
        assert_eq!(result.residual, Decimal::ZERO);
    }

    #[test]
    fn test_small_difference_synthesizes_credit() {
        let result = reconciled(&invoice(dec!(100.03), dec!(100.00)));

        let round_off = result.round_off.unwrap();
        assert_eq!(round_off.account, "Round Off");
        assert_eq!(round_off.cost_center.as_deref(), Some("Main"));
        assert_eq!(round_off.company_amount, DebitCredit::credit(dec!(0.03)));
        assert_eq!(result.batch.len(), 3);
        assert_eq!(result.residual, Decimal::ZERO);
    }

    #[test]
    fn test_credit_heavy_difference_synthesizes_debit() {
        let result = reconciled(&invoice(dec!(99.98), dec!(100.00)));
        assert_eq!(
            result.round_off.unwrap().company_amount,
            DebitCredit::debit(dec!(0.02))
        );
    }

    #[test]
    fn test_difference_above_allowance_fails() {
        let batch = LedgerBatch::new(vec![
            entry(VoucherType::JournalEntry, "Cash").with_debit(dec!(100.06)),
            entry(VoucherType::JournalEntry, "Capital").with_credit(dec!(100.00)),
        ]);

        let err = reconcile(&batch, &PostingConfig::default(), Some(&target())).unwrap_err();
        match err {
            PostingError::DebitCreditMismatch { voucher_type, voucher_no, difference } => {
                assert_eq!(voucher_type, VoucherType::JournalEntry);
                assert_eq!(voucher_no, "V-0001");
                assert_eq!(difference, dec!(0.06));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_sub_unit_difference_ignored() {
        let result = reconciled(&invoice(dec!(100.004), dec!(100.00)));
        assert!(result.round_off.is_none());
        assert_eq!(result.batch.entries()[0].company_amount, DebitCredit::debit(dec!(100.00)));
    }

    #[test]
    fn test_missing_target_leaves_residual() {
        let batch = invoice(dec!(100.03), dec!(100.00));
        let result = reconcile(&batch, &PostingConfig::default(), None).unwrap();
        assert!(result.round_off.is_none());
        assert_eq!(result.residual, dec!(0.03));
    }

    #[test]
    fn test_existing_round_off_line_absorbs_difference() {
        let batch = LedgerBatch::new(vec![
            entry(VoucherType::SalesInvoice, "Debtors").with_debit(dec!(100.05)),
            entry(VoucherType::SalesInvoice, "Sales").with_credit(dec!(100.00)),
            entry(VoucherType::SalesInvoice, "Round Off").with_debit(dec!(0.02)),
        ]);

        let result = reconciled(&batch);

        let round_off = result.round_off.unwrap();
        assert_eq!(result.batch.len(), 3);
        assert_eq!(round_off.company_amount, DebitCredit::credit(dec!(0.05)));
        assert_eq!(round_off.account_amount, DebitCredit::credit(dec!(0.05)));
        assert_eq!(round_off.transaction_amount, DebitCredit::credit(dec!(0.05)));
        assert_eq!(result.residual, Decimal::ZERO);
    }

    #[test]
    fn test_existing_round_off_line_netting_to_zero_is_dropped() {
        let batch = LedgerBatch::new(vec![
            entry(VoucherType::SalesInvoice, "Debtors").with_debit(dec!(100.00)),
            entry(VoucherType::SalesInvoice, "Sales").with_credit(dec!(100.03)),
            entry(VoucherType::SalesInvoice, "Round Off").with_debit(dec!(0.03)),
            entry(VoucherType::SalesInvoice, "Discount").with_debit(dec!(0.03)),
        ]);

        let result = reconciled(&batch);

        assert!(result.round_off.is_none());
        assert_eq!(result.batch.len(), 3);
        assert!(result.batch.entries().iter().all(|e| e.account != "Round Off"));
    }

    #[test]
    fn test_exchange_revaluation_exempt_from_mismatch() {
        let batch = LedgerBatch::new(vec![
            entry(VoucherType::ExchangeRateRevaluation, "Debtors USD").with_debit(dec!(250)),
            entry(VoucherType::ExchangeRateRevaluation, "Unrealized Gain").with_credit(dec!(200)),
        ]);

        let result = reconciled(&batch);
        assert!(result.round_off.is_none());
        assert_eq!(result.residual, dec!(50));
    }
}
