//! Daily withdrawal limit for savings accounts.
//!
//! The running total resets on the first withdrawal of a new calendar day.
//! The check runs before any balance change, so a rejected withdrawal
//! leaves the account untouched.

use crate::account::Account;
use crate::error::LedgerError;
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Default daily ceiling for savings withdrawals (5000.00)
pub const DEFAULT_DAILY_WITHDRAWAL_LIMIT: Decimal = Decimal::from_parts(500_000, 0, 0, false, 2);

/// Bookkeeping to persist alongside a successful debit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyWithdrawal {
    pub used: Decimal,
    pub date: NaiveDate,
}

/// Computes the new running total for a withdrawal of `amount` on `today`.
///
/// `last_date` earlier than `today` (or absent) means the counter starts over.
pub fn next_daily_total(
    used: Decimal,
    last_date: Option<NaiveDate>,
    today: NaiveDate,
    amount: Decimal,
    limit: Decimal,
) -> Result<DailyWithdrawal, LedgerError> {
    let carried = match last_date {
        Some(date) if date >= today => used,
        _ => Decimal::ZERO,
    };

    let exceeded = LedgerError::WithdrawalLimitExceeded {
        limit,
        used: carried,
        requested: amount,
    };
    match carried.checked_add(amount) {
        Some(total) if total <= limit => Ok(DailyWithdrawal { used: total, date: today }),
        _ => Err(exceeded),
    }
}

/// Applies the limit to `account` if its type has one.
///
/// Returns `None` for account types without a daily limit.
pub fn check_daily_limit(
    account: &Account,
    today: NaiveDate,
    amount: Decimal,
    limit: Decimal,
) -> Result<Option<DailyWithdrawal>, LedgerError> {
    if !account.account_type.has_daily_limit() {
        return Ok(None);
    }
    next_daily_total(
        account.daily_withdrawal_used,
        account.last_withdrawal_date,
        today,
        amount,
        limit,
    )
    .map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::{sample_account, AccountType};
    use rust_decimal_macros::dec;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    #[test]
    fn test_default_limit_value() {
        assert_eq!(DEFAULT_DAILY_WITHDRAWAL_LIMIT, dec!(5000.00));
    }

    #[test]
    fn test_first_withdrawal_starts_counter() {
        let next = next_daily_total(dec!(0), None, day(10), dec!(3000), dec!(5000)).unwrap();
        assert_eq!(next, DailyWithdrawal { used: dec!(3000), date: day(10) });
    }

    #[test]
    fn test_same_day_accumulates_and_rejects_over_limit() {
        let err = next_daily_total(dec!(3000), Some(day(10)), day(10), dec!(3000), dec!(5000))
            .unwrap_err();
        assert_eq!(
            err,
            LedgerError::WithdrawalLimitExceeded {
                limit: dec!(5000),
                used: dec!(3000),
                requested: dec!(3000),
            }
        );

        let next =
            next_daily_total(dec!(3000), Some(day(10)), day(10), dec!(2000), dec!(5000)).unwrap();
        assert_eq!(next.used, dec!(5000));
    }

    #[test]
    fn test_new_day_resets_counter() {
        let next =
            next_daily_total(dec!(4000), Some(day(9)), day(10), dec!(4000), dec!(5000)).unwrap();
        assert_eq!(next, DailyWithdrawal { used: dec!(4000), date: day(10) });
    }

    #[test]
    fn test_single_withdrawal_above_limit_rejected() {
        assert!(next_daily_total(dec!(0), None, day(10), dec!(5000.01), dec!(5000)).is_err());
    }

    #[test]
    fn test_overflowing_total_is_over_limit() {
        let err = next_daily_total(Decimal::MAX, Some(day(10)), day(10), dec!(1), Decimal::MAX)
            .unwrap_err();
        assert_eq!(err.code(), "withdrawal_limit_exceeded");
    }

    #[test]
    fn test_checking_accounts_have_no_limit() {
        let account = sample_account(AccountType::Checking, dec!(100000));
        let result = check_daily_limit(&account, day(10), dec!(90000), dec!(5000)).unwrap();
        assert_eq!(result, None);
    }

    #[test]
    fn test_savings_account_checked() {
        let mut account = sample_account(AccountType::Savings, dec!(100000));
        account.daily_withdrawal_used = dec!(4999);
        account.last_withdrawal_date = Some(day(10));

        assert!(check_daily_limit(&account, day(10), dec!(2), dec!(5000)).is_err());
        let ok = check_daily_limit(&account, day(10), dec!(1), dec!(5000)).unwrap();
        assert_eq!(ok.map(|w| w.used), Some(dec!(5000)));
    }
}
