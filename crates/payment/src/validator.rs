//! Structural validation for payment instruments and amounts.
//!
//! Every check here is local and pure. A request that fails validation
//! never reaches the remote processor.

use chrono::{NaiveDate, Utc};
use common::{Money, email};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{ValidationError, ValidationResult};
use crate::method::PaymentMethod;

/// Largest amount a single checkout may charge: 1,000,000.00.
pub const MAX_AMOUNT: Money = Money::from_cents(100_000_000);

static CARD_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{13,19}$").expect("card number pattern is valid"));

static CVV_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{3,4}$").expect("cvv pattern is valid"));

static EXPIRY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(0[1-9]|1[0-2])/[0-9]{2}$").expect("expiry pattern is valid"));

static HOLDER_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z\s.'\-]+$").expect("holder name pattern is valid"));

static ACCOUNT_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{8,20}$").expect("account number pattern is valid"));

/// Validates an instrument together with the amount to charge.
pub fn validate(method: &PaymentMethod, amount: Money) -> ValidationResult {
    validate_amount(amount)?;
    validate_method(method)
}

/// Validates the amount alone: strictly positive and within the limit.
///
/// Amounts are whole cents by construction, so decimal precision is
/// enforced where a [`Money`] is parsed, not here.
pub fn validate_amount(amount: Money) -> ValidationResult {
    if !amount.is_positive() {
        return Err(ValidationError::AmountNotPositive);
    }
    if amount > MAX_AMOUNT {
        return Err(ValidationError::AmountTooLarge);
    }
    Ok(())
}

/// Validates the instrument alone, independent of any amount.
pub fn validate_method(method: &PaymentMethod) -> ValidationResult {
    match method {
        PaymentMethod::CreditCard {
            number,
            holder_name,
            expiry,
            cvv,
        } => validate_card(number, holder_name, expiry, cvv),
        PaymentMethod::BankAccount {
            account_number,
            bank_name,
        } => validate_bank_account(account_number, bank_name),
        PaymentMethod::Wallet { email } => validate_wallet(email),
    }
}

fn validate_card(number: &str, holder_name: &str, expiry: &str, cvv: &str) -> ValidationResult {
    let digits: String = number.chars().filter(|c| !c.is_whitespace()).collect();
    if !CARD_NUMBER_RE.is_match(&digits) {
        return Err(ValidationError::CardNumberMalformed);
    }
    if !luhn(&digits) {
        return Err(ValidationError::CardNumberChecksum);
    }
    if !EXPIRY_RE.is_match(expiry) {
        return Err(ValidationError::CardExpiryMalformed);
    }
    if !expiry_covers(expiry, Utc::now().date_naive()) {
        return Err(ValidationError::CardExpired);
    }
    if !CVV_RE.is_match(cvv) {
        return Err(ValidationError::CardCvvMalformed);
    }
    let trimmed = holder_name.trim();
    if trimmed.chars().count() < 2 || !HOLDER_NAME_RE.is_match(trimmed) {
        return Err(ValidationError::CardHolderMalformed);
    }
    Ok(())
}

fn validate_bank_account(account_number: &str, bank_name: &str) -> ValidationResult {
    if !ACCOUNT_NUMBER_RE.is_match(account_number) {
        return Err(ValidationError::AccountNumberMalformed);
    }
    let len = bank_name.trim().chars().count();
    if !(2..=100).contains(&len) {
        return Err(ValidationError::BankNameMalformed);
    }
    Ok(())
}

fn validate_wallet(address: &str) -> ValidationResult {
    if !email::is_valid(address) {
        return Err(ValidationError::WalletEmailMalformed);
    }
    Ok(())
}

/// Luhn checksum over a digit string.
fn luhn(digits: &str) -> bool {
    let mut sum = 0u32;
    let mut double = false;
    for ch in digits.chars().rev() {
        let Some(digit) = ch.to_digit(10) else {
            return false;
        };
        let value = if double {
            let doubled = digit * 2;
            if doubled > 9 { doubled - 9 } else { doubled }
        } else {
            digit
        };
        sum += value;
        double = !double;
    }
    sum % 10 == 0
}

/// Returns true if an `MM/YY` expiry is the current month or later.
///
/// A card expiring this month stays valid through the last day of the
/// month, so the cutoff is the first day of the following month.
fn expiry_covers(expiry: &str, today: NaiveDate) -> bool {
    let Some((month_str, year_str)) = expiry.split_once('/') else {
        return false;
    };
    let Ok(month) = month_str.parse::<u32>() else {
        return false;
    };
    let Ok(year_offset) = year_str.parse::<i32>() else {
        return false;
    };
    let year = 2000 + year_offset;
    let rollover = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    match rollover {
        Some(first_of_next) => first_of_next > today,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Datelike;

    use super::*;

    fn card(number: &str, expiry: &str) -> PaymentMethod {
        PaymentMethod::CreditCard {
            number: number.to_string(),
            holder_name: "Grace Hopper".to_string(),
            expiry: expiry.to_string(),
            cvv: "123".to_string(),
        }
    }

    fn future_expiry() -> String {
        let next_year = Utc::now().year() + 1;
        format!("06/{:02}", next_year % 100)
    }

    #[test]
    fn test_valid_card_passes() {
        let method = card("4111111111111111", &future_expiry());
        assert!(validate(&method, Money::from_cents(5000)).is_ok());
    }

    #[test]
    fn test_card_number_with_spaces_passes() {
        let method = card("4111 1111 1111 1111", &future_expiry());
        assert!(validate_method(&method).is_ok());
    }

    #[test]
    fn test_luhn_known_vectors() {
        assert!(luhn("4111111111111111"));
        assert!(luhn("4571736012345674"));
        assert!(luhn("79927398713"));
    }

    #[test]
    fn test_luhn_rejects_decremented_check_digit() {
        assert!(luhn("4571736012345674"));
        assert!(!luhn("4571736012345673"));
    }

    #[test]
    fn test_card_number_too_short() {
        let method = card("411111111111", &future_expiry());
        assert_eq!(
            validate_method(&method),
            Err(ValidationError::CardNumberMalformed)
        );
    }

    #[test]
    fn test_card_number_bad_checksum() {
        let method = card("4111111111111112", &future_expiry());
        assert_eq!(
            validate_method(&method),
            Err(ValidationError::CardNumberChecksum)
        );
    }

    #[test]
    fn test_expiry_malformed() {
        let method = card("4111111111111111", "13/30");
        assert_eq!(
            validate_method(&method),
            Err(ValidationError::CardExpiryMalformed)
        );

        // Single-digit month must be zero-padded.
        let method = card("4111111111111111", "1/25");
        assert_eq!(
            validate_method(&method),
            Err(ValidationError::CardExpiryMalformed)
        );
    }

    #[test]
    fn test_expiry_in_the_past() {
        let method = card("4111111111111111", "12/20");
        assert_eq!(validate_method(&method), Err(ValidationError::CardExpired));
    }

    #[test]
    fn test_card_expiring_this_month_is_valid() {
        let today = Utc::now().date_naive();
        let this_month = format!("{:02}/{:02}", today.month(), today.year() % 100);
        let method = card("4111111111111111", &this_month);
        assert!(validate_method(&method).is_ok());
    }

    #[test]
    fn test_expiry_covers_month_boundaries() {
        let march_15 = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();
        assert!(expiry_covers("03/26", march_15));
        assert!(!expiry_covers("02/26", march_15));
        assert!(expiry_covers("12/26", march_15));

        let december_31 = NaiveDate::from_ymd_opt(2026, 12, 31).unwrap();
        assert!(expiry_covers("12/26", december_31));
        assert!(!expiry_covers("11/26", december_31));
    }

    #[test]
    fn test_cvv_lengths() {
        let mut method = card("4111111111111111", &future_expiry());
        if let PaymentMethod::CreditCard { cvv, .. } = &mut method {
            *cvv = "12".to_string();
        }
        assert_eq!(
            validate_method(&method),
            Err(ValidationError::CardCvvMalformed)
        );

        if let PaymentMethod::CreditCard { cvv, .. } = &mut method {
            *cvv = "1234".to_string();
        }
        assert!(validate_method(&method).is_ok());
    }

    #[test]
    fn test_holder_name_rules() {
        let mut method = card("4111111111111111", &future_expiry());
        if let PaymentMethod::CreditCard { holder_name, .. } = &mut method {
            *holder_name = "X".to_string();
        }
        assert_eq!(
            validate_method(&method),
            Err(ValidationError::CardHolderMalformed)
        );

        if let PaymentMethod::CreditCard { holder_name, .. } = &mut method {
            *holder_name = "Anne-Marie O'Neill Jr.".to_string();
        }
        assert!(validate_method(&method).is_ok());

        if let PaymentMethod::CreditCard { holder_name, .. } = &mut method {
            *holder_name = "R2-D2 4ever".to_string();
        }
        assert_eq!(
            validate_method(&method),
            Err(ValidationError::CardHolderMalformed)
        );
    }

    #[test]
    fn test_bank_account_rules() {
        let method = PaymentMethod::BankAccount {
            account_number: "12345678".to_string(),
            bank_name: "First National".to_string(),
        };
        assert!(validate_method(&method).is_ok());

        let short = PaymentMethod::BankAccount {
            account_number: "1234567".to_string(),
            bank_name: "First National".to_string(),
        };
        assert_eq!(
            validate_method(&short),
            Err(ValidationError::AccountNumberMalformed)
        );

        let blank_bank = PaymentMethod::BankAccount {
            account_number: "12345678".to_string(),
            bank_name: " ".to_string(),
        };
        assert_eq!(
            validate_method(&blank_bank),
            Err(ValidationError::BankNameMalformed)
        );
    }

    #[test]
    fn test_wallet_email_rules() {
        let method = PaymentMethod::Wallet {
            email: "buyer@example.com".to_string(),
        };
        assert!(validate_method(&method).is_ok());

        let bad = PaymentMethod::Wallet {
            email: "buyer@@example.com".to_string(),
        };
        assert_eq!(
            validate_method(&bad),
            Err(ValidationError::WalletEmailMalformed)
        );
    }

    #[test]
    fn test_amount_bounds() {
        assert_eq!(
            validate_amount(Money::zero()),
            Err(ValidationError::AmountNotPositive)
        );
        assert_eq!(
            validate_amount(Money::from_cents(-100)),
            Err(ValidationError::AmountNotPositive)
        );
        assert!(validate_amount(Money::from_cents(1)).is_ok());
        assert!(validate_amount(MAX_AMOUNT).is_ok());
        assert_eq!(
            validate_amount(MAX_AMOUNT + Money::from_cents(1)),
            Err(ValidationError::AmountTooLarge)
        );
    }

    #[test]
    fn test_amount_checked_before_method() {
        let method = card("not-a-number", &future_expiry());
        assert_eq!(
            validate(&method, Money::zero()),
            Err(ValidationError::AmountNotPositive)
        );
    }
}
