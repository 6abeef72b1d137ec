//! # Memo Numbers
//!
//! A memo number is the human-readable, branch-scoped key of an order, sale,
//! purchase, restock or payroll entry: `MMDD` followed by four characters
//! from `A-Z0-9`, e.g. `0314K2Q9`.
//!
//! Ledger entries reuse the memo of the event that produced them behind a
//! tag (`ORDER-0314K2Q9`) so an update can find and remove them again.

use chrono::{Datelike, NaiveDate};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::MAX_MEMO_LEN;

const ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of the random suffix.
pub const SUFFIX_LEN: usize = 4;

/// Bytes of a v4 UUID holding the version and variant bits.
const FIXED_UUID_BYTES: [usize; 2] = [6, 8];

/// Largest multiple of 36 below 256. Bytes at or above it are skipped so
/// every suffix character is equally likely.
const REJECT_FROM: u8 = 252;

/// Generates a fresh memo number for `date`.
///
/// `MMDD` is the date of the event itself, not the day it was keyed in, so
/// a back-dated entry carries the day it belongs to. Entropy comes from
/// the random bytes of v4 UUIDs; collisions are possible and surface as a
/// duplicate-memo error from the storage layer.
pub fn generate(date: NaiveDate) -> String {
    loop {
        let uuid = Uuid::new_v4();
        let random = uuid
            .as_bytes()
            .iter()
            .enumerate()
            .filter(|(i, _)| !FIXED_UUID_BYTES.contains(i))
            .map(|(_, b)| *b);
        if let Some(memo) = from_entropy(date, random) {
            return memo;
        }
    }
}

/// Deterministic core of [`generate`].
///
/// Returns `None` when `entropy` runs out before the suffix is complete.
///
/// ```rust
/// use branchbook_core::memo::from_entropy;
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
/// assert_eq!(from_entropy(date, [0, 1, 26, 35]).as_deref(), Some("0314AB09"));
/// assert_eq!(from_entropy(date, [0, 1]), None);
/// ```
pub fn from_entropy(date: NaiveDate, entropy: impl IntoIterator<Item = u8>) -> Option<String> {
    let suffix: String = entropy
        .into_iter()
        .filter(|b| *b < REJECT_FROM)
        .take(SUFFIX_LEN)
        .map(|b| ALPHABET[b as usize % ALPHABET.len()] as char)
        .collect();
    (suffix.len() == SUFFIX_LEN).then(|| format!("{:02}{:02}{suffix}", date.month(), date.day()))
}

/// Returns the caller's memo if present, otherwise a generated one.
pub fn resolve(memo_no: Option<&str>, date: NaiveDate) -> Result<String, ValidationError> {
    match memo_no.map(str::trim).filter(|m| !m.is_empty()) {
        Some(memo) => {
            validate(memo)?;
            Ok(memo.to_string())
        }
        None => Ok(generate(date)),
    }
}

/// Checks a caller-supplied memo number.
pub fn validate(memo: &str) -> Result<(), ValidationError> {
    if memo.len() > MAX_MEMO_LEN {
        return Err(ValidationError::TooLong {
            field: "memo_no".to_string(),
            max: MAX_MEMO_LEN,
        });
    }
    if !memo.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(ValidationError::invalid_format(
            "memo_no",
            "must contain only letters, digits and hyphens",
        ));
    }
    Ok(())
}

// =============================================================================
// Ledger Memo Tags
// =============================================================================

/// Which business event a ledger entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerTag {
    Order,
    Sale,
    Purchase,
    Salary,
    Advance,
}

impl LedgerTag {
    pub fn prefix(&self) -> &'static str {
        match self {
            LedgerTag::Order => "ORDER",
            LedgerTag::Sale => "SALE",
            LedgerTag::Purchase => "PURCHASE",
            LedgerTag::Salary => "SALARY",
            LedgerTag::Advance => "ADVANCE",
        }
    }

    /// `ORDER-0314K2Q9` style ledger memo.
    pub fn memo(&self, memo_no: &str) -> String {
        format!("{}-{}", self.prefix(), memo_no)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 3).unwrap()
    }

    #[test]
    fn test_generated_format() {
        let memo = generate(date());
        assert_eq!(memo.len(), 8);
        assert!(memo.starts_with("1103"));
        assert!(memo[4..]
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_high_bytes_skipped() {
        assert_eq!(
            from_entropy(date(), [255, 0, 252, 1, 26, 251]).as_deref(),
            Some("1103AB09")
        );
        assert_eq!(from_entropy(date(), [252, 253, 254, 255, 0]), None);
    }

    #[test]
    fn test_resolve_keeps_explicit_memo() {
        assert_eq!(resolve(Some(" M-100 "), date()).unwrap(), "M-100");
        assert!(resolve(Some("bad memo"), date()).is_err());
    }

    #[test]
    fn test_resolve_generates_when_blank() {
        let memo = resolve(Some("   "), date()).unwrap();
        assert!(memo.starts_with("1103"));
        assert!(resolve(None, date()).unwrap().starts_with("1103"));
    }

    #[test]
    fn test_ledger_tags() {
        assert_eq!(LedgerTag::Order.memo("0314K2Q9"), "ORDER-0314K2Q9");
        assert_eq!(LedgerTag::Purchase.memo("P1"), "PURCHASE-P1");
    }
}
