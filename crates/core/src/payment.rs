use serde::{Deserialize, Serialize};

use crate::{CoreError, FieldValue, ListItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    Paid,
    Unpaid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Paid => "Paid",
            Self::Unpaid => "Unpaid",
        }
    }
}

/// Totals derived from an invoice's payment rows.
///
/// Always satisfies `total_paid + remaining == total_due`, and
/// `status == Paid` exactly when `remaining <= 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentSummary {
    pub total_due: i64,
    pub total_paid: i64,
    pub remaining: i64,
    pub status: PaymentStatus,
}

impl PaymentSummary {
    pub fn compute(total_due: i64, amounts: impl IntoIterator<Item = i64>) -> Result<Self, CoreError> {
        let mut total_paid = 0i64;
        for amount in amounts {
            total_paid = total_paid
                .checked_add(amount)
                .ok_or_else(|| CoreError::AmountOverflow(format!("{total_paid} + {amount}")))?;
        }
        let remaining = total_due
            .checked_sub(total_paid)
            .ok_or_else(|| CoreError::AmountOverflow(format!("{total_due} - {total_paid}")))?;
        let status = if remaining <= 0 {
            PaymentStatus::Paid
        } else {
            PaymentStatus::Unpaid
        };
        Ok(Self {
            total_due,
            total_paid,
            remaining,
            status,
        })
    }

    /// Summarize payment rows, reading each row's amount from `amount_field`.
    /// Rows without an amount count as zero.
    pub fn from_items(
        total_due: i64,
        items: &[ListItem],
        amount_field: &str,
    ) -> Result<Self, CoreError> {
        let mut amounts = Vec::with_capacity(items.len());
        for item in items {
            let amount = match item.get(amount_field) {
                Some(value) => parse_amount(amount_field, value)?,
                None => 0,
            };
            amounts.push(amount);
        }
        Self::compute(total_due, amounts)
    }
}

/// Read a non-negative money amount in whole rupiah.
///
/// Text may carry an `Rp` prefix and group thousands with one separator,
/// `.` or `,` used consistently: `"5000000"`, `"5.000.000"`,
/// `"Rp 1,250,000"`. Decimal parts, signs and any other characters are
/// rejected. Blank text and `Null` read as zero.
pub fn parse_amount(field: &str, value: &FieldValue) -> Result<i64, CoreError> {
    let invalid = || CoreError::InvalidAmount {
        field: field.to_string(),
        value: format!("{value:?}"),
    };
    match value {
        FieldValue::Null => Ok(0),
        FieldValue::Integer(n) if *n >= 0 => Ok(*n),
        FieldValue::Float(f) if *f >= 0.0 && f.fract() == 0.0 && *f < i64::MAX as f64 => Ok(*f as i64),
        FieldValue::Text(s) if s.trim().is_empty() => Ok(0),
        FieldValue::Text(s) => parse_amount_text(s).ok_or_else(invalid),
        _ => Err(invalid()),
    }
}

fn parse_amount_text(s: &str) -> Option<i64> {
    let mut rest = s.trim();
    if rest.get(..2).is_some_and(|p| p.eq_ignore_ascii_case("rp")) {
        rest = rest[2..].strip_prefix('.').unwrap_or(&rest[2..]).trim_start();
    }

    let all_digits = |g: &str| !g.is_empty() && g.bytes().all(|b| b.is_ascii_digit());
    let digits = match rest.chars().find(|c| !c.is_ascii_digit()) {
        None if all_digits(rest) => rest.to_string(),
        Some(sep @ ('.' | ',')) => {
            let groups: Vec<&str> = rest.split(sep).collect();
            let (head, tail) = groups.split_first()?;
            let grouped = head.len() <= 3
                && all_digits(*head)
                && tail.iter().all(|g| g.len() == 3 && all_digits(*g));
            if !grouped {
                return None;
            }
            groups.concat()
        }
        _ => return None,
    };
    digits.parse().ok()
}
