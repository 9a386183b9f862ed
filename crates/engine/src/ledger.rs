use bridaldesk_core::{FieldValue, PaymentSummary, decode_items, parse_amount};

use crate::draft::DraftState;
use crate::error::EngineError;
use crate::group::{LedgerSpec, REMAINING_FIELD, STATUS_FIELD, TOTAL_PAID_FIELD};

/// Summarize the draft's payment rows against its total due.
pub fn summarize(spec: &LedgerSpec, draft: &DraftState) -> Result<PaymentSummary, EngineError> {
    let total_due = match draft.get(&spec.total_field) {
        Some(value) => parse_amount(&spec.total_field, value)?,
        None => 0,
    };
    let items = match draft.get(&spec.list_field) {
        Some(value) => decode_items(value)?,
        None => Vec::new(),
    };
    Ok(PaymentSummary::from_items(total_due, &items, &spec.amount_field)?)
}

/// Recompute the summary and mirror it into the draft's derived fields.
pub fn refresh(spec: &LedgerSpec, draft: &mut DraftState) -> Result<PaymentSummary, EngineError> {
    let summary = summarize(spec, draft)?;
    draft.set(TOTAL_PAID_FIELD, FieldValue::Integer(summary.total_paid));
    draft.set(REMAINING_FIELD, FieldValue::Integer(summary.remaining));
    draft.set(STATUS_FIELD, FieldValue::text(summary.status.as_str()));
    Ok(summary)
}
