//! Sales and procurement workflows
//!
//! Orders and purchases are structurally identical aggregates: a header with
//! frozen line items whose save produces either a settlement transaction
//! (paid) or a debt (unpaid), kept mutually exclusive across edits and
//! deletes. Purchases additionally feed the stock valuation engine; orders
//! decrement stock for stock-linked lines.

pub mod order;
pub mod purchase;

pub use order::OrderManager;
pub use purchase::PurchaseManager;

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::types::{LedgerError, LedgerResult, PaymentStatus};
use crate::utils::validation::{validate_non_negative_amount, validate_positive_amount};

/// One submitted line of an order/purchase before it is frozen
#[derive(Debug, Clone)]
pub struct LineItemDraft {
    pub item_name: String,
    pub qty: BigDecimal,
    pub price: BigDecimal,
    /// Catalog entry the line was defaulted from, if any
    pub catalog_item_id: Option<Uuid>,
    /// Stock SKU this line moves, if any
    pub stock_id: Option<Uuid>,
}

/// Input for creating or replacing an order
#[derive(Debug, Clone)]
pub struct OrderDraft {
    /// Required when saving unpaid (the debt needs a counterparty)
    pub contact_id: Option<Uuid>,
    pub date: NaiveDate,
    /// User-chosen settlement at save time: `Paid` or `Unpaid` only
    pub status: PaymentStatus,
    /// Required when saving paid (the settlement transaction needs a home)
    pub account_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub note: Option<String>,
    pub items: Vec<LineItemDraft>,
}

/// Input for creating or replacing a purchase
#[derive(Debug, Clone)]
pub struct PurchaseDraft {
    pub contact_id: Option<Uuid>,
    /// Originating sales order, for cost-of-goods reporting
    pub order_id: Option<Uuid>,
    pub date: NaiveDate,
    pub status: PaymentStatus,
    pub account_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub note: Option<String>,
    pub items: Vec<LineItemDraft>,
}

/// Validate submitted line items and compute the grand total
pub(crate) fn validate_line_items(items: &[LineItemDraft]) -> LedgerResult<BigDecimal> {
    if items.is_empty() {
        return Err(LedgerError::Validation(
            "At least one line item is required".to_string(),
        ));
    }
    let mut grand_total = BigDecimal::from(0);
    for item in items {
        validate_positive_amount(&item.qty, "Line item quantity")?;
        validate_non_negative_amount(&item.price, "Line item price")?;
        grand_total += &item.qty * &item.price;
    }
    Ok(grand_total)
}

/// The user may only choose paid or unpaid at save time; partial is reachable
/// exclusively through the payment operation
pub(crate) fn validate_input_status(status: PaymentStatus) -> LedgerResult<()> {
    if status == PaymentStatus::Partial {
        return Err(LedgerError::Validation(
            "Save with status paid or unpaid; partial is set by payments".to_string(),
        ));
    }
    Ok(())
}

/// Format one candidate reference number: `PREFIX/YYYYMMDD/NNNN`
pub(crate) fn format_reference(prefix: &str, date: NaiveDate, seq: u64) -> String {
    format!("{}/{}/{:04}", prefix, date.format("%Y%m%d"), seq)
}

/// Summarize line items for a generated transaction description
pub(crate) fn summarize_items(items: &[LineItemDraft]) -> String {
    items
        .iter()
        .map(|item| format!("{} x{}", item.item_name, item.qty))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_number_is_zero_padded() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(format_reference("INV", date, 1), "INV/20240307/0001");
        assert_eq!(format_reference("PUR", date, 123), "PUR/20240307/0123");
        assert_eq!(format_reference("INV", date, 10000), "INV/20240307/10000");
    }

    #[test]
    fn line_items_must_not_be_empty() {
        assert!(validate_line_items(&[]).is_err());
    }

    #[test]
    fn grand_total_sums_qty_times_price() {
        let items = vec![
            LineItemDraft {
                item_name: "Widget".to_string(),
                qty: BigDecimal::from(2),
                price: BigDecimal::from(1000),
                catalog_item_id: None,
                stock_id: None,
            },
            LineItemDraft {
                item_name: "Gadget".to_string(),
                qty: BigDecimal::from(3),
                price: BigDecimal::from(500),
                catalog_item_id: None,
                stock_id: None,
            },
        ];
        assert_eq!(validate_line_items(&items).unwrap(), BigDecimal::from(3500));
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let items = vec![LineItemDraft {
            item_name: "Widget".to_string(),
            qty: BigDecimal::from(0),
            price: BigDecimal::from(10),
            catalog_item_id: None,
            stock_id: None,
        }];
        assert!(validate_line_items(&items).is_err());
    }
}
