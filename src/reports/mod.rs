//! Reporting aggregators: read-side projections over the ledgers
//!
//! Everything here reads through the storage port and mutates nothing.

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use uuid::Uuid;

use crate::traits::LedgerStorage;
use crate::types::*;

/// Cash activity of one calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyCashflow {
    pub date: NaiveDate,
    pub income: BigDecimal,
    pub expense: BigDecimal,
    pub net: BigDecimal,
}

/// Per-day cashflow over a date range, with range totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashflowReport {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: Vec<DailyCashflow>,
    pub total_income: BigDecimal,
    pub total_expense: BigDecimal,
    pub net: BigDecimal,
}

/// Outstanding totals and status counts for one debt side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtSideSummary {
    pub total_outstanding: BigDecimal,
    pub unpaid_count: usize,
    pub partial_count: usize,
    pub paid_count: usize,
}

impl Default for DebtSideSummary {
    fn default() -> Self {
        Self {
            total_outstanding: BigDecimal::from(0),
            unpaid_count: 0,
            partial_count: 0,
            paid_count: 0,
        }
    }
}

/// Receivable/payable breakdown of all debts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebtSummary {
    pub receivable: DebtSideSummary,
    pub payable: DebtSideSummary,
}

/// One contact's sales history and what they still owe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactStatement {
    pub contact: Contact,
    pub orders: Vec<Order>,
    /// Settlement and payment transactions behind those orders
    pub payments: Vec<Transaction>,
    pub total_invoiced: BigDecimal,
    pub total_outstanding: BigDecimal,
}

/// One SKU's valuation at cost and at market
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockValuationRow {
    pub stock: Stock,
    pub cost_value: BigDecimal,
    pub market_value: BigDecimal,
}

/// Inventory valuation across all SKUs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockValuationReport {
    pub rows: Vec<StockValuationRow>,
    pub total_cost_value: BigDecimal,
    pub total_market_value: BigDecimal,
}

/// Per-day income/expense/net over `[start_date, end_date]`
pub async fn daily_cashflow<S: LedgerStorage>(
    storage: &S,
    owner: Uuid,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> LedgerResult<CashflowReport> {
    let transactions = storage
        .list_transactions(owner, Some(start_date), Some(end_date))
        .await?;

    let mut by_day: BTreeMap<NaiveDate, (BigDecimal, BigDecimal)> = BTreeMap::new();
    for transaction in &transactions {
        let entry = by_day
            .entry(transaction.date)
            .or_insert_with(|| (BigDecimal::from(0), BigDecimal::from(0)));
        match transaction.kind {
            TransactionKind::Income => entry.0 += &transaction.amount,
            TransactionKind::Expense => entry.1 += &transaction.amount,
        }
    }

    let mut total_income = BigDecimal::from(0);
    let mut total_expense = BigDecimal::from(0);
    let days = by_day
        .into_iter()
        .map(|(date, (income, expense))| {
            total_income += &income;
            total_expense += &expense;
            let net = &income - &expense;
            DailyCashflow {
                date,
                income,
                expense,
                net,
            }
        })
        .collect();

    let net = &total_income - &total_expense;
    Ok(CashflowReport {
        start_date,
        end_date,
        days,
        total_income,
        total_expense,
        net,
    })
}

/// Outstanding debt totals and status counts, split by side
pub async fn debt_summary<S: LedgerStorage>(storage: &S, owner: Uuid) -> LedgerResult<DebtSummary> {
    let debts = storage.list_debts(owner).await?;

    let mut receivable = DebtSideSummary::default();
    let mut payable = DebtSideSummary::default();
    for debt in &debts {
        let side = match debt.kind {
            DebtKind::Receivable => &mut receivable,
            DebtKind::Payable => &mut payable,
        };
        side.total_outstanding += &debt.remaining;
        match debt.status {
            PaymentStatus::Unpaid => side.unpaid_count += 1,
            PaymentStatus::Partial => side.partial_count += 1,
            PaymentStatus::Paid => side.paid_count += 1,
        }
    }

    Ok(DebtSummary {
        receivable,
        payable,
    })
}

/// Statement for one customer: orders, the money movements behind them, and
/// what remains outstanding
pub async fn contact_statement<S: LedgerStorage>(
    storage: &S,
    owner: Uuid,
    contact_id: Uuid,
) -> LedgerResult<ContactStatement> {
    let contact = storage
        .get_contact(contact_id)
        .await?
        .ok_or(LedgerError::ContactNotFound(contact_id))?;
    if contact.owner != owner {
        return Err(LedgerError::Unauthorized);
    }

    let mut orders = storage.list_contact_orders(owner, contact_id).await?;
    orders.sort_by_key(|o| o.date);
    let order_ids: HashSet<Uuid> = orders.iter().map(|o| o.id).collect();

    let mut payments: Vec<Transaction> = storage
        .list_transactions(owner, None, None)
        .await?
        .into_iter()
        .filter(|t| t.order_id.is_some_and(|id| order_ids.contains(&id)))
        .collect();
    payments.sort_by_key(|t| t.date);

    let total_invoiced = orders.iter().map(|o| &o.grand_total).sum();
    let total_outstanding = storage
        .list_debts(owner)
        .await?
        .iter()
        .filter(|d| d.contact_id == contact_id)
        .map(|d| &d.remaining)
        .sum();

    Ok(ContactStatement {
        contact,
        orders,
        payments,
        total_invoiced,
        total_outstanding,
    })
}

/// Inventory value at cost basis and at market, per SKU and in total
pub async fn stock_valuation<S: LedgerStorage>(
    storage: &S,
    owner: Uuid,
) -> LedgerResult<StockValuationReport> {
    let mut stocks = storage.list_stocks(owner).await?;
    stocks.sort_by(|a, b| a.name.cmp(&b.name));

    let mut total_cost_value = BigDecimal::from(0);
    let mut total_market_value = BigDecimal::from(0);
    let rows = stocks
        .into_iter()
        .map(|stock| {
            let cost_value = stock.cost_value();
            let market_value = stock.market_value();
            total_cost_value += &cost_value;
            total_market_value += &market_value;
            StockValuationRow {
                stock,
                cost_value,
                market_value,
            }
        })
        .collect();

    Ok(StockValuationReport {
        rows,
        total_cost_value,
        total_market_value,
    })
}
