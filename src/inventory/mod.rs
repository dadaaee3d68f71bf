//! Stock valuation engine: weighted-average costing with an append-only
//! mutation log
//!
//! Quantity and average cost move only through the operations here. Every
//! change appends one [`StockMutation`] row carrying post-mutation snapshots;
//! the log is never rewritten when the triggering operation is edited; new
//! rows accumulate instead.

use bigdecimal::BigDecimal;
use tracing::debug;
use uuid::Uuid;

use crate::traits::LedgerStorage;
use crate::types::*;
use crate::utils::validation::{validate_name, validate_non_negative_amount};

/// Weighted-average cost after an inflow of `qty_in` units at `price`
///
/// Returns the new (qty, avg_cost) pair. When the resulting quantity is zero
/// the average collapses to zero rather than dividing by it.
pub fn blend_inflow(
    qty: &BigDecimal,
    avg_cost: &BigDecimal,
    qty_in: &BigDecimal,
    price: &BigDecimal,
) -> (BigDecimal, BigDecimal) {
    let new_qty = qty + qty_in;
    let new_avg = if new_qty == BigDecimal::from(0) {
        BigDecimal::from(0)
    } else {
        (qty * avg_cost + qty_in * price) / &new_qty
    };
    (new_qty, new_avg)
}

/// Inverse of [`blend_inflow`] against the *current* stock state
///
/// Exact only when nothing else moved the stock between apply and revert;
/// edits therefore revert all old items before applying any new ones.
pub fn unblend_inflow(
    qty: &BigDecimal,
    avg_cost: &BigDecimal,
    qty_in: &BigDecimal,
    price: &BigDecimal,
) -> (BigDecimal, BigDecimal) {
    let removed_value = qty_in * price;
    let current_total_value = qty * avg_cost;
    let new_qty = qty - qty_in;
    let new_avg = if new_qty > BigDecimal::from(0) {
        (current_total_value - removed_value) / &new_qty
    } else {
        BigDecimal::from(0)
    };
    (new_qty, new_avg)
}

/// Manager for stock items and their valuation
pub struct StockManager<S: LedgerStorage> {
    storage: S,
}

impl<S: LedgerStorage> StockManager<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub async fn create(
        &mut self,
        owner: Uuid,
        name: String,
        unit: String,
        selling_price: BigDecimal,
    ) -> LedgerResult<Stock> {
        validate_name(&name, "Stock name")?;
        validate_non_negative_amount(&selling_price, "Selling price")?;
        let stock = Stock::new(owner, name, unit, selling_price);
        self.storage.save_stock(&stock).await?;
        Ok(stock)
    }

    /// Fetch a stock item, enforcing ownership
    pub async fn get_required(&self, owner: Uuid, id: Uuid) -> LedgerResult<Stock> {
        let stock = self
            .storage
            .get_stock(id)
            .await?
            .ok_or(LedgerError::StockNotFound(id))?;
        if stock.owner != owner {
            return Err(LedgerError::Unauthorized);
        }
        Ok(stock)
    }

    pub async fn list(&self, owner: Uuid) -> LedgerResult<Vec<Stock>> {
        self.storage.list_stocks(owner).await
    }

    /// User-facing edit: name, unit, and selling price only
    ///
    /// Quantity and average cost are off-limits here; they move exclusively
    /// through purchases, orders, and manual adjustments.
    pub async fn edit(
        &mut self,
        owner: Uuid,
        id: Uuid,
        name: String,
        unit: String,
        selling_price: BigDecimal,
    ) -> LedgerResult<Stock> {
        validate_name(&name, "Stock name")?;
        validate_non_negative_amount(&selling_price, "Selling price")?;
        let mut stock = self.get_required(owner, id).await?;
        stock.name = name;
        stock.unit = unit;
        stock.selling_price = selling_price;
        stock.updated_at = chrono::Utc::now().naive_utc();
        self.storage.update_stock(&stock).await?;
        Ok(stock)
    }

    pub async fn delete(&mut self, owner: Uuid, id: Uuid) -> LedgerResult<()> {
        self.get_required(owner, id).await?;
        self.storage.delete_stock(id).await
    }

    pub async fn mutations(&self, owner: Uuid, stock_id: Uuid) -> LedgerResult<Vec<StockMutation>> {
        self.get_required(owner, stock_id).await?;
        self.storage.list_stock_mutations(owner, stock_id).await
    }

    /// Blend an inflow into the weighted average
    pub async fn apply_inflow(
        &mut self,
        owner: Uuid,
        stock_id: Uuid,
        qty: &BigDecimal,
        price: &BigDecimal,
        kind: StockMutationKind,
    ) -> LedgerResult<Stock> {
        let mut stock = self.get_required(owner, stock_id).await?;
        let (new_qty, new_avg) = blend_inflow(&stock.qty, &stock.avg_cost, qty, price);
        stock.qty = new_qty;
        stock.avg_cost = new_avg;
        stock.updated_at = chrono::Utc::now().naive_utc();
        self.storage.update_stock(&stock).await?;
        self.log_mutation(&stock, kind, qty.clone()).await?;
        debug!(stock = %stock_id, qty = %qty, price = %price, "applied stock inflow");
        Ok(stock)
    }

    /// Remove a previously applied inflow from the weighted average
    pub async fn revert_inflow(
        &mut self,
        owner: Uuid,
        stock_id: Uuid,
        qty: &BigDecimal,
        price: &BigDecimal,
        kind: StockMutationKind,
    ) -> LedgerResult<Stock> {
        let mut stock = self.get_required(owner, stock_id).await?;
        let (new_qty, new_avg) = unblend_inflow(&stock.qty, &stock.avg_cost, qty, price);
        stock.qty = new_qty;
        stock.avg_cost = new_avg;
        stock.updated_at = chrono::Utc::now().naive_utc();
        self.storage.update_stock(&stock).await?;
        self.log_mutation(&stock, kind, -qty.clone()).await?;
        debug!(stock = %stock_id, qty = %qty, "reverted stock inflow");
        Ok(stock)
    }

    /// Decrement quantity without touching the average cost
    ///
    /// No floor: quantity may go negative, matching the observed behavior of
    /// manual OUT adjustments and order-driven decrements.
    pub async fn apply_outflow(
        &mut self,
        owner: Uuid,
        stock_id: Uuid,
        qty: &BigDecimal,
    ) -> LedgerResult<Stock> {
        let mut stock = self.get_required(owner, stock_id).await?;
        stock.qty = &stock.qty - qty;
        stock.updated_at = chrono::Utc::now().naive_utc();
        self.storage.update_stock(&stock).await?;
        self.log_mutation(&stock, StockMutationKind::Out, -qty.clone())
            .await?;
        Ok(stock)
    }

    /// Add a previously removed quantity back, average cost untouched
    pub async fn revert_outflow(
        &mut self,
        owner: Uuid,
        stock_id: Uuid,
        qty: &BigDecimal,
    ) -> LedgerResult<Stock> {
        let mut stock = self.get_required(owner, stock_id).await?;
        stock.qty = &stock.qty + qty;
        stock.updated_at = chrono::Utc::now().naive_utc();
        self.storage.update_stock(&stock).await?;
        self.log_mutation(&stock, StockMutationKind::Out, qty.clone())
            .await?;
        Ok(stock)
    }

    async fn log_mutation(
        &mut self,
        stock: &Stock,
        kind: StockMutationKind,
        qty_delta: BigDecimal,
    ) -> LedgerResult<()> {
        let mutation = StockMutation {
            id: Uuid::new_v4(),
            owner: stock.owner,
            stock_id: stock.id,
            kind,
            qty_delta,
            current_qty: stock.qty.clone(),
            current_avg_cost: stock.avg_cost.clone(),
            created_at: chrono::Utc::now().naive_utc(),
        };
        self.storage.append_stock_mutation(&mutation).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(n: i64) -> BigDecimal {
        BigDecimal::from(n)
    }

    #[test]
    fn inflow_into_empty_stock_takes_the_inflow_price() {
        let (qty, avg) = blend_inflow(&dec(0), &dec(0), &dec(10), &dec(100));
        assert_eq!(qty, dec(10));
        assert_eq!(avg, dec(100));
    }

    #[test]
    fn inflow_blends_weighted_average() {
        // 10 @ 50 then 10 @ 70 -> 20 @ 60
        let (qty, avg) = blend_inflow(&dec(10), &dec(50), &dec(10), &dec(70));
        assert_eq!(qty, dec(20));
        assert_eq!(avg, dec(60));
    }

    #[test]
    fn revert_is_exact_inverse_of_apply() {
        let (qty, avg) = blend_inflow(&dec(0), &dec(0), &dec(10), &dec(100));
        let (qty, avg) = unblend_inflow(&qty, &avg, &dec(10), &dec(100));
        assert_eq!(qty, dec(0));
        assert_eq!(avg, dec(0));
    }

    #[test]
    fn revert_second_layer_restores_first() {
        let (qty, avg) = blend_inflow(&dec(10), &dec(50), &dec(10), &dec(70));
        let (qty, avg) = unblend_inflow(&qty, &avg, &dec(10), &dec(70));
        assert_eq!(qty, dec(10));
        assert_eq!(avg, dec(50));
    }

    #[test]
    fn inflow_to_zero_quantity_zeroes_average() {
        let (qty, avg) = blend_inflow(&dec(-5), &dec(0), &dec(5), &dec(40));
        assert_eq!(qty, dec(0));
        assert_eq!(avg, dec(0));
    }
}
