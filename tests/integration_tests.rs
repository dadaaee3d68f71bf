//! Integration tests for bookkeeping-core

use bigdecimal::BigDecimal;
use bookkeeping_core::{
    Contact, ContactKind, Debt, DebtDraft, DebtKind, Ledger, LedgerError, LedgerStorage,
    LineItemDraft, MemoryStorage, Order, OrderDraft, OrderItem, PaymentDraft, PaymentStatus,
    PurchaseDraft, StockMutationKind, Transaction, TransactionKind,
};
use chrono::NaiveDate;
use uuid::Uuid;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn line(name: &str, qty: i64, price: i64, stock_id: Option<Uuid>) -> LineItemDraft {
    LineItemDraft {
        item_name: name.to_string(),
        qty: BigDecimal::from(qty),
        price: BigDecimal::from(price),
        catalog_item_id: None,
        stock_id,
    }
}

fn order_draft(
    contact_id: Option<Uuid>,
    status: PaymentStatus,
    account_id: Option<Uuid>,
    items: Vec<LineItemDraft>,
) -> OrderDraft {
    OrderDraft {
        contact_id,
        date: date(2024, 6, 1),
        status,
        account_id,
        category_id: None,
        note: None,
        items,
    }
}

fn purchase_draft(
    contact_id: Option<Uuid>,
    status: PaymentStatus,
    account_id: Option<Uuid>,
    items: Vec<LineItemDraft>,
) -> PurchaseDraft {
    PurchaseDraft {
        contact_id,
        order_id: None,
        date: date(2024, 6, 1),
        status,
        account_id,
        category_id: None,
        note: None,
        items,
    }
}

fn payment(amount: i64, account_id: Uuid) -> PaymentDraft {
    PaymentDraft {
        amount: BigDecimal::from(amount),
        account_id,
        category_id: None,
        date: date(2024, 6, 15),
        note: None,
    }
}

#[tokio::test]
async fn paid_order_settles_as_income_transaction() {
    let storage = MemoryStorage::new();
    let mut ledger = Ledger::new(storage.clone());
    let owner = Uuid::new_v4();

    let account = ledger
        .create_account(owner, "Cash".to_string(), BigDecimal::from(0))
        .await
        .unwrap();

    let order = ledger
        .create_order(
            owner,
            order_draft(
                None,
                PaymentStatus::Paid,
                Some(account.id),
                vec![line("Widget", 2, 1000, None)],
            ),
        )
        .await
        .unwrap();
    assert_eq!(order.status, PaymentStatus::Paid);
    assert_eq!(order.grand_total, BigDecimal::from(2000));

    // settlement transaction exists, no debt
    let transactions = storage.list_order_transactions(owner, order.id).await.unwrap();
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0].kind, TransactionKind::Income);
    assert_eq!(transactions[0].amount, BigDecimal::from(2000));
    assert!(storage.find_order_debt(owner, order.id).await.unwrap().is_none());

    let account = ledger.get_account(owner, account.id).await.unwrap();
    assert_eq!(account.balance, BigDecimal::from(2000));
}

#[tokio::test]
async fn unpaid_order_creates_receivable_debt_and_no_transaction() {
    let storage = MemoryStorage::new();
    let mut ledger = Ledger::new(storage.clone());
    let owner = Uuid::new_v4();

    let contact = ledger
        .create_contact(
            owner,
            Contact::new(owner, "Asha".to_string(), ContactKind::Customer),
        )
        .await
        .unwrap();

    let order = ledger
        .create_order(
            owner,
            order_draft(
                Some(contact.id),
                PaymentStatus::Unpaid,
                None,
                vec![line("Widget", 2, 1000, None)],
            ),
        )
        .await
        .unwrap();
    assert_eq!(order.status, PaymentStatus::Unpaid);

    let debt = storage
        .find_order_debt(owner, order.id)
        .await
        .unwrap()
        .expect("unpaid order must carry a debt");
    assert_eq!(debt.kind, DebtKind::Receivable);
    assert_eq!(debt.amount, BigDecimal::from(2000));
    assert_eq!(debt.remaining, BigDecimal::from(2000));
    assert_eq!(debt.status, PaymentStatus::Unpaid);

    assert!(storage
        .list_order_transactions(owner, order.id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn partial_then_full_payment_settles_the_order() {
    let storage = MemoryStorage::new();
    let mut ledger = Ledger::new(storage.clone());
    let owner = Uuid::new_v4();

    let account = ledger
        .create_account(owner, "Cash".to_string(), BigDecimal::from(0))
        .await
        .unwrap();
    let contact = ledger
        .create_contact(
            owner,
            Contact::new(owner, "Asha".to_string(), ContactKind::Customer),
        )
        .await
        .unwrap();
    let order = ledger
        .create_order(
            owner,
            order_draft(
                Some(contact.id),
                PaymentStatus::Unpaid,
                None,
                vec![line("Widget", 2, 1000, None)],
            ),
        )
        .await
        .unwrap();

    // first payment: 1200 of 2000
    let (transaction, debt) = ledger
        .pay_order(owner, order.id, payment(1200, account.id))
        .await
        .unwrap();
    assert_eq!(transaction.kind, TransactionKind::Income);
    assert_eq!(transaction.order_id, Some(order.id));
    assert_eq!(transaction.debt_id, Some(debt.id));
    assert_eq!(debt.remaining, BigDecimal::from(800));
    assert_eq!(debt.status, PaymentStatus::Partial);

    let order_now = ledger.get_order(owner, order.id).await.unwrap();
    assert_eq!(order_now.status, PaymentStatus::Partial);

    // second payment closes it out
    let (_, debt) = ledger
        .pay_order(owner, order.id, payment(800, account.id))
        .await
        .unwrap();
    assert_eq!(debt.remaining, BigDecimal::from(0));
    assert_eq!(debt.status, PaymentStatus::Paid);

    let order_now = ledger.get_order(owner, order.id).await.unwrap();
    assert_eq!(order_now.status, PaymentStatus::Paid);

    // the debt row survives full payment through this path
    let debt_row = ledger.get_debt(owner, debt.id).await.unwrap();
    assert_eq!(debt_row.status, PaymentStatus::Paid);

    let account = ledger.get_account(owner, account.id).await.unwrap();
    assert_eq!(account.balance, BigDecimal::from(2000));
}

#[tokio::test]
async fn overpayment_is_rejected_and_nothing_changes() {
    let storage = MemoryStorage::new();
    let mut ledger = Ledger::new(storage.clone());
    let owner = Uuid::new_v4();

    let account = ledger
        .create_account(owner, "Cash".to_string(), BigDecimal::from(0))
        .await
        .unwrap();
    let contact = ledger
        .create_contact(
            owner,
            Contact::new(owner, "Asha".to_string(), ContactKind::Customer),
        )
        .await
        .unwrap();
    let order = ledger
        .create_order(
            owner,
            order_draft(
                Some(contact.id),
                PaymentStatus::Unpaid,
                None,
                vec![line("Widget", 2, 1000, None)],
            ),
        )
        .await
        .unwrap();

    let result = ledger
        .pay_order(owner, order.id, payment(5000, account.id))
        .await;
    assert!(matches!(result, Err(LedgerError::Validation(_))));

    let debt = storage
        .find_order_debt(owner, order.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(debt.remaining, BigDecimal::from(2000));
    assert_eq!(debt.status, PaymentStatus::Unpaid);

    let account = ledger.get_account(owner, account.id).await.unwrap();
    assert_eq!(account.balance, BigDecimal::from(0));
    assert!(ledger
        .list_transactions(owner, None, None)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn purchase_inflows_blend_and_unblend_the_weighted_average() {
    let mut ledger = Ledger::new(MemoryStorage::new());
    let owner = Uuid::new_v4();

    let account = ledger
        .create_account(owner, "Cash".to_string(), BigDecimal::from(0))
        .await
        .unwrap();
    let stock = ledger
        .create_stock(
            owner,
            "Rice".to_string(),
            "kg".to_string(),
            BigDecimal::from(90),
        )
        .await
        .unwrap();

    ledger
        .create_purchase(
            owner,
            purchase_draft(
                None,
                PaymentStatus::Paid,
                Some(account.id),
                vec![line("Rice", 10, 50, Some(stock.id))],
            ),
        )
        .await
        .unwrap();
    let second = ledger
        .create_purchase(
            owner,
            purchase_draft(
                None,
                PaymentStatus::Paid,
                Some(account.id),
                vec![line("Rice", 10, 70, Some(stock.id))],
            ),
        )
        .await
        .unwrap();

    let stock_now = ledger.get_stock(owner, stock.id).await.unwrap();
    assert_eq!(stock_now.qty, BigDecimal::from(20));
    assert_eq!(stock_now.avg_cost, BigDecimal::from(60));

    // deleting the second purchase restores the first layer exactly
    ledger.delete_purchase(owner, second.id).await.unwrap();
    let stock_now = ledger.get_stock(owner, stock.id).await.unwrap();
    assert_eq!(stock_now.qty, BigDecimal::from(10));
    assert_eq!(stock_now.avg_cost, BigDecimal::from(50));

    // the expense transaction was reversed with it
    let account = ledger.get_account(owner, account.id).await.unwrap();
    assert_eq!(account.balance, BigDecimal::from(-500));
}

#[tokio::test]
async fn order_outflows_decrement_stock_without_a_floor() {
    let mut ledger = Ledger::new(MemoryStorage::new());
    let owner = Uuid::new_v4();

    let account = ledger
        .create_account(owner, "Cash".to_string(), BigDecimal::from(0))
        .await
        .unwrap();
    let stock = ledger
        .create_stock(
            owner,
            "Rice".to_string(),
            "kg".to_string(),
            BigDecimal::from(90),
        )
        .await
        .unwrap();
    ledger
        .adjust_stock_in(owner, stock.id, BigDecimal::from(2), BigDecimal::from(50))
        .await
        .unwrap();

    // selling more than is on hand goes negative rather than erroring
    ledger
        .create_order(
            owner,
            order_draft(
                None,
                PaymentStatus::Paid,
                Some(account.id),
                vec![line("Rice", 5, 90, Some(stock.id))],
            ),
        )
        .await
        .unwrap();

    let stock_now = ledger.get_stock(owner, stock.id).await.unwrap();
    assert_eq!(stock_now.qty, BigDecimal::from(-3));
    assert_eq!(stock_now.avg_cost, BigDecimal::from(50));
}

#[tokio::test]
async fn updating_an_order_to_unpaid_swaps_transaction_for_debt() {
    let storage = MemoryStorage::new();
    let mut ledger = Ledger::new(storage.clone());
    let owner = Uuid::new_v4();

    let account = ledger
        .create_account(owner, "Cash".to_string(), BigDecimal::from(0))
        .await
        .unwrap();
    let contact = ledger
        .create_contact(
            owner,
            Contact::new(owner, "Asha".to_string(), ContactKind::Customer),
        )
        .await
        .unwrap();

    let order = ledger
        .create_order(
            owner,
            order_draft(
                Some(contact.id),
                PaymentStatus::Paid,
                Some(account.id),
                vec![line("Widget", 2, 1000, None)],
            ),
        )
        .await
        .unwrap();

    let updated = ledger
        .update_order(
            owner,
            order.id,
            order_draft(
                Some(contact.id),
                PaymentStatus::Unpaid,
                None,
                vec![line("Widget", 2, 1000, None)],
            ),
        )
        .await
        .unwrap();
    assert_eq!(updated.status, PaymentStatus::Unpaid);

    // settlement transaction gone, its balance effect reversed
    assert!(storage
        .list_order_transactions(owner, order.id)
        .await
        .unwrap()
        .is_empty());
    let account = ledger.get_account(owner, account.id).await.unwrap();
    assert_eq!(account.balance, BigDecimal::from(0));

    let debt = storage
        .find_order_debt(owner, order.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(debt.remaining, BigDecimal::from(2000));
}

#[tokio::test]
async fn reconciling_a_partially_paid_order_preserves_payments() {
    let storage = MemoryStorage::new();
    let mut ledger = Ledger::new(storage.clone());
    let owner = Uuid::new_v4();

    let account = ledger
        .create_account(owner, "Cash".to_string(), BigDecimal::from(0))
        .await
        .unwrap();
    let contact = ledger
        .create_contact(
            owner,
            Contact::new(owner, "Asha".to_string(), ContactKind::Customer),
        )
        .await
        .unwrap();
    let order = ledger
        .create_order(
            owner,
            order_draft(
                Some(contact.id),
                PaymentStatus::Unpaid,
                None,
                vec![line("Widget", 2, 1000, None)],
            ),
        )
        .await
        .unwrap();
    ledger
        .pay_order(owner, order.id, payment(1200, account.id))
        .await
        .unwrap();

    // shrink the order to 1500: 1200 already paid, 300 left
    let updated = ledger
        .update_order(
            owner,
            order.id,
            order_draft(
                Some(contact.id),
                PaymentStatus::Unpaid,
                None,
                vec![line("Widget", 1, 1500, None)],
            ),
        )
        .await
        .unwrap();
    assert_eq!(updated.status, PaymentStatus::Partial);
    let debt = storage
        .find_order_debt(owner, order.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(debt.remaining, BigDecimal::from(300));

    // shrink below what was paid: debt is subsumed and deleted
    let updated = ledger
        .update_order(
            owner,
            order.id,
            order_draft(
                Some(contact.id),
                PaymentStatus::Unpaid,
                None,
                vec![line("Widget", 1, 1000, None)],
            ),
        )
        .await
        .unwrap();
    assert_eq!(updated.status, PaymentStatus::Paid);
    assert!(storage
        .find_order_debt(owner, order.id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn deleting_an_order_reverses_everything_it_touched() {
    let storage = MemoryStorage::new();
    let mut ledger = Ledger::new(storage.clone());
    let owner = Uuid::new_v4();

    let account = ledger
        .create_account(owner, "Cash".to_string(), BigDecimal::from(0))
        .await
        .unwrap();
    let stock = ledger
        .create_stock(
            owner,
            "Rice".to_string(),
            "kg".to_string(),
            BigDecimal::from(90),
        )
        .await
        .unwrap();
    ledger
        .adjust_stock_in(owner, stock.id, BigDecimal::from(10), BigDecimal::from(50))
        .await
        .unwrap();

    let order = ledger
        .create_order(
            owner,
            order_draft(
                None,
                PaymentStatus::Paid,
                Some(account.id),
                vec![line("Rice", 4, 90, Some(stock.id))],
            ),
        )
        .await
        .unwrap();

    ledger.delete_order(owner, order.id).await.unwrap();

    let account = ledger.get_account(owner, account.id).await.unwrap();
    assert_eq!(account.balance, BigDecimal::from(0));
    let stock_now = ledger.get_stock(owner, stock.id).await.unwrap();
    assert_eq!(stock_now.qty, BigDecimal::from(10));
    assert!(ledger
        .list_transactions(owner, None, None)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn invoice_numbers_skip_preexisting_collisions() {
    let mut storage = MemoryStorage::new();
    let mut ledger = Ledger::new(storage.clone());
    let owner = Uuid::new_v4();

    let account = ledger
        .create_account(owner, "Cash".to_string(), BigDecimal::from(0))
        .await
        .unwrap();

    let first = ledger
        .create_order(
            owner,
            order_draft(
                None,
                PaymentStatus::Paid,
                Some(account.id),
                vec![line("Widget", 1, 100, None)],
            ),
        )
        .await
        .unwrap();
    let today = chrono::Utc::now().date_naive();
    assert_eq!(
        first.invoice_number,
        format!("INV/{}/0001", today.format("%Y%m%d"))
    );

    // occupy the number the seed would pick next
    let now = chrono::Utc::now().naive_utc();
    let squatter = Order {
        id: Uuid::new_v4(),
        owner,
        contact_id: None,
        invoice_number: format!("INV/{}/0002", today.format("%Y%m%d")),
        date: today,
        items: vec![OrderItem::new(
            "Widget".to_string(),
            BigDecimal::from(1),
            BigDecimal::from(100),
            None,
            None,
        )],
        grand_total: BigDecimal::from(100),
        status: PaymentStatus::Paid,
        note: None,
        created_at: now,
        updated_at: now,
    };
    storage.save_order(&squatter).await.unwrap();

    let third = ledger
        .create_order(
            owner,
            order_draft(
                None,
                PaymentStatus::Paid,
                Some(account.id),
                vec![line("Widget", 1, 100, None)],
            ),
        )
        .await
        .unwrap();
    assert_eq!(
        third.invoice_number,
        format!("INV/{}/0003", today.format("%Y%m%d"))
    );
}

#[tokio::test]
async fn linked_and_touched_debts_reject_direct_edits() {
    let storage = MemoryStorage::new();
    let mut ledger = Ledger::new(storage.clone());
    let owner = Uuid::new_v4();

    let account = ledger
        .create_account(owner, "Cash".to_string(), BigDecimal::from(0))
        .await
        .unwrap();
    let contact = ledger
        .create_contact(
            owner,
            Contact::new(owner, "Asha".to_string(), ContactKind::Customer),
        )
        .await
        .unwrap();

    // order-linked debt: no direct edit or delete
    let order = ledger
        .create_order(
            owner,
            order_draft(
                Some(contact.id),
                PaymentStatus::Unpaid,
                None,
                vec![line("Widget", 1, 500, None)],
            ),
        )
        .await
        .unwrap();
    let linked = storage
        .find_order_debt(owner, order.id)
        .await
        .unwrap()
        .unwrap();
    let draft = DebtDraft {
        contact_id: contact.id,
        kind: DebtKind::Receivable,
        amount: BigDecimal::from(1),
        due_date: None,
        note: None,
    };
    assert!(matches!(
        ledger.update_debt(owner, linked.id, draft.clone()).await,
        Err(LedgerError::InvalidOperation(_))
    ));
    assert!(matches!(
        ledger.delete_debt(owner, linked.id).await,
        Err(LedgerError::InvalidOperation(_))
    ));

    // manual debt with a payment on it: same refusal
    let manual = ledger
        .create_debt(
            owner,
            DebtDraft {
                contact_id: contact.id,
                kind: DebtKind::Receivable,
                amount: BigDecimal::from(1000),
                due_date: None,
                note: None,
            },
        )
        .await
        .unwrap();
    ledger
        .pay_debt(owner, manual.id, payment(400, account.id))
        .await
        .unwrap();
    assert!(matches!(
        ledger.update_debt(owner, manual.id, draft).await,
        Err(LedgerError::InvalidOperation(_))
    ));
}

#[tokio::test]
async fn workflow_transactions_cannot_be_edited_directly() {
    let storage = MemoryStorage::new();
    let mut ledger = Ledger::new(storage.clone());
    let owner = Uuid::new_v4();

    let account = ledger
        .create_account(owner, "Cash".to_string(), BigDecimal::from(0))
        .await
        .unwrap();
    let order = ledger
        .create_order(
            owner,
            order_draft(
                None,
                PaymentStatus::Paid,
                Some(account.id),
                vec![line("Widget", 1, 500, None)],
            ),
        )
        .await
        .unwrap();

    let settlement = storage
        .list_order_transactions(owner, order.id)
        .await
        .unwrap()
        .remove(0);
    assert!(matches!(
        ledger.update_transaction(owner, settlement.clone()).await,
        Err(LedgerError::InvalidOperation(_))
    ));
    assert!(matches!(
        ledger.delete_transaction(owner, settlement.id).await,
        Err(LedgerError::InvalidOperation(_))
    ));

    // a plain transaction still edits fine
    let plain = ledger
        .record_transaction(Transaction::new(
            owner,
            account.id,
            TransactionKind::Expense,
            BigDecimal::from(50),
            date(2024, 6, 2),
            "Stationery".to_string(),
        ))
        .await
        .unwrap();
    ledger.delete_transaction(owner, plain.id).await.unwrap();
}

#[tokio::test]
async fn direct_stock_sale_records_income_at_selling_price() {
    let mut ledger = Ledger::new(MemoryStorage::new());
    let owner = Uuid::new_v4();

    let account = ledger
        .create_account(owner, "Cash".to_string(), BigDecimal::from(0))
        .await
        .unwrap();
    let stock = ledger
        .create_stock(
            owner,
            "Rice".to_string(),
            "kg".to_string(),
            BigDecimal::from(90),
        )
        .await
        .unwrap();
    ledger
        .adjust_stock_in(owner, stock.id, BigDecimal::from(10), BigDecimal::from(50))
        .await
        .unwrap();

    let stock_now = ledger
        .adjust_stock_out(
            owner,
            stock.id,
            BigDecimal::from(3),
            account.id,
            None,
            date(2024, 6, 3),
        )
        .await
        .unwrap();
    assert_eq!(stock_now.qty, BigDecimal::from(7));

    let account = ledger.get_account(owner, account.id).await.unwrap();
    assert_eq!(account.balance, BigDecimal::from(270));
}

#[tokio::test]
async fn reports_summarize_cashflow_debts_and_valuation() {
    let mut ledger = Ledger::new(MemoryStorage::new());
    let owner = Uuid::new_v4();

    let account = ledger
        .create_account(owner, "Cash".to_string(), BigDecimal::from(0))
        .await
        .unwrap();
    let contact = ledger
        .create_contact(
            owner,
            Contact::new(owner, "Asha".to_string(), ContactKind::Customer),
        )
        .await
        .unwrap();

    ledger
        .record_transaction(Transaction::new(
            owner,
            account.id,
            TransactionKind::Income,
            BigDecimal::from(900),
            date(2024, 6, 1),
            "Sale".to_string(),
        ))
        .await
        .unwrap();
    ledger
        .record_transaction(Transaction::new(
            owner,
            account.id,
            TransactionKind::Expense,
            BigDecimal::from(300),
            date(2024, 6, 2),
            "Rent".to_string(),
        ))
        .await
        .unwrap();

    let cashflow = ledger
        .daily_cashflow(owner, date(2024, 6, 1), date(2024, 6, 30))
        .await
        .unwrap();
    assert_eq!(cashflow.days.len(), 2);
    assert_eq!(cashflow.total_income, BigDecimal::from(900));
    assert_eq!(cashflow.total_expense, BigDecimal::from(300));
    assert_eq!(cashflow.net, BigDecimal::from(600));

    ledger
        .create_debt(
            owner,
            DebtDraft {
                contact_id: contact.id,
                kind: DebtKind::Payable,
                amount: BigDecimal::from(450),
                due_date: None,
                note: None,
            },
        )
        .await
        .unwrap();
    let summary = ledger.debt_summary(owner).await.unwrap();
    assert_eq!(summary.payable.total_outstanding, BigDecimal::from(450));
    assert_eq!(summary.payable.unpaid_count, 1);
    assert_eq!(summary.receivable.unpaid_count, 0);

    let stock = ledger
        .create_stock(
            owner,
            "Rice".to_string(),
            "kg".to_string(),
            BigDecimal::from(90),
        )
        .await
        .unwrap();
    ledger
        .adjust_stock_in(owner, stock.id, BigDecimal::from(10), BigDecimal::from(50))
        .await
        .unwrap();
    let valuation = ledger.stock_valuation(owner).await.unwrap();
    assert_eq!(valuation.total_cost_value, BigDecimal::from(500));
    assert_eq!(valuation.total_market_value, BigDecimal::from(900));
}

#[tokio::test]
async fn contact_statement_ties_orders_payments_and_outstanding() {
    let mut ledger = Ledger::new(MemoryStorage::new());
    let owner = Uuid::new_v4();

    let account = ledger
        .create_account(owner, "Cash".to_string(), BigDecimal::from(0))
        .await
        .unwrap();
    let contact = ledger
        .create_contact(
            owner,
            Contact::new(owner, "Asha".to_string(), ContactKind::Customer),
        )
        .await
        .unwrap();
    let order = ledger
        .create_order(
            owner,
            order_draft(
                Some(contact.id),
                PaymentStatus::Unpaid,
                None,
                vec![line("Widget", 2, 1000, None)],
            ),
        )
        .await
        .unwrap();
    ledger
        .pay_order(owner, order.id, payment(1200, account.id))
        .await
        .unwrap();

    let statement = ledger.contact_statement(owner, contact.id).await.unwrap();
    assert_eq!(statement.orders.len(), 1);
    assert_eq!(statement.payments.len(), 1);
    assert_eq!(statement.total_invoiced, BigDecimal::from(2000));
    assert_eq!(statement.total_outstanding, BigDecimal::from(800));
}

#[tokio::test]
async fn manual_debt_lifecycle() {
    let mut ledger = Ledger::new(MemoryStorage::new());
    let owner = Uuid::new_v4();

    let contact = ledger
        .create_contact(
            owner,
            Contact::new(owner, "Ravi Traders".to_string(), ContactKind::Supplier),
        )
        .await
        .unwrap();

    let debt = ledger
        .create_debt(
            owner,
            DebtDraft {
                contact_id: contact.id,
                kind: DebtKind::Payable,
                amount: BigDecimal::from(700),
                due_date: Some(date(2024, 7, 1)),
                note: Some("Outstanding freight".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(debt.status, PaymentStatus::Unpaid);

    // still unpaid, so a full edit is allowed and remaining resets
    let debt = ledger
        .update_debt(
            owner,
            debt.id,
            DebtDraft {
                contact_id: contact.id,
                kind: DebtKind::Payable,
                amount: BigDecimal::from(900),
                due_date: Some(date(2024, 7, 1)),
                note: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(debt.amount, BigDecimal::from(900));
    assert_eq!(debt.remaining, BigDecimal::from(900));

    ledger.delete_debt(owner, debt.id).await.unwrap();
    assert!(ledger.list_debts(owner).await.unwrap().is_empty());
}

#[tokio::test]
async fn purchase_update_reverts_old_inflows_before_applying_new() {
    let mut ledger = Ledger::new(MemoryStorage::new());
    let owner = Uuid::new_v4();

    let account = ledger
        .create_account(owner, "Cash".to_string(), BigDecimal::from(0))
        .await
        .unwrap();
    let stock = ledger
        .create_stock(
            owner,
            "Rice".to_string(),
            "kg".to_string(),
            BigDecimal::from(90),
        )
        .await
        .unwrap();

    let purchase = ledger
        .create_purchase(
            owner,
            purchase_draft(
                None,
                PaymentStatus::Paid,
                Some(account.id),
                vec![line("Rice", 10, 50, Some(stock.id))],
            ),
        )
        .await
        .unwrap();

    // reprice the same batch: the 50-cost layer must vanish entirely
    ledger
        .update_purchase(
            owner,
            purchase.id,
            purchase_draft(
                None,
                PaymentStatus::Paid,
                Some(account.id),
                vec![line("Rice", 10, 80, Some(stock.id))],
            ),
        )
        .await
        .unwrap();

    let stock_now = ledger.get_stock(owner, stock.id).await.unwrap();
    assert_eq!(stock_now.qty, BigDecimal::from(10));
    assert_eq!(stock_now.avg_cost, BigDecimal::from(80));

    let account = ledger.get_account(owner, account.id).await.unwrap();
    assert_eq!(account.balance, BigDecimal::from(-800));
}

#[tokio::test]
async fn stock_mutation_log_accumulates_across_edits() {
    let mut ledger = Ledger::new(MemoryStorage::new());
    let owner = Uuid::new_v4();

    let account = ledger
        .create_account(owner, "Cash".to_string(), BigDecimal::from(0))
        .await
        .unwrap();
    let stock = ledger
        .create_stock(
            owner,
            "Rice".to_string(),
            "kg".to_string(),
            BigDecimal::from(90),
        )
        .await
        .unwrap();

    let purchase = ledger
        .create_purchase(
            owner,
            purchase_draft(
                None,
                PaymentStatus::Paid,
                Some(account.id),
                vec![line("Rice", 10, 50, Some(stock.id))],
            ),
        )
        .await
        .unwrap();
    ledger
        .update_purchase(
            owner,
            purchase.id,
            purchase_draft(
                None,
                PaymentStatus::Paid,
                Some(account.id),
                vec![line("Rice", 10, 80, Some(stock.id))],
            ),
        )
        .await
        .unwrap();

    // the edit appends a revert row and a fresh inflow row; nothing is
    // rewritten in place
    let mutations = ledger.stock_mutations(owner, stock.id).await.unwrap();
    assert_eq!(mutations.len(), 3);

    assert_eq!(mutations[0].kind, StockMutationKind::Purchase);
    assert_eq!(mutations[0].qty_delta, BigDecimal::from(10));
    assert_eq!(mutations[0].current_qty, BigDecimal::from(10));
    assert_eq!(mutations[0].current_avg_cost, BigDecimal::from(50));

    assert_eq!(mutations[1].qty_delta, BigDecimal::from(-10));
    assert_eq!(mutations[1].current_qty, BigDecimal::from(0));
    assert_eq!(mutations[1].current_avg_cost, BigDecimal::from(0));

    assert_eq!(mutations[2].qty_delta, BigDecimal::from(10));
    assert_eq!(mutations[2].current_qty, BigDecimal::from(10));
    assert_eq!(mutations[2].current_avg_cost, BigDecimal::from(80));
}

#[tokio::test]
async fn owners_cannot_reach_each_others_records() {
    let mut ledger = Ledger::new(MemoryStorage::new());
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    let account = ledger
        .create_account(alice, "Cash".to_string(), BigDecimal::from(0))
        .await
        .unwrap();
    let order = ledger
        .create_order(
            alice,
            order_draft(
                None,
                PaymentStatus::Paid,
                Some(account.id),
                vec![line("Widget", 1, 100, None)],
            ),
        )
        .await
        .unwrap();

    assert!(matches!(
        ledger.get_order(bob, order.id).await,
        Err(LedgerError::Unauthorized)
    ));
    assert!(matches!(
        ledger.delete_order(bob, order.id).await,
        Err(LedgerError::Unauthorized)
    ));
    assert!(ledger.list_orders(bob).await.unwrap().is_empty());
}

#[tokio::test]
async fn unpaid_purchase_creates_payable_debt_payable_via_purchase() {
    let storage = MemoryStorage::new();
    let mut ledger = Ledger::new(storage.clone());
    let owner = Uuid::new_v4();

    let account = ledger
        .create_account(owner, "Cash".to_string(), BigDecimal::from(0))
        .await
        .unwrap();
    let supplier = ledger
        .create_contact(
            owner,
            Contact::new(owner, "Ravi Traders".to_string(), ContactKind::Supplier),
        )
        .await
        .unwrap();

    let purchase = ledger
        .create_purchase(
            owner,
            purchase_draft(
                Some(supplier.id),
                PaymentStatus::Unpaid,
                None,
                vec![line("Rice", 10, 50, None)],
            ),
        )
        .await
        .unwrap();
    let debt: Debt = storage
        .find_purchase_debt(owner, purchase.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(debt.kind, DebtKind::Payable);

    let (transaction, debt) = ledger
        .pay_purchase(owner, purchase.id, payment(500, account.id))
        .await
        .unwrap();
    assert_eq!(transaction.kind, TransactionKind::Expense);
    assert_eq!(debt.status, PaymentStatus::Paid);

    let purchase_now = ledger.get_purchase(owner, purchase.id).await.unwrap();
    assert_eq!(purchase_now.status, PaymentStatus::Paid);

    let account = ledger.get_account(owner, account.id).await.unwrap();
    assert_eq!(account.balance, BigDecimal::from(-500));
}
