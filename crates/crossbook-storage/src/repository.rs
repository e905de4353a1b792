//! The concurrency-safe order repository.
//!
//! Orders are keyed by `(side, id)`: ids are unique within a side, not
//! across the book. Records are inserted by the state machine and never
//! deleted; all matched-amount mutation goes through [`apply_fill`]
//! so every mutation point is auditable.
//!
//! [`apply_fill`]: OrderRepository::apply_fill

use std::collections::BTreeMap;
use std::sync::RwLock;

use alloy_primitives::U256;
use crossbook_types::{CrossbookError, Order, OrderStatus, Result, Side};

/// Capability interface over the order store.
///
/// One in-memory implementation exists today; a persistent one must be able
/// to slot in without changing callers, so everything is `&self` and the
/// trait owns no iteration details.
pub trait OrderRepository: Send + Sync {
    /// Insert a new order.
    ///
    /// # Errors
    /// `DuplicateOrder` if an order with this id already exists on this side.
    fn create(&self, order: Order) -> Result<Order>;

    /// Every order on both sides, buys first, each side in id order.
    ///
    /// # Errors
    /// `NoOrdersFound` when the store is empty.
    fn find_all(&self) -> Result<Vec<Order>>;

    /// Every order on one side, in id order.
    ///
    /// # Errors
    /// `NoOrdersFound` when that side is empty.
    fn find_by_side(&self, side: Side) -> Result<Vec<Order>>;

    /// One order by side and id.
    ///
    /// # Errors
    /// `OrderNotFound` if absent.
    fn find_by_id(&self, side: Side, id: u64) -> Result<Order>;

    /// Every order on one side with the given status, in id order.
    ///
    /// # Errors
    /// `NoOrdersFound` when nothing matches.
    fn find_by_side_and_status(&self, side: Side, status: OrderStatus) -> Result<Vec<Order>>;

    /// Commit a matched-amount delta to one order. Flips the order to
    /// `Closed` when it becomes fully matched; returns the updated record.
    ///
    /// # Errors
    /// `OrderNotFound` if absent; `FillOverflow` if the delta would push
    /// `matched_amount` past `amount`.
    fn apply_fill(&self, side: Side, id: u64, quantity: U256) -> Result<Order>;
}

#[derive(Debug, Default)]
struct SideStores {
    buys: BTreeMap<u64, Order>,
    sells: BTreeMap<u64, Order>,
}

impl SideStores {
    fn side(&self, side: Side) -> &BTreeMap<u64, Order> {
        match side {
            Side::Buy => &self.buys,
            Side::Sell => &self.sells,
        }
    }

    fn side_mut(&mut self, side: Side) -> &mut BTreeMap<u64, Order> {
        match side {
            Side::Buy => &mut self.buys,
            Side::Sell => &mut self.sells,
        }
    }
}

/// In-memory repository: both side stores behind a single readers-writer
/// lock. `BTreeMap` keeps iteration in id order, so every snapshot — and
/// everything derived from one — is deterministic.
#[derive(Debug, Default)]
pub struct InMemoryOrderRepository {
    inner: RwLock<SideStores>,
}

impl InMemoryOrderRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, SideStores>> {
        self.inner
            .read()
            .map_err(|_| CrossbookError::InvariantViolation {
                reason: "order store lock poisoned".into(),
            })
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, SideStores>> {
        self.inner
            .write()
            .map_err(|_| CrossbookError::InvariantViolation {
                reason: "order store lock poisoned".into(),
            })
    }
}

impl OrderRepository for InMemoryOrderRepository {
    fn create(&self, order: Order) -> Result<Order> {
        let mut stores = self.write()?;
        let store = stores.side_mut(order.side);
        if store.contains_key(&order.id) {
            return Err(CrossbookError::DuplicateOrder {
                side: order.side,
                id: order.id,
            });
        }
        store.insert(order.id, order.clone());
        tracing::debug!(side = %order.side, id = order.id, "order created");
        Ok(order)
    }

    fn find_all(&self) -> Result<Vec<Order>> {
        let stores = self.read()?;
        let orders: Vec<Order> = stores
            .buys
            .values()
            .chain(stores.sells.values())
            .cloned()
            .collect();
        if orders.is_empty() {
            return Err(CrossbookError::NoOrdersFound);
        }
        Ok(orders)
    }

    fn find_by_side(&self, side: Side) -> Result<Vec<Order>> {
        let stores = self.read()?;
        let orders: Vec<Order> = stores.side(side).values().cloned().collect();
        if orders.is_empty() {
            return Err(CrossbookError::NoOrdersFound);
        }
        Ok(orders)
    }

    fn find_by_id(&self, side: Side, id: u64) -> Result<Order> {
        let stores = self.read()?;
        stores
            .side(side)
            .get(&id)
            .cloned()
            .ok_or(CrossbookError::OrderNotFound { side, id })
    }

    fn find_by_side_and_status(&self, side: Side, status: OrderStatus) -> Result<Vec<Order>> {
        let stores = self.read()?;
        let orders: Vec<Order> = stores
            .side(side)
            .values()
            .filter(|o| o.status == status)
            .cloned()
            .collect();
        if orders.is_empty() {
            return Err(CrossbookError::NoOrdersFound);
        }
        Ok(orders)
    }

    fn apply_fill(&self, side: Side, id: u64, quantity: U256) -> Result<Order> {
        let mut stores = self.write()?;
        let order = stores
            .side_mut(side)
            .get_mut(&id)
            .ok_or(CrossbookError::OrderNotFound { side, id })?;

        let matched = order.matched_amount.checked_add(quantity).ok_or(
            CrossbookError::InvariantViolation {
                reason: format!("matched_amount overflow on {side} #{id}"),
            },
        )?;
        if matched > order.amount {
            return Err(CrossbookError::FillOverflow {
                side,
                id,
                quantity: quantity.to_string(),
            });
        }

        order.matched_amount = matched;
        if order.is_fulfilled() {
            order.status = OrderStatus::Closed;
        }
        tracing::debug!(side = %side, id, quantity = %quantity, status = %order.status, "fill applied");
        Ok(order.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn repo_with(orders: Vec<Order>) -> InMemoryOrderRepository {
        let repo = InMemoryOrderRepository::new();
        for order in orders {
            repo.create(order).unwrap();
        }
        repo
    }

    #[test]
    fn create_and_find_by_id() {
        let repo = repo_with(vec![Order::dummy(Side::Buy, 1, 100, 50)]);
        let found = repo.find_by_id(Side::Buy, 1).unwrap();
        assert_eq!(found.id, 1);
        assert_eq!(found.side, Side::Buy);
    }

    #[test]
    fn duplicate_create_rejected_per_side() {
        let repo = repo_with(vec![Order::dummy(Side::Buy, 1, 100, 50)]);
        let err = repo.create(Order::dummy(Side::Buy, 1, 90, 10)).unwrap_err();
        assert!(matches!(
            err,
            CrossbookError::DuplicateOrder {
                side: Side::Buy,
                id: 1
            }
        ));
        // Same id on the other side is a distinct order.
        assert!(repo.create(Order::dummy(Side::Sell, 1, 90, 10)).is_ok());
    }

    #[test]
    fn find_by_id_missing() {
        let repo = InMemoryOrderRepository::new();
        let err = repo.find_by_id(Side::Sell, 3).unwrap_err();
        assert!(matches!(
            err,
            CrossbookError::OrderNotFound {
                side: Side::Sell,
                id: 3
            }
        ));
    }

    #[test]
    fn empty_collection_queries_report_no_orders() {
        let repo = InMemoryOrderRepository::new();
        assert!(matches!(
            repo.find_all().unwrap_err(),
            CrossbookError::NoOrdersFound
        ));
        assert!(matches!(
            repo.find_by_side(Side::Buy).unwrap_err(),
            CrossbookError::NoOrdersFound
        ));
        assert!(matches!(
            repo.find_by_side_and_status(Side::Sell, OrderStatus::Active)
                .unwrap_err(),
            CrossbookError::NoOrdersFound
        ));
    }

    #[test]
    fn find_by_side_returns_id_order() {
        let repo = repo_with(vec![
            Order::dummy(Side::Buy, 3, 100, 50),
            Order::dummy(Side::Buy, 1, 100, 50),
            Order::dummy(Side::Buy, 2, 100, 50),
        ]);
        let ids: Vec<u64> = repo
            .find_by_side(Side::Buy)
            .unwrap()
            .iter()
            .map(|o| o.id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn find_by_status_filters() {
        let mut closed = Order::dummy(Side::Buy, 2, 100, 50);
        closed.status = OrderStatus::Closed;
        let repo = repo_with(vec![Order::dummy(Side::Buy, 1, 100, 50), closed]);

        let active = repo
            .find_by_side_and_status(Side::Buy, OrderStatus::Active)
            .unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, 1);
    }

    #[test]
    fn apply_fill_accumulates_and_closes() {
        let repo = repo_with(vec![Order::dummy(Side::Buy, 1, 100, 50)]);

        let after = repo.apply_fill(Side::Buy, 1, U256::from(20u64)).unwrap();
        assert_eq!(after.matched_amount, U256::from(20u64));
        assert_eq!(after.status, OrderStatus::Active);

        let after = repo.apply_fill(Side::Buy, 1, U256::from(30u64)).unwrap();
        assert_eq!(after.matched_amount, U256::from(50u64));
        assert_eq!(after.status, OrderStatus::Closed);
    }

    #[test]
    fn apply_fill_never_exceeds_amount() {
        let repo = repo_with(vec![Order::dummy(Side::Buy, 1, 100, 50)]);
        let err = repo.apply_fill(Side::Buy, 1, U256::from(51u64)).unwrap_err();
        assert!(matches!(err, CrossbookError::FillOverflow { .. }));
        // The failed fill left the record untouched.
        let order = repo.find_by_id(Side::Buy, 1).unwrap();
        assert_eq!(order.matched_amount, U256::ZERO);
    }

    #[test]
    fn apply_fill_missing_order() {
        let repo = InMemoryOrderRepository::new();
        let err = repo.apply_fill(Side::Sell, 9, U256::ONE).unwrap_err();
        assert!(matches!(err, CrossbookError::OrderNotFound { .. }));
    }

    #[test]
    fn usable_through_trait_object() {
        let repo: Arc<dyn OrderRepository> = Arc::new(InMemoryOrderRepository::new());
        repo.create(Order::dummy(Side::Sell, 1, 100, 10)).unwrap();
        assert_eq!(repo.find_by_side(Side::Sell).unwrap().len(), 1);
    }
}
