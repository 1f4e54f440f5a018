use crate::prelude::{Amount, Order, OrderId, Price, Side, UserId};

/// Append-only record of every order ever placed, addressable by id in
/// constant time (C3). `next_id` is a process-global monotonically
/// increasing counter; ids are never reused and `0` is reserved as "none".
#[derive(Debug, Default)]
pub struct OrderStore {
    orders: Vec<Order>,
}

impl OrderStore {
    pub fn new() -> Self {
        Self { orders: Vec::new() }
    }

    /// Allocates the next id and records a new active order for it.
    #[allow(clippy::too_many_arguments)]
    pub fn create(
        &mut self,
        user: UserId,
        base: [u8; 32],
        quote: [u8; 32],
        side: Side,
        price: Price,
        amount: Amount,
        timestamp: u64,
        created_at: u64,
    ) -> OrderId {
        let id = (self.orders.len() + 1) as OrderId;
        self.orders.push(Order {
            id,
            user,
            base,
            quote,
            side,
            price,
            amount,
            remaining_amount: amount,
            timestamp,
            created_at,
            active: true,
        });
        id
    }

    pub fn get(&self, id: OrderId) -> Option<&Order> {
        if id == 0 {
            return None;
        }
        self.orders.get((id - 1) as usize)
    }

    pub fn get_mut(&mut self, id: OrderId) -> Option<&mut Order> {
        if id == 0 {
            return None;
        }
        self.orders.get_mut((id - 1) as usize)
    }

    pub fn by_index(&self, index: usize) -> Option<&Order> {
        self.orders.get(index)
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}
