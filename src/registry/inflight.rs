//! In-flight fetch table
//!
//! Concurrent misses for the same key join one `OnceCell`; whoever gets the
//! init permit runs its fetcher and the rest wait for the value. A failed
//! init releases the permit to the next waiter.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::OnceCell;

use super::Namespace;

type FlightKey = (Namespace, String, TypeId);
type ErasedCell = Arc<dyn Any + Send + Sync>;

// == In Flight ==
#[derive(Debug, Default)]
pub(crate) struct InFlight {
    flights: Mutex<HashMap<FlightKey, ErasedCell>>,
}

impl InFlight {
    // == Join ==
    /// Returns the pending flight for `key`, starting one if none exists.
    ///
    /// The value type is part of the flight key, so callers reading the same
    /// key as different types never share a cell.
    pub fn join<T>(&self, namespace: Namespace, key: &str) -> Flight<'_, T>
    where
        T: Send + Sync + 'static,
    {
        let flight_key = (namespace, key.to_string(), TypeId::of::<T>());
        let mut flights = self.flights.lock();
        let erased = flights
            .entry(flight_key.clone())
            .or_insert_with(|| Arc::new(OnceCell::<T>::new()) as ErasedCell)
            .clone();
        let cell = erased
            .downcast::<OnceCell<T>>()
            .unwrap_or_else(|_| Arc::new(OnceCell::new()));

        Flight {
            table: self,
            key: flight_key,
            cell,
        }
    }

    /// Number of flights currently pending.
    pub fn len(&self) -> usize {
        self.flights.lock().len()
    }

    fn finish<T>(&self, key: &FlightKey, cell: &Arc<OnceCell<T>>)
    where
        T: Send + Sync + 'static,
    {
        let mut flights = self.flights.lock();
        let Some(current) = flights.get(key) else {
            return;
        };
        if Arc::as_ptr(current) as *const () != Arc::as_ptr(cell) as *const () {
            return;
        }
        // The table holds one reference and this flight another; anything
        // above that is a waiter still relying on the cell.
        if cell.initialized() || Arc::strong_count(cell) <= 2 {
            flights.remove(key);
        }
    }
}

// == Flight ==
/// A caller's membership in a pending fetch. Leaves the table on drop.
pub(crate) struct Flight<'a, T>
where
    T: Send + Sync + 'static,
{
    table: &'a InFlight,
    key: FlightKey,
    cell: Arc<OnceCell<T>>,
}

impl<T> Flight<'_, T>
where
    T: Send + Sync + 'static,
{
    pub fn cell(&self) -> &OnceCell<T> {
        &self.cell
    }
}

impl<T> Drop for Flight<'_, T>
where
    T: Send + Sync + 'static,
{
    fn drop(&mut self) {
        self.table.finish(&self.key, &self.cell);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_key_shares_cell() {
        let table = InFlight::default();
        let first = table.join::<u32>(Namespace::Api, "k");
        let second = table.join::<u32>(Namespace::Api, "k");

        assert!(std::ptr::eq(first.cell(), second.cell()));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_type_and_namespace_split_flights() {
        let table = InFlight::default();
        let _a = table.join::<u32>(Namespace::Api, "k");
        let _b = table.join::<String>(Namespace::Api, "k");
        let _c = table.join::<u32>(Namespace::Data, "k");

        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_last_member_removes_flight() {
        let table = InFlight::default();
        let first = table.join::<u32>(Namespace::Api, "k");
        let second = table.join::<u32>(Namespace::Api, "k");

        drop(first);
        assert_eq!(table.len(), 1);
        drop(second);
        assert_eq!(table.len(), 0);
    }

    #[tokio::test]
    async fn test_initialized_flight_is_removed_by_first_member() {
        let table = InFlight::default();
        let first = table.join::<u32>(Namespace::Api, "k");
        let second = table.join::<u32>(Namespace::Api, "k");

        first.cell().get_or_init(|| async { 7 }).await;
        drop(first);

        assert_eq!(table.len(), 0);
        assert_eq!(second.cell().get(), Some(&7));
    }
}
