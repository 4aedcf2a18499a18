//! Sessions keyed by vehicle id.
//!
//! Each vehicle owns one slot guarded by an async mutex. Operations lock
//! the slot for their whole duration, including chain calls, so work on one
//! vehicle is serialized while different vehicles proceed in parallel.
//! DashMap guards are never held across an `.await`.

use dashmap::DashMap;
use shared_types::Address;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::session::SaleSession;

/// A vehicle's session cell. `None` until the first `initialize` completes.
pub type SessionSlot = Arc<Mutex<Option<SaleSession>>>;

#[derive(Debug, Default)]
pub struct SessionRegistry {
    slots: DashMap<String, SessionSlot>,
    by_contract: DashMap<Address, String>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The slot for `vehicle_id`, created empty on first use.
    pub fn slot(&self, vehicle_id: &str) -> SessionSlot {
        self.slots
            .entry(vehicle_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(None)))
            .value()
            .clone()
    }

    /// The slot for `vehicle_id` if one was ever created.
    pub fn find(&self, vehicle_id: &str) -> Option<SessionSlot> {
        self.slots.get(vehicle_id).map(|slot| slot.value().clone())
    }

    /// The slot of the vehicle whose sale deployed `contract`.
    pub fn find_by_contract(&self, contract: &Address) -> Option<SessionSlot> {
        let vehicle_id = self.by_contract.get(contract)?.value().clone();
        self.find(&vehicle_id)
    }

    pub fn index_contract(&self, contract: Address, vehicle_id: &str) {
        self.by_contract.insert(contract, vehicle_id.to_string());
    }

    pub fn unindex_contract(&self, contract: &Address) {
        self.by_contract.remove(contract);
    }

    /// Clone of the current session for `vehicle_id`.
    pub async fn get(&self, vehicle_id: &str) -> Option<SaleSession> {
        let slot = self.find(vehicle_id)?;
        let guard = slot.lock().await;
        guard.clone()
    }

    /// Number of vehicles with a slot.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
