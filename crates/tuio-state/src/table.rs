//! Object table - the authoritative store of tracked objects
//!
//! Objects live in a slot arena: a stable `session_id -> slot` index
//! keeps removal O(1) and iteration O(n) with no pointer invalidation.
//! Snapshot order is slot order, which is what fixes the Token/Alive
//! ordering of every encoded bundle.

use std::collections::HashMap;

use parking_lot::Mutex;

use tuio_core::{
    validate_component, validate_coordinates, SessionId, SimError, SimResult, Timestamp,
    TrackedObject,
};

use crate::MotionEstimator;

/// Slot arena of tracked objects. Not synchronized; see [`ObjectStore`].
#[derive(Debug, Default)]
pub struct ObjectTable {
    slots: Vec<Option<TrackedObject>>,
    index: HashMap<SessionId, usize>,
    free: Vec<usize>,
    next_id: SessionId,
}

impl ObjectTable {
    pub fn new() -> Self {
        ObjectTable::default()
    }

    /// Insert a new object at rest and return its session id.
    ///
    /// Rejects component ids outside the physical slot range, component
    /// ids already held by a live object, and out-of-range coordinates.
    pub fn insert(
        &mut self,
        component_id: u16,
        x: f32,
        y: f32,
        now: Timestamp,
    ) -> SimResult<SessionId> {
        validate_component(component_id)?;
        validate_coordinates(x, y)?;
        if self.iter().any(|o| o.component_id == component_id) {
            return Err(SimError::ComponentInUse(component_id));
        }

        let id = self.allocate_id();
        let obj = TrackedObject::new(id, component_id, x, y, now);
        let slot = match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(obj);
                slot
            }
            None => {
                self.slots.push(Some(obj));
                self.slots.len() - 1
            }
        };
        self.index.insert(id, slot);
        Ok(id)
    }

    /// Apply an editor pose update.
    pub fn update(&mut self, id: SessionId, x: f32, y: f32, angle: f32) -> SimResult<()> {
        validate_coordinates(x, y)?;
        let obj = self.get_mut(id).ok_or(SimError::ObjectNotFound(id))?;
        obj.set_pose(x, y, angle);
        Ok(())
    }

    /// Remove an object; its slot returns to the free list.
    pub fn remove(&mut self, id: SessionId) -> SimResult<()> {
        let slot = self
            .index
            .remove(&id)
            .ok_or(SimError::ObjectNotFound(id))?;
        self.slots[slot] = None;
        self.free.push(slot);
        Ok(())
    }

    pub fn get(&self, id: SessionId) -> Option<&TrackedObject> {
        self.index.get(&id).and_then(|&slot| self.slots[slot].as_ref())
    }

    pub fn get_mut(&mut self, id: SessionId) -> Option<&mut TrackedObject> {
        match self.index.get(&id) {
            Some(&slot) => self.slots[slot].as_mut(),
            None => None,
        }
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Live objects in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &TrackedObject> {
        self.slots.iter().flatten()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut TrackedObject> {
        self.slots.iter_mut().flatten()
    }

    /// Copies of all live objects, in slot order.
    pub fn snapshot(&self) -> Vec<TrackedObject> {
        self.iter().cloned().collect()
    }

    /// Next id by wrapping increment. After a wrap, ids still held by
    /// live objects are skipped so uniqueness holds unconditionally.
    fn allocate_id(&mut self) -> SessionId {
        let mut id = self.next_id;
        while self.index.contains_key(&id) {
            id = id.next();
        }
        self.next_id = id.next();
        id
    }
}

/// Thread-shared object table.
///
/// One mutex is the single point of mutual exclusion for every mutating
/// operation and for snapshots; critical sections are pure memory work
/// and never touch I/O. [`tick_snapshot`](ObjectStore::tick_snapshot)
/// runs the velocity pass and copies the snapshot inside the same
/// section, which is what makes every encoded Alive list agree exactly
/// with its Token set.
#[derive(Debug, Default)]
pub struct ObjectStore {
    table: Mutex<ObjectTable>,
    estimator: MotionEstimator,
}

impl ObjectStore {
    pub fn new() -> Self {
        ObjectStore::default()
    }

    pub fn with_estimator(estimator: MotionEstimator) -> Self {
        ObjectStore {
            table: Mutex::new(ObjectTable::new()),
            estimator,
        }
    }

    pub fn insert(&self, component_id: u16, x: f32, y: f32, now: Timestamp) -> SimResult<SessionId> {
        self.table.lock().insert(component_id, x, y, now)
    }

    pub fn update(&self, id: SessionId, x: f32, y: f32, angle: f32) -> SimResult<()> {
        self.table.lock().update(id, x, y, angle)
    }

    pub fn remove(&self, id: SessionId) -> SimResult<()> {
        self.table.lock().remove(id)
    }

    pub fn get(&self, id: SessionId) -> Option<TrackedObject> {
        self.table.lock().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.table.lock().len()
    }

    pub fn snapshot(&self) -> Vec<TrackedObject> {
        self.table.lock().snapshot()
    }

    /// Velocity pass plus snapshot in one critical section.
    pub fn tick_snapshot(&self, now: Timestamp) -> Vec<TrackedObject> {
        let mut table = self.table.lock();
        for obj in table.iter_mut() {
            self.estimator.update(obj, now);
        }
        table.snapshot()
    }
}
