use crate::errors::MonitorError;
use tracing::{debug, info, warn};

pub const DEFAULT_CAPACITY: usize = 32;
pub const MAX_EXPR_LEN: usize = 32;

#[derive(Debug, Clone)]
pub struct Watchpoint {
    // Always equal to the slot index
    id: usize,
    expression: String,
    last_value: i64,

    // Link for whichever list (active or free) currently holds this slot
    next: Option<usize>,
}

impl Watchpoint {
    fn new(id: usize, next: Option<usize>) -> Watchpoint {
        Watchpoint {
            id,
            expression: String::with_capacity(MAX_EXPR_LEN),
            last_value: 0,
            next,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn last_value(&self) -> i64 {
        self.last_value
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchpointChange {
    pub id: usize,
    pub expression: String,
    pub old_value: i64,
    pub new_value: i64,
}

/// Fixed-capacity watchpoint storage.
///
/// Every slot sits on exactly one of two singly-linked lists threaded through the
/// backing array: the active list (most recently watched first) or the free list.
/// Slots are never created or destroyed after initialization, only moved between
/// the two lists, so a watchpoint number is always the index of its slot.
pub struct WatchpointPool {
    slots: Box<[Watchpoint]>,

    active_head: Option<usize>,
    free_head: Option<usize>,
}

impl Default for WatchpointPool {
    fn default() -> WatchpointPool {
        WatchpointPool::new(DEFAULT_CAPACITY)
    }
}

impl WatchpointPool {
    pub fn new(capacity: usize) -> WatchpointPool {
        let mut pool = WatchpointPool {
            slots: Box::new([]),
            active_head: None,
            free_head: None,
        };
        pool.initialize(capacity);

        pool
    }

    /// Rebuilds the backing store with `capacity` free slots in ascending order,
    /// discarding any watchpoints that were set.
    pub fn initialize(&mut self, capacity: usize) {
        self.slots = (0..capacity)
            .map(|index| {
                let next = if index + 1 < capacity {
                    Some(index + 1)
                } else {
                    None
                };
                Watchpoint::new(index, next)
            })
            .collect();

        self.active_head = None;
        self.free_head = if capacity > 0 { Some(0) } else { None };

        debug!(capacity, "watchpoint pool initialized");
    }

    pub fn reset(&mut self) {
        let capacity = self.capacity();
        self.initialize(capacity);
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn active_len(&self) -> usize {
        self.iter_active().count()
    }

    pub fn free_len(&self) -> usize {
        self.iter_free().count()
    }

    pub fn is_empty(&self) -> bool {
        self.active_head.is_none()
    }

    pub fn is_active(&self, id: usize) -> bool {
        self.iter_active().any(|wp| wp.id == id)
    }

    pub fn get(&self, id: usize) -> Option<&Watchpoint> {
        if self.is_active(id) {
            self.slots.get(id)
        } else {
            None
        }
    }

    pub fn iter_active(&self) -> Links<'_> {
        Links {
            slots: &self.slots,
            cursor: self.active_head,
        }
    }

    pub fn iter_free(&self) -> Links<'_> {
        Links {
            slots: &self.slots,
            cursor: self.free_head,
        }
    }

    /// Moves the head of the free list to the head of the active list and returns its id.
    /// The slot comes back with an empty expression and a zero value.
    pub fn allocate(&mut self) -> Result<usize, MonitorError> {
        let index = match self.free_head {
            Some(index) => index,
            None => return Err(MonitorError::CapacityExhausted(self.capacity())),
        };

        let slot = &mut self.slots[index];
        self.free_head = slot.next;

        slot.expression.clear();
        slot.last_value = 0;
        slot.next = self.active_head;
        self.active_head = Some(index);

        debug!(id = index, "watchpoint slot allocated");
        Ok(index)
    }

    pub fn watch(&mut self, expression: &str, initial_value: i64) -> Result<usize, MonitorError> {
        // Checked up front so a rejected expression never takes a slot
        if expression.len() > MAX_EXPR_LEN {
            return Err(MonitorError::ExpressionTooLong {
                len: expression.len(),
                max: MAX_EXPR_LEN,
            });
        }

        let id = self.allocate()?;
        let slot = &mut self.slots[id];
        slot.expression.push_str(expression);
        slot.last_value = initial_value;

        info!(id, expression, initial_value, "watchpoint set");
        Ok(id)
    }

    /// Unlinks watchpoint `id` from the active list and pushes it onto the free list.
    /// The returned record still holds the expression it was watching.
    pub fn release(&mut self, id: usize) -> Result<&Watchpoint, MonitorError> {
        if id >= self.capacity() {
            return Err(MonitorError::NotFound(id));
        }

        let mut prev: Option<usize> = None;
        let mut cursor = self.active_head;
        while let Some(index) = cursor {
            if index == id {
                break;
            }
            prev = Some(index);
            cursor = self.slots[index].next;
        }

        if cursor.is_none() {
            return Err(MonitorError::NotActive(id));
        }

        let next = self.slots[id].next;
        match prev {
            None => self.active_head = next,
            Some(prev) => self.slots[prev].next = next,
        }

        self.slots[id].next = self.free_head;
        self.free_head = Some(id);

        let released = &self.slots[id];
        info!(id, expression = released.expression(), "watchpoint deleted");
        Ok(released)
    }

    /// Re-evaluates every active watchpoint and returns the ones whose value changed,
    /// in active-list order. Expressions that fail to evaluate keep their last value.
    pub fn reevaluate_all<F>(&mut self, mut evaluate: F) -> Vec<WatchpointChange>
    where
        F: FnMut(&str) -> Option<i64>,
    {
        let mut changes = Vec::new();

        let mut cursor = self.active_head;
        while let Some(index) = cursor {
            let slot = &mut self.slots[index];
            cursor = slot.next;

            match evaluate(slot.expression.as_str()) {
                Some(new_value) if new_value != slot.last_value => {
                    debug!(id = slot.id, old_value = slot.last_value, new_value, "watchpoint hit");
                    changes.push(WatchpointChange {
                        id: slot.id,
                        expression: slot.expression.clone(),
                        old_value: slot.last_value,
                        new_value,
                    });
                    slot.last_value = new_value;
                }
                Some(_) => {}
                None => warn!(id = slot.id, expression = slot.expression(), "watchpoint expression no longer evaluates"),
            }
        }

        changes
    }
}

pub struct Links<'a> {
    slots: &'a [Watchpoint],
    cursor: Option<usize>,
}

impl<'a> Iterator for Links<'a> {
    type Item = &'a Watchpoint;

    fn next(&mut self) -> Option<&'a Watchpoint> {
        let index = self.cursor?;
        let slot = &self.slots[index];
        self.cursor = slot.next;

        Some(slot)
    }
}
