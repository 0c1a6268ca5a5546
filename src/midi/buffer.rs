// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Fixed-capacity event buffer shared by the performance and feedback streams.

/// Default number of events a buffer can hold
pub const DEFAULT_BUFFER_CAPACITY: usize = 512;

/// Fixed-capacity event buffer.
///
/// Storage is reserved up front; [`EventBuffer::push`] refuses events once
/// the buffer is full and records the overflow instead of growing, so a
/// buffer can be filled from the audio thread without allocating.
#[derive(Debug, Clone)]
pub struct EventBuffer<E> {
    events: Vec<E>,
    capacity: usize,
    overflowed: bool,
}

impl<E> EventBuffer<E> {
    /// Create a buffer with [`DEFAULT_BUFFER_CAPACITY`]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BUFFER_CAPACITY)
    }

    /// Create a buffer that holds at most `capacity` events
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: Vec::with_capacity(capacity),
            capacity,
            overflowed: false,
        }
    }

    /// Build a buffer from a list of events (for hosts and tests).
    /// Capacity is the larger of the default and the list length.
    pub fn from_events<I: IntoIterator<Item = E>>(events: I) -> Self {
        let events: Vec<E> = events.into_iter().collect();
        let capacity = events.len().max(DEFAULT_BUFFER_CAPACITY);
        let mut buffer = Self::with_capacity(capacity);
        buffer.events.extend(events);
        buffer
    }

    /// Clear all events and the overflow flag
    #[inline]
    pub fn clear(&mut self) {
        self.events.clear();
        self.overflowed = false;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Maximum number of events this buffer accepts
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Change the event limit, growing storage when it is smaller than
    /// `capacity`. Only allocates on growth.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        if self.events.capacity() < capacity {
            self.events.reserve_exact(capacity - self.events.len());
        }
    }

    /// Returns true if any push failed since the last clear
    #[inline]
    pub fn has_overflowed(&self) -> bool {
        self.overflowed
    }

    /// Push an event. Returns `false` (and flags overflow) when full.
    #[inline]
    pub fn push(&mut self, event: E) -> bool {
        if self.events.len() < self.capacity {
            self.events.push(event);
            true
        } else {
            self.overflowed = true;
            false
        }
    }

    /// Iterate events in buffer order
    pub fn iter(&self) -> std::slice::Iter<'_, E> {
        self.events.iter()
    }

    /// Events as a slice
    pub fn as_slice(&self) -> &[E] {
        &self.events
    }
}

impl<E> Default for EventBuffer<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, E> IntoIterator for &'a EventBuffer<E> {
    type Item = &'a E;
    type IntoIter = std::slice::Iter<'a, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
