//! # Tessellation Buffer Module
//!
//! A reusable vertex region that one mesh worker writes one chunk's geometry
//! into, and that the render thread reads back when uploading.
//!
//! ## Lifecycle
//!
//! ```text
//!   Idle --mark_busy--> Writing --finish_writing--> ReadyForUpload
//!    ^                                                   |
//!    +------------------- mark_available ----------------+
//!
//!   any state --release--> Released (terminal)
//! ```
//!
//! The worker owning the buffer calls `wait` before taking its next job, so it
//! never overwrites a mesh the render thread has not uploaded yet. Waiting is
//! done on a condition variable; nothing busy-polls.
//!
//! The lifecycle state and the vertex storage are guarded separately so the
//! render thread can query `is_available` while a worker holds the storage for
//! the duration of a mesh.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, MappedMutexGuard, Mutex, MutexGuard};

use crate::core::memory::{ByteCounter, MemoryCounters, TESSELLATION_BUFFER_COUNTER};
use crate::engine_state::rendering::vertex::Vertex;
use crate::error::ScratchError;

/// Lifecycle state of a `TessellationBuffer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScratchState {
    /// Free for the owning worker to take its next job.
    Idle,
    /// A worker is writing a mesh.
    Writing,
    /// A finished mesh is waiting for the render thread to upload it.
    ReadyForUpload,
    /// Backing memory has been freed. Terminal.
    Released,
}

struct Storage {
    vertices: Vec<Vertex>,
    /// Bytes currently reported to the counter.
    reported_bytes: u64,
}

impl Storage {
    /// Brings the counter in line with the current capacity.
    fn sync_counter(&mut self, counter: &ByteCounter) {
        let bytes = (self.vertices.capacity() * Vertex::SIZE) as u64;
        if bytes > self.reported_bytes {
            counter.add(bytes - self.reported_bytes);
        } else {
            counter.sub(self.reported_bytes - bytes);
        }
        self.reported_bytes = bytes;
    }
}

/// A growable scratch region of vertices with an availability state machine.
pub struct TessellationBuffer {
    state: Mutex<ScratchState>,
    available: Condvar,
    storage: Mutex<Storage>,
    counter: Arc<ByteCounter>,
}

impl TessellationBuffer {
    /// Creates an idle buffer with room for `initial_vertices` vertices.
    pub fn new(initial_vertices: usize) -> Self {
        let counter = MemoryCounters::global().counter(TESSELLATION_BUFFER_COUNTER);
        let mut storage = Storage {
            vertices: Vec::with_capacity(initial_vertices),
            reported_bytes: 0,
        };
        storage.sync_counter(&counter);

        Self {
            state: Mutex::new(ScratchState::Idle),
            available: Condvar::new(),
            storage: Mutex::new(storage),
            counter,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ScratchState {
        *self.state.lock()
    }

    /// Returns `true` if the buffer is idle.
    pub fn is_available(&self) -> bool {
        self.state() == ScratchState::Idle
    }

    /// Suspends the caller until the buffer is idle.
    pub fn wait(&self) -> Result<(), ScratchError> {
        let mut state = self.state.lock();
        loop {
            match *state {
                ScratchState::Idle => return Ok(()),
                ScratchState::Released => return Err(ScratchError::Released),
                _ => self.available.wait(&mut state),
            }
        }
    }

    /// Suspends the caller until the buffer is idle or `timeout` elapses.
    ///
    /// # Returns
    /// `Ok(true)` if the buffer is idle, `Ok(false)` on timeout.
    pub fn wait_timeout(&self, timeout: Duration) -> Result<bool, ScratchError> {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock();
        loop {
            match *state {
                ScratchState::Idle => return Ok(true),
                ScratchState::Released => return Err(ScratchError::Released),
                _ => {
                    if self.available.wait_until(&mut state, deadline).timed_out() {
                        return Ok(*state == ScratchState::Idle);
                    }
                }
            }
        }
    }

    /// Claims the idle buffer for a new mesh and clears previous contents.
    pub fn mark_busy(&self) -> Result<(), ScratchError> {
        self.transition(ScratchState::Idle, ScratchState::Writing)?;
        self.storage.lock().vertices.clear();
        Ok(())
    }

    /// Gives the writing worker exclusive access to the vertex storage.
    ///
    /// The returned writer must be dropped before `finish_writing` is called.
    pub fn writer(&self) -> Result<ScratchWriter<'_>, ScratchError> {
        self.expect_state(ScratchState::Writing)?;
        Ok(ScratchWriter {
            storage: self.storage.lock(),
            counter: &self.counter,
        })
    }

    /// Hands a finished mesh over to the render thread.
    ///
    /// # Returns
    /// The number of vertices written.
    pub fn finish_writing(&self) -> Result<usize, ScratchError> {
        self.transition(ScratchState::Writing, ScratchState::ReadyForUpload)?;
        Ok(self.storage.lock().vertices.len())
    }

    /// Returns the buffer to its worker after the render thread is done with
    /// the contents. Wakes any waiter.
    pub fn mark_available(&self) -> Result<(), ScratchError> {
        let mut state = self.state.lock();
        if *state == ScratchState::Released {
            return Err(ScratchError::Released);
        }
        *state = ScratchState::Idle;
        self.available.notify_all();
        Ok(())
    }

    /// Ensures room for at least `new_capacity` vertices.
    ///
    /// Contents are discarded if the buffer has to grow.
    pub fn resize(&self, new_capacity: usize) -> Result<(), ScratchError> {
        self.ensure_live()?;
        let mut storage = self.storage.lock();
        if storage.vertices.capacity() < new_capacity {
            storage.vertices = Vec::with_capacity(new_capacity);
            storage.sync_counter(&self.counter);
        }
        Ok(())
    }

    /// Ensures room for `additional` more vertices, preserving contents.
    pub fn reserve(&self, additional: usize) -> Result<(), ScratchError> {
        self.ensure_live()?;
        let mut storage = self.storage.lock();
        storage.vertices.reserve(additional);
        storage.sync_counter(&self.counter);
        Ok(())
    }

    /// Frees the backing memory. Every later operation fails with
    /// `ScratchError::Released`, including pending waits.
    pub fn release(&self) {
        let mut state = self.state.lock();
        *state = ScratchState::Released;
        {
            let mut storage = self.storage.lock();
            storage.vertices = Vec::new();
            storage.sync_counter(&self.counter);
        }
        self.available.notify_all();
    }

    /// Read access to the written vertices.
    pub fn vertices(&self) -> Result<MappedMutexGuard<'_, [Vertex]>, ScratchError> {
        self.ensure_live()?;
        Ok(MutexGuard::map(self.storage.lock(), |storage| {
            storage.vertices.as_mut_slice()
        }))
    }

    /// Number of vertices written.
    pub fn vertex_count(&self) -> usize {
        self.storage.lock().vertices.len()
    }

    /// Vertices that fit without growing.
    pub fn capacity(&self) -> usize {
        self.storage.lock().vertices.capacity()
    }

    fn ensure_live(&self) -> Result<(), ScratchError> {
        match self.state() {
            ScratchState::Released => Err(ScratchError::Released),
            _ => Ok(()),
        }
    }

    fn expect_state(&self, expected: ScratchState) -> Result<(), ScratchError> {
        match self.state() {
            ScratchState::Released => Err(ScratchError::Released),
            actual if actual == expected => Ok(()),
            actual => Err(ScratchError::WrongState { expected, actual }),
        }
    }

    fn transition(&self, from: ScratchState, to: ScratchState) -> Result<(), ScratchError> {
        let mut state = self.state.lock();
        match *state {
            ScratchState::Released => Err(ScratchError::Released),
            actual if actual == from => {
                *state = to;
                Ok(())
            }
            actual => Err(ScratchError::WrongState {
                expected: from,
                actual,
            }),
        }
    }
}

impl Drop for TessellationBuffer {
    fn drop(&mut self) {
        let storage = self.storage.get_mut();
        self.counter.sub(storage.reported_bytes);
        storage.reported_bytes = 0;
    }
}

/// Exclusive write access to a buffer in the `Writing` state.
pub struct ScratchWriter<'a> {
    storage: MutexGuard<'a, Storage>,
    counter: &'a ByteCounter,
}

impl ScratchWriter<'_> {
    /// Ensures room for `additional` more vertices, preserving contents.
    ///
    /// Call before each batch of `push`es so a batch never reallocates midway.
    #[inline]
    pub fn reserve(&mut self, additional: usize) {
        let storage = &mut *self.storage;
        if storage.vertices.capacity() - storage.vertices.len() < additional {
            storage.vertices.reserve(additional);
            storage.sync_counter(self.counter);
        }
    }

    /// Appends one vertex.
    #[inline]
    pub fn push(&mut self, vertex: Vertex) {
        debug_assert!(
            self.storage.vertices.len() < self.storage.vertices.capacity(),
            "push without reserve"
        );
        self.storage.vertices.push(vertex);
    }

    /// Number of vertices written so far.
    pub fn len(&self) -> usize {
        self.storage.vertices.len()
    }

    /// Returns `true` if nothing has been written yet.
    pub fn is_empty(&self) -> bool {
        self.storage.vertices.is_empty()
    }

    /// The vertices written so far.
    pub fn as_slice(&self) -> &[Vertex] {
        &self.storage.vertices
    }
}

impl Drop for ScratchWriter<'_> {
    fn drop(&mut self) {
        let counter = self.counter;
        self.storage.sync_counter(counter);
    }
}
