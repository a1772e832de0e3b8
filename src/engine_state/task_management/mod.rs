//! # Task Management System
//!
//! This module runs chunk meshing on a fixed pool of background threads and
//! hands the results back to the render thread.
//!
//! ## Architecture Overview
//!
//! The system consists of several key components:
//! - `MeshWorkerPool`: Owns the worker threads, their scratch buffers, and the
//!   two queues connecting them to the render thread
//! - `JobQueue`: Thread-safe FIFO with outstanding-work accounting
//! - `MeshJob` / `MeshResult`: What flows through the input and output queues
//!
//! ## Worker Lifecycle
//! 1. Each worker owns exactly one `TessellationBuffer` for its whole life
//! 2. It waits until that buffer is idle, then takes the next job off the
//!    shared input queue
//! 3. It builds the mesh into the buffer and puts the result on the output
//!    queue, which is bounded to the number of workers
//! 4. The render thread drains the output queue, uploads each mesh, and marks
//!    the buffer available, which wakes the worker for its next job
//! 5. Workers exit once the shared running flag is cleared; every wait uses
//!    the configured poll interval as its timeout so shutdown is prompt
//!
//! ## Render Thread Guarantees
//! - The render thread never blocks on either queue: it submits with a
//!   non-blocking put and drains with a non-blocking get
//! - A worker never overwrites a mesh the render thread has not uploaded
//!
//! ## Example Usage
//! ```no_run
//! # use std::sync::Arc;
//! # use voxel_mesher::config::WorldConfig;
//! # use voxel_mesher::engine_state::rendering::meshing::MeshBuilder;
//! # use voxel_mesher::engine_state::task_management::MeshWorkerPool;
//! # use voxel_mesher::engine_state::voxels::biome::BiomeColorTable;
//! let builder = MeshBuilder::new(Arc::new(BiomeColorTable::default()));
//! let mut pool = MeshWorkerPool::new(&WorldConfig::default(), builder)?;
//!
//! // In the render loop:
//! while let Some(result) = pool.try_recv_result() {
//!     // upload result.buffer, then:
//!     result.buffer.mark_available()?;
//!     pool.result_done();
//! }
//!
//! pool.shutdown();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod job_queue;
pub mod task;

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, info, warn};

pub use job_queue::JobQueue;
pub use task::{MeshJob, MeshResult};

use crate::{
    config::WorldConfig,
    engine_state::rendering::meshing::{MeshBuilder, TessellationBuffer},
    error::{QueueError, WorldError},
};

/// A worker thread and the scratch buffer it owns.
struct MeshWorker {
    buffer: Arc<TessellationBuffer>,
    handle: Option<JoinHandle<()>>,
}

/// Everything a worker thread needs, moved into the thread on spawn.
struct WorkerContext {
    index: usize,
    buffer: Arc<TessellationBuffer>,
    input: Arc<JobQueue<MeshJob>>,
    output: Arc<JobQueue<MeshResult>>,
    running: Arc<AtomicBool>,
    builder: MeshBuilder,
    poll_interval: Duration,
}

/// Manages the mesh worker threads and the queues feeding them.
///
/// # Implementation Notes
/// - Drop-safe: dropping the pool stops and joins every worker
/// - Panic-safe: a panicking worker is logged at join and does not take the
///   render thread down with it
pub struct MeshWorkerPool {
    workers: Vec<MeshWorker>,
    input: Arc<JobQueue<MeshJob>>,
    output: Arc<JobQueue<MeshResult>>,
    running: Arc<AtomicBool>,
}

impl MeshWorkerPool {
    /// Spawns `config.worker_count` named worker threads.
    ///
    /// # Arguments
    /// * `config` - Worker count, queue capacities, scratch size, poll interval
    /// * `builder` - The mesh builder every worker clones
    ///
    /// # Errors
    /// `WorldError::WorkerSpawn` if a thread cannot be created. Workers
    /// spawned before the failure are stopped and joined.
    pub fn new(config: &WorldConfig, builder: MeshBuilder) -> Result<Self, WorldError> {
        let input = Arc::new(JobQueue::with_capacity(config.input_queue_capacity));
        let output = Arc::new(JobQueue::bounded(config.output_capacity()));
        let running = Arc::new(AtomicBool::new(true));

        info!(
            "Starting {} mesh workers (available parallelism: {:?})",
            config.worker_count,
            thread::available_parallelism()
        );

        let mut pool = Self {
            workers: Vec::with_capacity(config.worker_count),
            input,
            output,
            running,
        };

        for index in 0..config.worker_count {
            let buffer = Arc::new(TessellationBuffer::new(config.scratch_initial_vertices));
            let context = WorkerContext {
                index,
                buffer: buffer.clone(),
                input: pool.input.clone(),
                output: pool.output.clone(),
                running: pool.running.clone(),
                builder: builder.clone(),
                poll_interval: config.poll_interval(),
            };

            let handle = thread::Builder::new()
                .name(format!("mesh-worker-{index}"))
                .spawn(move || run_worker(context))
                .map_err(|source| WorldError::WorkerSpawn { index, source })?;

            pool.workers.push(MeshWorker {
                buffer,
                handle: Some(handle),
            });
        }

        Ok(pool)
    }

    /// Submits a job without blocking.
    ///
    /// # Errors
    /// `QueueError::Full` with the job handed back if the input queue is full.
    pub fn submit(&self, job: MeshJob) -> Result<(), QueueError<MeshJob>> {
        self.input.put(job, false)
    }

    /// Takes one finished mesh off the output queue without blocking.
    ///
    /// Every result taken must be matched by `result_done` once handled.
    pub fn try_recv_result(&self) -> Option<MeshResult> {
        self.output.try_get().ok()
    }

    /// Marks one result taken with `try_recv_result` as handled.
    pub fn result_done(&self) {
        self.output.task_done();
    }

    /// Jobs submitted but not yet finished or discarded by a worker.
    pub fn pending_jobs(&self) -> usize {
        self.input.unfinished_tasks()
    }

    /// Number of worker threads still owned by the pool.
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// The scratch buffers, one per worker.
    pub fn buffers(&self) -> impl Iterator<Item = &Arc<TessellationBuffer>> + '_ {
        self.workers.iter().map(|worker| &worker.buffer)
    }

    /// Returns `true` until `shutdown` has been called.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Stops every worker, waits for it to exit, and releases the scratch
    /// buffers. Jobs and results still queued are dropped.
    pub fn shutdown(&mut self) {
        if self.workers.is_empty() {
            return;
        }

        self.running.store(false, Ordering::Release);
        for worker in &mut self.workers {
            if let Some(handle) = worker.handle.take() {
                let name = handle.thread().name().unwrap_or("mesh-worker").to_string();
                if handle.join().is_err() {
                    warn!("{name} panicked");
                }
            }
        }
        for worker in self.workers.drain(..) {
            worker.buffer.release();
        }

        while self.input.try_get().is_ok() {
            self.input.task_done();
        }
        while self.output.try_get().is_ok() {
            self.output.task_done();
        }
        info!("Mesh workers stopped");
    }
}

impl Drop for MeshWorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Main loop of one worker thread.
fn run_worker(context: WorkerContext) {
    let WorkerContext {
        index,
        buffer,
        input,
        output,
        running,
        builder,
        poll_interval,
    } = context;

    debug!("Mesh worker {index} started");

    while running.load(Ordering::Acquire) {
        match buffer.wait_timeout(poll_interval) {
            Ok(true) => {}
            Ok(false) => continue,
            Err(_) => break,
        }

        let job = match input.get_timeout(poll_interval) {
            Ok(job) => job,
            Err(QueueError::Timeout) => continue,
            Err(_) => break,
        };

        if job.chunk.get().is_tessellated() {
            debug!(
                "Worker {index} dropping redundant job for chunk {:?}",
                job.position
            );
            job.chunk.get().job_finished();
            input.task_done();
            continue;
        }

        let position = job.position;
        let chunk = job.chunk.clone();
        match job.process(&builder, &buffer) {
            Ok(result) => deliver(result, &output, &running, poll_interval),
            Err(error) => {
                warn!("Worker {index} could not mesh chunk {position:?}: {error}");
                chunk.get().job_finished();
            }
        }
        input.task_done();
    }

    debug!("Mesh worker {index} exiting");
}

/// Puts a result on the output queue, retrying until there is room or the
/// pool is shutting down.
fn deliver(
    mut result: MeshResult,
    output: &JobQueue<MeshResult>,
    running: &AtomicBool,
    poll_interval: Duration,
) {
    loop {
        match output.put_timeout(result, poll_interval) {
            Ok(()) => return,
            Err(QueueError::Full(rejected)) if running.load(Ordering::Acquire) => {
                result = rejected;
            }
            Err(error) => {
                if let Some(rejected) = error.into_inner() {
                    rejected.chunk.get().job_finished();
                    let _ = rejected.buffer.mark_available();
                }
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MtResource;
    use crate::engine_state::rendering::meshing::ScratchState;
    use crate::engine_state::voxels::biome::BiomeColorTable;
    use crate::engine_state::voxels::block::{block_type::BlockType, Block};
    use crate::engine_state::voxels::chunk::Chunk;
    use cgmath::Point3;
    use std::time::Instant;

    fn config(worker_count: usize) -> WorldConfig {
        WorldConfig {
            worker_count,
            poll_interval_ms: 5,
            ..WorldConfig::default()
        }
    }

    fn builder() -> MeshBuilder {
        MeshBuilder::new(Arc::new(BiomeColorTable::default()))
    }

    fn job_for(chunk: &MtResource<Chunk>) -> MeshJob {
        chunk.get().job_submitted();
        MeshJob {
            chunk: chunk.clone(),
            position: Point3::new(0, 0, 0),
            neighbors: Default::default(),
        }
    }

    fn wait_for_result(pool: &MeshWorkerPool) -> MeshResult {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(result) = pool.try_recv_result() {
                return result;
            }
            assert!(Instant::now() < deadline, "no mesh result arrived");
            thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn test_job_round_trip() {
        let mut pool = MeshWorkerPool::new(&config(2), builder()).unwrap();
        let mut chunk = Chunk::new();
        chunk.set_block(5, 5, 5, Block::of(BlockType::STONE, 0));
        let chunk = MtResource::new(chunk);

        pool.submit(job_for(&chunk)).unwrap();
        let result = wait_for_result(&pool);

        assert!(result.chunk.ptr_eq(&chunk));
        assert_eq!(result.vertex_count, 36);
        assert_eq!(result.buffer.state(), ScratchState::ReadyForUpload);

        result.buffer.mark_available().unwrap();
        pool.result_done();
        pool.shutdown();
        assert_eq!(pool.worker_count(), 0);
    }

    #[test]
    fn test_worker_waits_for_buffer_release() {
        let pool = MeshWorkerPool::new(&config(1), builder()).unwrap();
        let chunk = MtResource::new(Chunk::new());

        pool.submit(job_for(&chunk)).unwrap();
        pool.submit(job_for(&chunk)).unwrap();

        let first = wait_for_result(&pool);
        thread::sleep(Duration::from_millis(50));
        assert!(pool.try_recv_result().is_none());
        assert_eq!(pool.pending_jobs(), 1);

        first.buffer.mark_available().unwrap();
        pool.result_done();
        let second = wait_for_result(&pool);
        second.buffer.mark_available().unwrap();
        pool.result_done();
    }

    #[test]
    fn test_redundant_job_is_discarded() {
        let pool = MeshWorkerPool::new(&config(1), builder()).unwrap();
        let chunk = MtResource::new(Chunk::new());
        chunk.get().set_tessellated(true);

        pool.submit(job_for(&chunk)).unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while pool.pending_jobs() > 0 {
            assert!(Instant::now() < deadline, "job was never taken");
            thread::sleep(Duration::from_millis(1));
        }
        assert!(pool.try_recv_result().is_none());
        assert_eq!(chunk.get().pending_jobs(), 0);
    }

    #[test]
    fn test_shutdown_releases_buffers_and_is_idempotent() {
        let mut pool = MeshWorkerPool::new(&config(3), builder()).unwrap();
        let buffers: Vec<_> = pool.buffers().cloned().collect();
        assert_eq!(buffers.len(), 3);

        pool.shutdown();
        pool.shutdown();

        assert!(!pool.is_running());
        assert!(buffers.iter().all(|b| b.state() == ScratchState::Released));
    }

    #[test]
    fn test_drop_joins_workers_with_undelivered_results() {
        let pool = MeshWorkerPool::new(&config(1), builder()).unwrap();
        let chunk = MtResource::new(Chunk::new());
        pool.submit(job_for(&chunk)).unwrap();
        let _ = wait_for_result(&pool);
        drop(pool);
    }
}
