//! # Task Management System
//!
//! A small worker pool for work that may leave the tick thread. The editor
//! uses it to pre-scan large regions (finding the positions an edit will
//! touch) while the host keeps simulating.
//!
//! ## Architecture Overview
//! - `TaskManager`: owns the workers, distributes tasks round-robin and queues
//!   tasks when every worker is busy
//! - `Task`: a unit of work producing an output value
//! - `TaskChannel`: the pair of channels connecting the tick thread to one worker
//!
//! ## Task Lifecycle
//! 1. Tasks are published via `TaskManager::publish_task()`
//! 2. The manager sends each task to a worker with spare capacity, or queues it
//! 3. Workers process tasks and send the output back
//! 4. The tick thread calls `drain_completed()` to collect outputs and
//!    `process_queued_tasks()` to hand queued work to idle workers
//!
//! A manager created with zero workers accepts no tasks; callers check
//! [`TaskManager::has_workers`] and do the work inline instead.

pub mod task;

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

use log::{error, info, warn};
use task::Task;

/// A boxed task producing `R`.
pub type BoxedTask<R> = Box<dyn Task<Output = R>>;

/// A communication channel between the tick thread and one worker thread.
struct TaskChannel<R> {
    task_sender: Sender<BoxedTask<R>>,
    result_receiver: Receiver<R>,
    num_tasks_in_flight: usize,
    connected: bool,
    _worker: JoinHandle<()>,
}

/// Manages a pool of worker threads and coordinates task execution.
///
/// Dropping the manager closes every task channel, which ends the worker
/// loops.
pub struct TaskManager<R: Send + 'static> {
    channels: Vec<TaskChannel<R>>,
    queued_tasks: VecDeque<BoxedTask<R>>,
    current_channel: usize,
}

/// Maximum number of tasks that can be in flight per worker channel.
pub const MAX_TASKS_IN_FLIGHT: usize = 1;

impl<R: Send + 'static> TaskManager<R> {
    /// Creates a new `TaskManager` with `num_workers` worker threads.
    ///
    /// Workers that fail to spawn are logged and left out of the pool.
    pub fn new(num_workers: usize) -> Self {
        let mut channels = Vec::with_capacity(num_workers);

        for index in 0..num_workers {
            let (task_tx, task_rx) = channel::<BoxedTask<R>>();
            let (result_tx, result_rx) = channel::<R>();

            let task_closure = move || {
                while let Ok(task) = task_rx.recv() {
                    let output = panic::catch_unwind(AssertUnwindSafe(|| task.process()))
                        .unwrap_or_else(|_| {
                            error!("Worker task panicked; reporting it as abandoned");
                            task.abandoned()
                        });
                    if result_tx.send(output).is_err() {
                        break;
                    }
                }
            };

            match thread::Builder::new()
                .name(format!("region-scan-{index}"))
                .spawn(task_closure)
            {
                Ok(worker) => channels.push(TaskChannel {
                    task_sender: task_tx,
                    result_receiver: result_rx,
                    num_tasks_in_flight: 0,
                    connected: true,
                    _worker: worker,
                }),
                Err(err) => error!("Failed to spawn worker {index}: {err}"),
            }
        }

        if !channels.is_empty() {
            info!("Started {} task worker(s)", channels.len());
        }

        TaskManager {
            channels,
            queued_tasks: VecDeque::new(),
            current_channel: 0,
        }
    }

    /// Whether at least one worker is alive to take tasks.
    pub fn has_workers(&self) -> bool {
        self.channels.iter().any(|channel| channel.connected)
    }

    /// Number of tasks currently queued or running.
    pub fn pending_tasks(&self) -> usize {
        self.queued_tasks.len()
            + self
                .channels
                .iter()
                .map(|channel| channel.num_tasks_in_flight)
                .sum::<usize>()
    }

    fn try_send_task(
        &mut self,
        task: BoxedTask<R>,
        channel_idx: usize,
    ) -> Result<(), BoxedTask<R>> {
        let channel = &mut self.channels[channel_idx];
        match channel.task_sender.send(task) {
            Ok(()) => {
                channel.num_tasks_in_flight += 1;
                Ok(())
            }
            Err(err) => {
                warn!("Worker {channel_idx} disconnected");
                channel.connected = false;
                Err(err.0)
            }
        }
    }

    /// Finds a connected channel with spare capacity, round-robin from the
    /// last used channel.
    fn find_available_channel(&self) -> Option<usize> {
        let count = self.channels.len();
        (0..count)
            .map(|offset| (self.current_channel + offset) % count)
            .find(|&idx| {
                let channel = &self.channels[idx];
                channel.connected && channel.num_tasks_in_flight < MAX_TASKS_IN_FLIGHT
            })
    }

    /// Publishes a task for execution.
    ///
    /// # Returns
    /// - `true` if the task was handed to a worker immediately
    /// - `false` if it was queued because every worker is busy
    pub fn publish_task(&mut self, task: BoxedTask<R>) -> bool {
        match self.find_available_channel() {
            Some(channel_idx) => match self.try_send_task(task, channel_idx) {
                Ok(()) => {
                    self.current_channel = (channel_idx + 1) % self.channels.len();
                    true
                }
                Err(task) => {
                    self.queued_tasks.push_back(task);
                    false
                }
            },
            None => {
                self.queued_tasks.push_back(task);
                false
            }
        }
    }

    /// Hands queued tasks to workers that have capacity, oldest first.
    pub fn process_queued_tasks(&mut self) {
        while let Some(channel_idx) = self.find_available_channel() {
            let Some(task) = self.queued_tasks.pop_front() else {
                return;
            };
            match self.try_send_task(task, channel_idx) {
                Ok(()) => self.current_channel = (channel_idx + 1) % self.channels.len(),
                Err(task) => self.queued_tasks.push_front(task),
            }
        }
    }

    /// Collects every output that workers have finished so far.
    ///
    /// Must be called from the thread that owns the manager (the tick thread).
    pub fn drain_completed(&mut self) -> Vec<R> {
        let mut outputs = Vec::new();
        for channel in &mut self.channels {
            loop {
                match channel.result_receiver.try_recv() {
                    Ok(output) => {
                        channel.num_tasks_in_flight = channel.num_tasks_in_flight.saturating_sub(1);
                        outputs.push(output);
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        if channel.connected {
                            warn!("Worker result channel closed");
                        }
                        channel.connected = false;
                        break;
                    }
                }
            }
        }
        outputs
    }
}
