//! Task registry and request index
//!
//! The registry owns every in-flight task and issues the stable handles
//! that correlate worker events back to their task. The index maps the
//! caller's request id to the handle so control operations (cancel,
//! reprioritize) can find their task.
//!
//! Neither structure locks: the coordinator is their only accessor and
//! processes one message at a time. The contract still holds under any
//! concurrency model: a stale handle resolves to `None`, never to an
//! error, because lookups racing task destruction are an expected part of
//! cancellation and shutdown.

use std::collections::HashMap;

use super::types::{RequestId, TaskHandle};
use super::worker::WorkerHandle;

/// One in-flight transfer tracked by the coordinator
pub(crate) struct Task {
    /// The caller's identifier, stamped on every forwarded notification
    pub request_id: RequestId,
    /// Exclusively-owned handle to the worker executing this transfer
    pub worker: WorkerHandle,
}

/// Arena of in-flight tasks with stable, coordinator-issued handles
#[derive(Default)]
pub(crate) struct TaskRegistry {
    tasks: HashMap<TaskHandle, Task>,
    next_id: u64,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self {
            tasks: HashMap::new(),
            next_id: 1,
        }
    }

    /// Store a task and return its freshly-issued handle
    pub fn create(&mut self, task: Task) -> TaskHandle {
        self.create_with(|_| task)
    }

    /// Issue a handle, build the task from it, and store the result
    ///
    /// Lets the caller bind the handle into the task's worker (the event
    /// sink) before the task exists in the arena.
    pub fn create_with(&mut self, build: impl FnOnce(TaskHandle) -> Task) -> TaskHandle {
        let handle = TaskHandle::new(self.next_id);
        self.next_id += 1;
        let task = build(handle);
        self.tasks.insert(handle, task);
        handle
    }

    /// Resolve a handle; stale or unknown handles return `None`
    pub fn get(&self, handle: TaskHandle) -> Option<&Task> {
        self.tasks.get(&handle)
    }

    /// Destroy a task and invalidate its handle
    pub fn erase(&mut self, handle: TaskHandle) -> Option<Task> {
        self.tasks.remove(&handle)
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Visit every live task (used by shutdown to signal workers)
    pub fn for_each(&self, mut visit: impl FnMut(TaskHandle, &Task)) {
        for (handle, task) in &self.tasks {
            visit(*handle, task);
        }
    }
}

/// Mapping from caller request ids to task handles
///
/// Entries are created atomically with task creation and removed
/// atomically with task destruction.
#[derive(Default)]
pub(crate) struct RequestIndex {
    entries: HashMap<RequestId, TaskHandle>,
}

impl RequestIndex {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Record a new open request
    ///
    /// # Panics
    ///
    /// Panics if `request_id` is already open. Reusing an id while its
    /// prior request is still in flight is a caller contract violation
    /// that cannot be safely continued past.
    pub fn insert(&mut self, request_id: RequestId, handle: TaskHandle) {
        let previous = self.entries.insert(request_id, handle);
        assert!(
            previous.is_none(),
            "request id {request_id} resubmitted while still open"
        );
    }

    /// Resolve a request id; unknown ids return `None`
    pub fn get(&self, request_id: RequestId) -> Option<TaskHandle> {
        self.entries.get(&request_id).copied()
    }

    pub fn remove(&mut self, request_id: RequestId) {
        self.entries.remove(&request_id);
    }

    /// All currently-open request ids
    pub fn request_ids(&self) -> Vec<RequestId> {
        self.entries.keys().copied().collect()
    }
}
