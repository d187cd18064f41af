//! Cooperative round-robin run loop.
//!
//! Every tick runs each registered [`Task`] once, in registration order.
//! Nothing is preempted: a task that blocks (a long READ, a stuck responder)
//! holds the whole node until it returns.
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │ RoundRobin::tick                              │
//! │                                               │
//! │   task 0 ──▶ task 1 ──▶ ... ──▶ task N-1      │
//! │   (BootService::poll)  (ActivityLed)          │
//! └───────────────────────────────────────────────┘
//! ```

use log::info;

use crate::error::{Error, Result};

/// One unit of cooperative work.
pub trait Task {
    /// Label used in logs.
    fn name(&self) -> &'static str;

    /// Do a bounded amount of work and return.
    fn run(&mut self);
}

/// Fixed-capacity task list.
pub struct RoundRobin<'a, const N: usize> {
    tasks: heapless::Vec<&'a mut dyn Task, N>,
    ticks: u64,
}

impl<'a, const N: usize> RoundRobin<'a, N> {
    pub const fn new() -> Self {
        Self {
            tasks: heapless::Vec::new(),
            ticks: 0,
        }
    }

    pub fn add(&mut self, task: &'a mut dyn Task) -> Result<()> {
        let name = task.name();
        self.tasks.push(task).map_err(|_| Error::SchedulerFull)?;
        info!("scheduler: task '{}' in slot {}", name, self.tasks.len() - 1);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Ticks completed so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn tick(&mut self) {
        for task in &mut self.tasks {
            task.run();
        }
        self.ticks += 1;
    }

    pub fn run_for(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.tick();
        }
    }

    /// Run forever.  Firmware entry points end here.
    pub fn run(&mut self) -> ! {
        loop {
            self.tick();
        }
    }
}

impl<const N: usize> Default for RoundRobin<'_, N> {
    fn default() -> Self {
        Self::new()
    }
}
