//! Scheduler configuration.

/// Configuration for a [`Scheduler`](crate::Scheduler).
///
/// One scheduler exists per timing domain; `name` tags its log lines so a
/// millisecond and a microsecond instance can be told apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    pub name: &'static str,
    /// Number of task slots reserved up front.
    pub capacity: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            name: "sched",
            capacity: 8,
        }
    }
}

impl SchedulerConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> SchedulerConfigBuilder {
        SchedulerConfigBuilder::default()
    }
}

/// Builder for [`SchedulerConfig`].
#[derive(Debug, Clone, Default)]
pub struct SchedulerConfigBuilder {
    config: SchedulerConfig,
}

impl SchedulerConfigBuilder {
    /// Sets the name used in log output.
    pub fn name(mut self, name: &'static str) -> Self {
        self.config.name = name;
        self
    }

    /// Sets how many task slots are allocated at construction.
    ///
    /// The pending set still grows past this on demand.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.config.capacity = capacity;
        self
    }

    pub fn build(self) -> SchedulerConfig {
        self.config
    }
}
