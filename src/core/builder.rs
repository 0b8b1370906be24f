use std::sync::Arc;

use crate::config::PollConfig;
use crate::subscribers::Subscribe;

use super::supervisor::Supervisor;

/// Builder for a [`Supervisor`] with optional subscribers.
pub struct SupervisorBuilder {
    cfg: PollConfig,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl SupervisorBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: PollConfig) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
        }
    }

    /// Replaces the event subscribers.
    ///
    /// Subscribers receive loop events (cycles, failures, backoff)
    /// through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Adds one event subscriber.
    pub fn with_subscriber(mut self, subscriber: Arc<dyn Subscribe>) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    /// Builds the supervisor; spawns subscriber workers, so call it inside a runtime.
    pub fn build(self) -> Supervisor {
        Supervisor::new(self.cfg, self.subscribers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subscribers::LogWriter;
    use std::time::Duration;

    #[tokio::test]
    async fn test_builder_keeps_config() {
        let cfg = PollConfig::new(Duration::from_millis(250), Vec::new());
        let sup = SupervisorBuilder::new(cfg)
            .with_subscriber(Arc::new(LogWriter::new()))
            .build();
        assert_eq!(sup.config().cycle(), Duration::from_millis(250));
    }
}
