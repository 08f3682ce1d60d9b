//! Base Orch trait.

use async_trait::async_trait;

/// Base trait for event-driven managers.
///
/// Each manager implements this trait to participate in the daemon event
/// loop. The loop calls [`do_task`](Orch::do_task) whenever a transport
/// has queued events; the manager is the only writer of its own state, so
/// calls are never concurrent.
#[async_trait]
pub trait Orch: Send + Sync {
    /// Returns the name of this Orch (for logging and debugging).
    fn name(&self) -> &str;

    /// Processes pending events from all consumers.
    ///
    /// Implementations should drain their consumers in arrival order and
    /// handle every event to completion before returning.
    async fn do_task(&mut self);

    /// Returns true if this Orch has pending work.
    fn has_pending_tasks(&self) -> bool {
        false
    }

    /// Dumps pending tasks for debugging.
    fn dump_pending_tasks(&self) -> Vec<String> {
        vec![]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestOrch {
        name: String,
        task_count: usize,
    }

    #[async_trait]
    impl Orch for TestOrch {
        fn name(&self) -> &str {
            &self.name
        }

        async fn do_task(&mut self) {
            self.task_count += 1;
        }

        fn has_pending_tasks(&self) -> bool {
            self.task_count < 10
        }
    }

    #[tokio::test]
    async fn test_orch_trait() {
        let mut orch = TestOrch {
            name: "test".to_string(),
            task_count: 0,
        };

        assert_eq!(orch.name(), "test");
        assert!(orch.has_pending_tasks());
        assert!(orch.dump_pending_tasks().is_empty());

        orch.do_task().await;
        assert_eq!(orch.task_count, 1);
    }
}
