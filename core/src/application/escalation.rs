//! Two-stage signal escalation.

use std::sync::Arc;

use tokio::time::sleep;
use tracing::{debug, info};

use crate::domain::TerminationPolicy;
use crate::ports::Terminate;

use super::deferred::DeferredTasks;

/// What the primary stage of an escalation achieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscalationOutcome {
    /// Nothing was signaled; the force stage is skipped.
    NoMatches,
    /// Primary signal delivered and no force stage is configured.
    Signaled,
    /// Primary signal delivered; the force signal follows after the grace period.
    ForceScheduled,
}

/// Drives a [`Terminate`] implementation through primary and force stages.
///
/// The force stage runs on a [`DeferredTasks`] task so the caller (the event
/// loop) is never blocked for the grace period.
pub struct EscalationController<T> {
    terminator: Arc<T>,
    policy: Arc<TerminationPolicy>,
    tasks: DeferredTasks,
}

impl<T> Clone for EscalationController<T> {
    fn clone(&self) -> Self {
        Self {
            terminator: Arc::clone(&self.terminator),
            policy: Arc::clone(&self.policy),
            tasks: self.tasks.clone(),
        }
    }
}

impl<T: Terminate> EscalationController<T> {
    pub fn new(terminator: Arc<T>, policy: Arc<TerminationPolicy>) -> Self {
        Self {
            terminator,
            policy,
            tasks: DeferredTasks::new(),
        }
    }

    pub fn policy(&self) -> &TerminationPolicy {
        &self.policy
    }

    /// Scheduled work started by this controller and its owner.
    pub fn tasks(&self) -> &DeferredTasks {
        &self.tasks
    }

    /// Send the primary signal and schedule the force signal if anything matched.
    pub async fn escalate(&self) -> EscalationOutcome {
        let policy = &self.policy;
        let signaled = self
            .terminator
            .terminate(policy.names(), policy.primary_signal)
            .await;

        if !signaled {
            debug!("Primary signal matched nothing; skipping force stage");
            return EscalationOutcome::NoMatches;
        }
        if !policy.escalates() {
            return EscalationOutcome::Signaled;
        }

        info!(
            grace = ?policy.grace_period,
            signal = %policy.force_signal,
            "Scheduling force signal"
        );

        let terminator = Arc::clone(&self.terminator);
        let policy = Arc::clone(&self.policy);
        self.tasks.spawn(async move {
            sleep(policy.grace_period).await;
            terminator
                .terminate(policy.names(), policy.force_signal)
                .await;
        });

        EscalationOutcome::ForceScheduled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::RecordingTerminator;
    use crate::domain::SignalKind;
    use std::time::Duration;
    use tokio::time::Instant;

    fn controller(
        signals_any: bool,
        grace: Duration,
    ) -> (EscalationController<RecordingTerminator>, Arc<RecordingTerminator>) {
        let terminator = Arc::new(RecordingTerminator::new(signals_any));
        let policy = TerminationPolicy::builder()
            .process("WallpaperAerialsExtension")
            .grace_period(grace)
            .build()
            .unwrap();
        (
            EscalationController::new(Arc::clone(&terminator), Arc::new(policy)),
            terminator,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_primary_only_without_grace_period() {
        let (controller, terminator) = controller(true, Duration::ZERO);

        assert_eq!(controller.escalate().await, EscalationOutcome::Signaled);
        sleep(Duration::from_secs(60)).await;

        assert_eq!(terminator.signals(), vec![SignalKind::Terminate]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_force_when_nothing_matched() {
        let (controller, terminator) = controller(false, Duration::from_millis(300));

        assert_eq!(controller.escalate().await, EscalationOutcome::NoMatches);
        sleep(Duration::from_secs(60)).await;

        assert_eq!(terminator.signals(), vec![SignalKind::Terminate]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_force_after_grace_period() {
        let (controller, terminator) = controller(true, Duration::from_millis(300));
        let start = Instant::now();

        assert_eq!(controller.escalate().await, EscalationOutcome::ForceScheduled);

        sleep(Duration::from_millis(299)).await;
        assert_eq!(terminator.signals(), vec![SignalKind::Terminate]);

        sleep(Duration::from_millis(10)).await;
        let calls = terminator.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].0, SignalKind::Kill);
        assert!(calls[1].1 - start >= Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_force_stage_is_tracked() {
        let (controller, terminator) = controller(true, Duration::from_millis(300));

        controller.escalate().await;
        assert_eq!(controller.tasks().outstanding(), 1);

        controller.tasks().wait_idle().await;
        assert_eq!(
            terminator.signals(),
            vec![SignalKind::Terminate, SignalKind::Kill]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_force_signal() {
        let terminator = Arc::new(RecordingTerminator::new(true));
        let policy = TerminationPolicy::builder()
            .primary_signal(SignalKind::Kill)
            .force_signal(SignalKind::Terminate)
            .grace_period(Duration::from_millis(50))
            .build()
            .unwrap();
        let controller = EscalationController::new(Arc::clone(&terminator), Arc::new(policy));

        controller.escalate().await;
        sleep(Duration::from_millis(100)).await;

        assert_eq!(
            terminator.signals(),
            vec![SignalKind::Kill, SignalKind::Terminate]
        );
    }
}
