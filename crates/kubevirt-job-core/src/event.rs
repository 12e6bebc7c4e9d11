use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::Level;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoMachineType,
    NoMatch,
}

#[derive(Debug, Clone)]
pub enum UpdaterEvent {
    Started {
        run_id: Uuid,
        at: DateTime<Utc>,
    },
    Listed {
        run_id: Uuid,
        count: usize,
    },
    Skipped {
        run_id: Uuid,
        vm: String,
        reason: SkipReason,
    },
    Patched {
        run_id: Uuid,
        vm: String,
    },
    PatchFailed {
        run_id: Uuid,
        vm: String,
        error: String,
    },
    Restarted {
        run_id: Uuid,
        vm: String,
    },
    RestartFailed {
        run_id: Uuid,
        vm: String,
        error: String,
    },
    Completed {
        run_id: Uuid,
        at: DateTime<Utc>,
    },
}

impl UpdaterEvent {
    pub fn run_id(&self) -> Uuid {
        match self {
            Self::Started { run_id, .. }
            | Self::Listed { run_id, .. }
            | Self::Skipped { run_id, .. }
            | Self::Patched { run_id, .. }
            | Self::PatchFailed { run_id, .. }
            | Self::Restarted { run_id, .. }
            | Self::RestartFailed { run_id, .. }
            | Self::Completed { run_id, .. } => *run_id,
        }
    }

    /// Log level for the event: failures warn, changes made to the cluster are
    /// info, and per-candidate bookkeeping is debug.
    pub fn level(&self) -> Level {
        match self {
            Self::PatchFailed { .. } | Self::RestartFailed { .. } => Level::WARN,
            Self::Started { .. } | Self::Patched { .. } | Self::Restarted { .. } | Self::Completed { .. } => {
                Level::INFO
            }
            Self::Listed { .. } | Self::Skipped { .. } => Level::DEBUG,
        }
    }
}

/// Sink for updater events.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn emit(&self, event: UpdaterEvent);
}

/// Channel-based event sink that forwards events to a receiver.
pub struct ChannelEventSink {
    tx: tokio::sync::mpsc::UnboundedSender<UpdaterEvent>,
}

impl ChannelEventSink {
    pub fn new() -> (Self, tokio::sync::mpsc::UnboundedReceiver<UpdaterEvent>) {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl EventSink for ChannelEventSink {
    async fn emit(&self, event: UpdaterEvent) {
        let _ = self.tx.send(event);
    }
}

/// Logs every event at its own level, tagged with the run id.
pub struct TracingEventSink;

#[async_trait]
impl EventSink for TracingEventSink {
    async fn emit(&self, event: UpdaterEvent) {
        let run_id = event.run_id();
        let level = event.level();
        if level == Level::WARN {
            tracing::warn!(%run_id, ?event, "updater_event");
        } else if level == Level::INFO {
            tracing::info!(%run_id, ?event, "updater_event");
        } else {
            tracing::debug!(%run_id, ?event, "updater_event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failures_warn_and_bookkeeping_is_debug() {
        let run_id = Uuid::new_v4();
        let vm = "default/vm".to_string();

        let failed = UpdaterEvent::PatchFailed {
            run_id,
            vm: vm.clone(),
            error: "forbidden".to_string(),
        };
        assert_eq!(failed.level(), Level::WARN);
        assert_eq!(failed.run_id(), run_id);

        let patched = UpdaterEvent::Patched { run_id, vm: vm.clone() };
        assert_eq!(patched.level(), Level::INFO);

        let skipped = UpdaterEvent::Skipped {
            run_id,
            vm,
            reason: SkipReason::NoMatch,
        };
        assert_eq!(skipped.level(), Level::DEBUG);
    }

    #[tokio::test]
    async fn channel_sink_forwards_events() {
        let (sink, mut rx) = ChannelEventSink::new();
        let run_id = Uuid::new_v4();
        sink.emit(UpdaterEvent::Listed { run_id, count: 3 }).await;

        match rx.recv().await {
            Some(UpdaterEvent::Listed { count, .. }) => assert_eq!(count, 3),
            other => panic!("unexpected event {other:?}"),
        }
    }
}
