use std::sync::Arc;

use uuid::Uuid;

use crate::api::VirtualMachineApi;
use crate::config::UpdaterConfig;
use crate::env::EnvSource;
use crate::error::{JobError, JobResult};
use crate::event::{EventSink, SkipReason, UpdaterEvent};
use crate::vm::VirtualMachine;

#[derive(Debug, Default)]
struct Tally {
    listed: usize,
    matched: usize,
    patched: usize,
    restarted: usize,
    failed: usize,
}

/// Clears stale machine type pins on the virtual machines selected by an
/// [`UpdaterConfig`], restarting running ones when asked to.
pub struct MachineTypeUpdater {
    config: UpdaterConfig,
    api: Arc<dyn VirtualMachineApi>,
    event_sinks: Vec<Arc<dyn EventSink>>,
}

impl MachineTypeUpdater {
    /// Resolve the configuration from `env`. Fails on the first invalid value.
    pub fn new<E: EnvSource + ?Sized>(env: &E, api: Arc<dyn VirtualMachineApi>) -> JobResult<Self> {
        let config = UpdaterConfig::from_env(env)?;
        Ok(Self::with_config(config, api))
    }

    pub fn with_config(config: UpdaterConfig, api: Arc<dyn VirtualMachineApi>) -> Self {
        Self {
            config,
            api,
            event_sinks: Vec::new(),
        }
    }

    pub fn config(&self) -> &UpdaterConfig {
        &self.config
    }

    pub fn add_event_sink(&mut self, sink: Arc<dyn EventSink>) {
        self.event_sinks.push(sink);
    }

    async fn emit(&self, event: UpdaterEvent) {
        for sink in &self.event_sinks {
            sink.emit(event.clone()).await;
        }
    }

    /// One pass: list, match, patch, maybe restart.
    ///
    /// Only a failed list is returned as an error. Patch and restart failures
    /// are logged and emitted, and the pass moves on to the next candidate.
    pub async fn run(&self) -> JobResult<()> {
        let run_id = Uuid::new_v4();
        let namespace = self.config.namespace();
        let selector = self.config.label_selector();

        self.emit(UpdaterEvent::Started {
            run_id,
            at: chrono::Utc::now(),
        })
        .await;

        let vms = self
            .api
            .list(namespace, selector)
            .await
            .map_err(|source| JobError::List {
                namespace: namespace.to_string(),
                source,
            })?;

        tracing::info!(
            %run_id,
            namespace = %namespace,
            selector = %selector,
            count = vms.len(),
            "Listed virtual machines"
        );
        self.emit(UpdaterEvent::Listed {
            run_id,
            count: vms.len(),
        })
        .await;

        let mut tally = Tally {
            listed: vms.len(),
            ..Tally::default()
        };
        for vm in &vms {
            self.update(run_id, vm, &mut tally).await;
        }

        tracing::info!(
            %run_id,
            listed = tally.listed,
            matched = tally.matched,
            patched = tally.patched,
            restarted = tally.restarted,
            failed = tally.failed,
            "Machine type update complete"
        );
        self.emit(UpdaterEvent::Completed {
            run_id,
            at: chrono::Utc::now(),
        })
        .await;

        Ok(())
    }

    async fn update(&self, run_id: Uuid, vm: &VirtualMachine, tally: &mut Tally) {
        let glob = self.config.machine_type_glob();

        let Some(machine_type) = vm.pinned_machine_type() else {
            tracing::debug!(vm = %vm, "No machine type pinned, skipping");
            self.skip(run_id, vm, SkipReason::NoMachineType).await;
            return;
        };
        if !glob.matches(machine_type) {
            tracing::debug!(vm = %vm, machine_type, glob = %glob, "Machine type does not match");
            self.skip(run_id, vm, SkipReason::NoMatch).await;
            return;
        }
        tally.matched += 1;

        if let Err(source) = self.api.clear_machine_type(vm).await {
            let err = JobError::Patch {
                vm: vm.to_string(),
                source,
            };
            tracing::error!(vm = %vm, error = %err, "Failed to clear machine type");
            tally.failed += 1;
            self.emit(UpdaterEvent::PatchFailed {
                run_id,
                vm: vm.to_string(),
                error: err.to_string(),
            })
            .await;
            return;
        }
        tracing::info!(vm = %vm, machine_type, "Machine type cleared");
        tally.patched += 1;
        self.emit(UpdaterEvent::Patched {
            run_id,
            vm: vm.to_string(),
        })
        .await;

        // A stopped VM picks up the default machine type on its next start.
        if !self.config.restart_required() || !vm.is_running() {
            return;
        }

        match self.api.restart(vm).await {
            Ok(()) => {
                tracing::info!(vm = %vm, "Virtual machine restarted");
                tally.restarted += 1;
                self.emit(UpdaterEvent::Restarted {
                    run_id,
                    vm: vm.to_string(),
                })
                .await;
            }
            Err(source) => {
                let err = JobError::Restart {
                    vm: vm.to_string(),
                    source,
                };
                tracing::error!(vm = %vm, error = %err, "Failed to restart virtual machine");
                tally.failed += 1;
                self.emit(UpdaterEvent::RestartFailed {
                    run_id,
                    vm: vm.to_string(),
                    error: err.to_string(),
                })
                .await;
            }
        }
    }

    async fn skip(&self, run_id: Uuid, vm: &VirtualMachine, reason: SkipReason) {
        self.emit(UpdaterEvent::Skipped {
            run_id,
            vm: vm.to_string(),
            reason,
        })
        .await;
    }
}
