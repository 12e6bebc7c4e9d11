use async_trait::async_trait;

use crate::selector::Selector;
use crate::vm::VirtualMachine;

/// Access to the cluster's virtual machines.
///
/// Implementations own transport, timeouts and authentication; the updater
/// never retries a failed call.
#[async_trait]
pub trait VirtualMachineApi: Send + Sync {
    /// List virtual machines in `namespace` matching `selector`, in server order.
    async fn list(&self, namespace: &str, selector: &Selector) -> anyhow::Result<Vec<VirtualMachine>>;

    /// Remove the machine type pinned on the VM template.
    async fn clear_machine_type(&self, vm: &VirtualMachine) -> anyhow::Result<()>;

    /// Restart a running VM so it picks up the new machine type.
    async fn restart(&self, vm: &VirtualMachine) -> anyhow::Result<()>;
}
