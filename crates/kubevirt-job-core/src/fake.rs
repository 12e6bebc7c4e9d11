//! In-memory `VirtualMachineApi` that records every call, in order.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::api::VirtualMachineApi;
use crate::selector::Selector;
use crate::vm::VirtualMachine;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    List { namespace: String, selector: String },
    Patch { vm: String },
    Restart { vm: String },
}

#[derive(Default)]
pub struct FakeVirtualMachineApi {
    vms: Mutex<Vec<VirtualMachine>>,
    actions: Mutex<Vec<Action>>,
    fail_list: bool,
    fail_patch: HashSet<String>,
    fail_restart: HashSet<String>,
}

impl FakeVirtualMachineApi {
    pub fn with_vms(vms: impl IntoIterator<Item = VirtualMachine>) -> Self {
        Self {
            vms: Mutex::new(vms.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn fail_list(mut self) -> Self {
        self.fail_list = true;
        self
    }

    pub fn fail_patch(mut self, name: &str) -> Self {
        self.fail_patch.insert(name.to_string());
        self
    }

    pub fn fail_restart(mut self, name: &str) -> Self {
        self.fail_restart.insert(name.to_string());
        self
    }

    pub fn actions(&self) -> Vec<Action> {
        self.actions.lock().unwrap().clone()
    }

    pub fn machine_type(&self, namespace: &str, name: &str) -> Option<String> {
        self.vms
            .lock()
            .unwrap()
            .iter()
            .find(|vm| vm.namespace == namespace && vm.name == name)
            .and_then(|vm| vm.machine_type.clone())
    }

    fn record(&self, action: Action) {
        self.actions.lock().unwrap().push(action);
    }
}

#[async_trait]
impl VirtualMachineApi for FakeVirtualMachineApi {
    async fn list(&self, namespace: &str, selector: &Selector) -> anyhow::Result<Vec<VirtualMachine>> {
        self.record(Action::List {
            namespace: namespace.to_string(),
            selector: selector.to_string(),
        });
        if self.fail_list {
            anyhow::bail!("the server is currently unable to handle the request");
        }
        Ok(self
            .vms
            .lock()
            .unwrap()
            .iter()
            .filter(|vm| vm.namespace == namespace && selector.matches(&vm.labels))
            .cloned()
            .collect())
    }

    async fn clear_machine_type(&self, vm: &VirtualMachine) -> anyhow::Result<()> {
        self.record(Action::Patch { vm: vm.to_string() });
        if self.fail_patch.contains(&vm.name) {
            anyhow::bail!("virtualmachines \"{}\" is forbidden", vm.name);
        }
        let mut vms = self.vms.lock().unwrap();
        if let Some(stored) = vms
            .iter_mut()
            .find(|s| s.namespace == vm.namespace && s.name == vm.name)
        {
            stored.machine_type = None;
        }
        Ok(())
    }

    async fn restart(&self, vm: &VirtualMachine) -> anyhow::Result<()> {
        self.record(Action::Restart { vm: vm.to_string() });
        if self.fail_restart.contains(&vm.name) {
            anyhow::bail!("VM is not running");
        }
        Ok(())
    }
}
