use async_trait::async_trait;
use kube::api::{Api, ListParams, Patch, PatchParams, PostParams};
use kube::core::{ApiResource, DynamicObject};
use kube::{Client, Resource};

use kubevirt_job_core::api::VirtualMachineApi;
use kubevirt_job_core::selector::Selector;
use kubevirt_job_core::vm::VirtualMachine;

use crate::resource::{
    clear_machine_type_patch, to_virtual_machine, virtual_machine_resource,
    virtual_machine_subresource,
};

/// Field manager recorded on every patch issued by the job.
pub const FIELD_MANAGER: &str = "kubevirt-job";

/// `VirtualMachineApi` backed by the cluster's KubeVirt API.
pub struct KubeVirtApi {
    client: Client,
    resource: ApiResource,
    subresource: ApiResource,
}

impl KubeVirtApi {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            resource: virtual_machine_resource(),
            subresource: virtual_machine_subresource(),
        }
    }

    fn namespaced(&self, namespace: &str) -> Api<DynamicObject> {
        Api::namespaced_with(self.client.clone(), namespace, &self.resource)
    }
}

#[async_trait]
impl VirtualMachineApi for KubeVirtApi {
    async fn list(&self, namespace: &str, selector: &Selector) -> anyhow::Result<Vec<VirtualMachine>> {
        let mut lp = ListParams::default();
        if !selector.is_everything() {
            lp = lp.labels(&selector.to_string());
        }

        let list = self.namespaced(namespace).list(&lp).await?;
        tracing::debug!(namespace, items = list.items.len(), "Virtual machine list received");

        Ok(list
            .items
            .into_iter()
            .map(|obj| to_virtual_machine(obj, namespace))
            .collect())
    }

    async fn clear_machine_type(&self, vm: &VirtualMachine) -> anyhow::Result<()> {
        let patch = clear_machine_type_patch();
        self.namespaced(&vm.namespace)
            .patch(&vm.name, &PatchParams::apply(FIELD_MANAGER), &Patch::Merge(&patch))
            .await?;
        Ok(())
    }

    async fn restart(&self, vm: &VirtualMachine) -> anyhow::Result<()> {
        let url = DynamicObject::url_path(&self.subresource, Some(&vm.namespace));
        let request = kube::core::Request::new(url).replace_subresource(
            "restart",
            &vm.name,
            &PostParams::default(),
            b"{}".to_vec(),
        )?;
        let response = self.client.request_text(request).await?;
        tracing::debug!(vm = %vm, response = %response, "Restart requested");
        Ok(())
    }
}
