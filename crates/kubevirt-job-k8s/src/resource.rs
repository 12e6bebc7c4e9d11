//! KubeVirt `VirtualMachine` as a dynamic resource.

use kube::core::{ApiResource, DynamicObject, GroupVersionKind};
use serde_json::Value;

use kubevirt_job_core::vm::{PrintableStatus, RunStrategy, VirtualMachine};

pub const KUBEVIRT_GROUP: &str = "kubevirt.io";
pub const SUBRESOURCES_GROUP: &str = "subresources.kubevirt.io";
pub const VERSION: &str = "v1";
pub const KIND: &str = "VirtualMachine";
pub const PLURAL: &str = "virtualmachines";

const MACHINE_TYPE_POINTER: &str = "/spec/template/spec/domain/machine/type";

pub fn virtual_machine_resource() -> ApiResource {
    ApiResource::from_gvk_with_plural(&GroupVersionKind::gvk(KUBEVIRT_GROUP, VERSION, KIND), PLURAL)
}

/// Same resource under the group serving `restart`, `start`, `stop`, ...
pub fn virtual_machine_subresource() -> ApiResource {
    ApiResource::from_gvk_with_plural(
        &GroupVersionKind::gvk(SUBRESOURCES_GROUP, VERSION, KIND),
        PLURAL,
    )
}

/// JSON merge patch dropping `spec.template.spec.domain.machine`.
pub fn clear_machine_type_patch() -> Value {
    serde_json::json!({
        "spec": {
            "template": {
                "spec": {
                    "domain": {
                        "machine": null
                    }
                }
            }
        }
    })
}

pub fn to_virtual_machine(obj: DynamicObject, default_namespace: &str) -> VirtualMachine {
    let data = &obj.data;

    let machine_type = data
        .pointer(MACHINE_TYPE_POINTER)
        .and_then(Value::as_str)
        .map(str::to_string);

    // `spec.running` predates `spec.runStrategy` and is still accepted by KubeVirt.
    let run_strategy = match data.pointer("/spec/runStrategy").and_then(Value::as_str) {
        Some(strategy) => RunStrategy::from(strategy),
        None => match data.pointer("/spec/running").and_then(Value::as_bool) {
            Some(true) => RunStrategy::Always,
            _ => RunStrategy::Halted,
        },
    };

    let printable_status = data
        .pointer("/status/printableStatus")
        .and_then(Value::as_str)
        .map(PrintableStatus::from)
        .unwrap_or(PrintableStatus::Unknown);

    VirtualMachine {
        name: obj.metadata.name.unwrap_or_default(),
        namespace: obj
            .metadata
            .namespace
            .unwrap_or_else(|| default_namespace.to_string()),
        labels: obj.metadata.labels.unwrap_or_default(),
        machine_type,
        run_strategy,
        printable_status,
    }
}
