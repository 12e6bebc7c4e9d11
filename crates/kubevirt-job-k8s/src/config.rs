use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KubeClientConfig {
    /// Path to kubeconfig. If None, uses in-cluster config or default.
    #[serde(default)]
    pub kubeconfig: Option<PathBuf>,
    /// Kubeconfig context to use instead of the current one.
    #[serde(default)]
    pub context: Option<String>,
}
