use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;

use kubevirt_job_core::config::UpdaterConfig;
use kubevirt_job_core::env::ProcessEnv;
use kubevirt_job_core::event::TracingEventSink;
use kubevirt_job_core::updater::MachineTypeUpdater;
use kubevirt_job_k8s::api::KubeVirtApi;
use kubevirt_job_k8s::client::create_client;
use kubevirt_job_k8s::config::KubeClientConfig;

#[derive(Args, Default)]
pub struct RunArgs {
    /// Path to a kubeconfig file. Defaults to in-cluster config or $KUBECONFIG
    #[arg(long)]
    pub kubeconfig: Option<PathBuf>,
    /// Kubeconfig context to use
    #[arg(long)]
    pub context: Option<String>,
}

pub async fn execute(args: RunArgs) -> anyhow::Result<()> {
    let config = UpdaterConfig::from_env(&ProcessEnv)?;

    tracing::info!(
        machine_type = %config.machine_type_glob(),
        namespace = %config.namespace(),
        selector = %config.label_selector(),
        restart_required = config.restart_required(),
        "Loaded configuration"
    );

    let client = create_client(&KubeClientConfig {
        kubeconfig: args.kubeconfig,
        context: args.context,
    })
    .await?;

    let mut updater = MachineTypeUpdater::with_config(config, Arc::new(KubeVirtApi::new(client)));
    updater.add_event_sink(Arc::new(TracingEventSink));
    updater.run().await?;

    Ok(())
}
