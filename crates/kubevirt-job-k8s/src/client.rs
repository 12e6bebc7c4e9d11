use kube::Client;

use crate::config::KubeClientConfig;

pub async fn create_client(config: &KubeClientConfig) -> anyhow::Result<Client> {
    let client = if let Some(ref path) = config.kubeconfig {
        let kubeconfig = kube::config::Kubeconfig::read_from(path)?;
        let options = kube::config::KubeConfigOptions {
            context: config.context.clone(),
            ..Default::default()
        };
        let kube_config = kube::Config::from_custom_kubeconfig(kubeconfig, &options).await?;
        Client::try_from(kube_config)?
    } else if config.context.is_some() {
        let options = kube::config::KubeConfigOptions {
            context: config.context.clone(),
            ..Default::default()
        };
        Client::try_from(kube::Config::from_kubeconfig(&options).await?)?
    } else {
        Client::try_default().await?
    };
    Ok(client)
}
