//! Kubernetes client module
//!
//! Handles connection to the Kubernetes API server and provides the
//! read-only listing capability the resource store is built from.

pub mod reader;
pub mod store;

use anyhow::Result;
use kube::config::KubeConfigOptions;
use kube::{Client, Config};

pub use reader::{ApiReader, ClusterReader, ListError};
pub use store::{FatalError, ResourceStore};

/// Initialize and return a Kubernetes client
///
/// With no context given, uses the default kubeconfig loading strategy:
/// 1. In-cluster config (if running in a pod)
/// 2. KUBECONFIG environment variable
/// 3. ~/.kube/config
///
/// A context name selects that context from the kubeconfig for this process
/// only; the user's current-context is never modified.
pub async fn create_client(context: Option<&str>) -> Result<Client> {
    let config = match context {
        Some(ctx) => {
            let options = KubeConfigOptions {
                context: Some(ctx.to_string()),
                ..Default::default()
            };
            Config::from_kubeconfig(&options).await?
        }
        None => Config::infer().await?,
    };

    let client = Client::try_from(config)?;
    Ok(client)
}
