//! kexport - export unmanaged Kubernetes resources as clean YAML
//!
//! Reads every relevant resource type of a namespace once, classifies each
//! object as managed or unmanaged, expands each unmanaged workload into its
//! group of related resources, and writes the groups as portable manifests.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use kexport::cli::init_logging;
use kexport::config::ConfigLoader;
use kexport::export::{self, ExportOptions, writer};
use kexport::kube::{ApiReader, ResourceStore, create_client};

/// Export unmanaged Kubernetes resources from a namespace, grouped by workload
#[derive(Parser, Debug)]
#[command(name = "kexport")]
#[command(about = "Export unmanaged Kubernetes resources from a namespace, grouped by workload", long_about = None)]
struct Args {
    /// Namespace to export
    namespace: String,

    /// Kubeconfig context to use for this run
    #[arg(long)]
    context: Option<String>,

    /// Build groups and print the summary without writing any files
    #[arg(long)]
    dry_run: bool,

    /// Number of workloads processed concurrently
    #[arg(long)]
    workers: Option<usize>,

    /// Export one file per resource type instead of grouping by workload
    #[arg(long)]
    flat: bool,

    /// Export directory (defaults to a timestamped directory named after the namespace)
    #[arg(long, short = 'o')]
    output: Option<std::path::PathBuf>,

    /// Run helmify on each workload directory after export
    #[arg(long)]
    helmify: bool,

    /// Enable debug logging
    #[arg(long, short = 'd')]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug);

    let config = ConfigLoader::load().unwrap_or_else(|e| {
        tracing::warn!("ignoring config file: {}", e);
        kexport::config::Config::default()
    });

    let opts = ExportOptions {
        dry_run: args.dry_run,
        flat: args.flat,
        workers: args.workers.unwrap_or(config.workers),
        helmify: args.helmify || config.helmify,
        output: args
            .output
            .or(config.output_dir)
            .unwrap_or_else(|| writer::default_export_root(&args.namespace, args.flat)),
    };

    tracing::debug!("connecting to cluster");
    let client = create_client(args.context.as_deref())
        .await
        .context("failed to initialize Kubernetes client")?;
    let reader = ApiReader::new(client);

    tracing::info!("reading resources in namespace {}", args.namespace);
    let store = Arc::new(ResourceStore::load(&reader, &args.namespace).await?);

    if opts.flat {
        let report = export::export_flat(&store, &opts)?;
        export::print_flat_summary(&report, &store, &opts);
    } else {
        let summary = export::export_grouped(Arc::clone(&store), &opts).await;
        export::print_grouped_summary(&summary, &store, &opts);
    }

    Ok(())
}
