//! Entry point of the podfs filesystem.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use fuser::MountOption;
use tracing_subscriber::EnvFilter;

use podfs_client::HttpPodClient;
use podfs_common::PodUri;
use podfs_vfs::{PodFs, PodSession, VfsOptions};

mod config;
use config::Config;

/// Mount a pod as a local filesystem.
#[derive(Debug, Parser)]
#[command(name = "podfs", version, about)]
struct Args {
    /// Config file
    config: PathBuf,
    /// Where to mount the file system
    mountpoint: PathBuf,
    /// Enable debugging output
    #[arg(long)]
    debug: bool,
    /// Enable FUSE debugging output
    #[arg(long)]
    debug_fuse: bool,
}

fn init_logging(debug: bool) {
    let default_filter: &str = if debug { "debug" } else { "info" };
    let filter: EnvFilter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> Result<()> {
    let args: Args = Args::parse();
    init_logging(args.debug);

    let config: Config = Config::load(&args.config)?;
    let root: PodUri = PodUri::parse(&config.pod).context("invalid pod root URI")?;

    let runtime: tokio::runtime::Runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("starting async runtime")?;

    let client: HttpPodClient = HttpPodClient::new().context("building HTTP client")?;
    if let (Some(username), Some(password)) = (&config.username, &config.password) {
        runtime
            .block_on(client.login(&config.idp, username, password))
            .context("logging in")?;
    }

    let session = runtime
        .block_on(PodSession::new(client, root, VfsOptions::default()))
        .context("priming the pod root")?;
    let fs = PodFs::new(Arc::new(session), runtime.handle().clone());

    let mut options: Vec<MountOption> = vec![
        MountOption::FSName("podfs".to_string()),
        MountOption::AutoUnmount,
    ];
    if args.debug_fuse {
        options.push(MountOption::CUSTOM("debug".to_string()));
    }

    tracing::info!(
        pod = %config.pod,
        mountpoint = %args.mountpoint.display(),
        "mounting"
    );
    // blocks until unmounted; a fatal error unmounts before surfacing
    fuser::mount2(fs, &args.mountpoint, &options).context("mount session failed")?;
    tracing::info!("unmounted");
    Ok(())
}
