// SPDX-License-Identifier: MIT

mod fuse;
mod inode;

use std::fs::OpenOptions;
use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Parser;
use ssposfs::sspos::*;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::fuse::MountOptions;

#[derive(Parser)]
#[command(name = "ssposfuse", version, about = "Mount an sspos FS image", long_about = None)]
struct Cli {
    /// Image file holding the volume
    image: PathBuf,

    /// Directory to mount the volume on
    mountpoint: PathBuf,

    /// Restrict access to the mounting user
    #[arg(long)]
    no_allow_other: bool,

    /// Unmount automatically when the process exits
    #[arg(long)]
    auto_unmount: bool,

    /// Verify the volume before serving it
    #[arg(long)]
    check: bool,

    /// Log engine activity (same as RUST_LOG=debug)
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Logs every finding above info; errors abort the mount.
fn verify<IO: BlockIO>(fs: &mut SsposFs<IO>) -> anyhow::Result<()> {
    let report = fs
        .checker()
        .check_all()
        .map_err(FsError::Checker)
        .context("volume check failed")?;
    for finding in report.at_least(Severity::Warn) {
        warn!(code = finding.code, "{}", finding.msg);
    }
    if let Some(msg) = report.first_error() {
        bail!("volume is inconsistent: {msg}");
    }

    let counts = fs
        .resolver()
        .parse_tree("/")
        .map_err(FsError::Resolver)
        .context("volume tree walk failed")?
        .counts();
    info!(
        dirs = counts.dirs,
        files = counts.files,
        bytes = counts.bytes,
        "sspos: volume check passed"
    );
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .open(&cli.image)
        .with_context(|| format!("failed to open image {}", cli.image.display()))?;
    let mut fs = SsposFs::mount(StdBlockIO::new(file))
        .with_context(|| format!("failed to mount sspos image {}", cli.image.display()))?;

    if cli.check {
        verify(&mut fs)?;
    }

    let stats = fs
        .statfs()
        .map_err(FsError::Ops)
        .context("failed to read volume usage")?;
    eprintln!(
        "Mounting sspos image (block_size={}, used {}/{} blocks) at {}",
        stats.block_size,
        stats.used_blocks(),
        stats.total_blocks,
        cli.mountpoint.display()
    );

    let options = MountOptions {
        allow_other: !cli.no_allow_other,
        auto_unmount: cli.auto_unmount,
    };
    fuse::mount(fs, &cli.mountpoint, &options)
        .with_context(|| format!("FUSE mount failed at {}", cli.mountpoint.display()))?;

    Ok(())
}
