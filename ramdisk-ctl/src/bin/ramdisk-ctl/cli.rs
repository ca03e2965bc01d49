use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
pub struct Cli {
    /// Accept only administrative device creation (no default device)
    #[arg(long, short)]
    pub user: bool,

    /// Name of the default device
    #[arg(long, short, default_value = ramdisk::config::DEFAULT_DEVICE_NAME)]
    pub name: String,

    /// Capacity of the default device, in sectors
    #[arg(long, short, default_value_t = ramdisk::config::DEFAULT_DEVICE_CAPACITY)]
    pub capacity: u64,

    /// Read commands from this file instead of stdin
    #[arg(long, short)]
    pub script: Option<PathBuf>,
}
