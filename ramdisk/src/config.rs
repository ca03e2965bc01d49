//! Constants used in ramdisk

pub use block_dev::{SECTOR_SHIFT, SECTOR_SIZE};

/// 自动模式下默认设备的名字
pub const DEFAULT_DEVICE_NAME: &str = "dev0";
/// 默认设备的容量（扇区数），100 MiB
pub const DEFAULT_DEVICE_CAPACITY: u64 = 2048 * 100;

pub const BUS_NAME: &str = "mybus";
pub const DRIVER_NAME: &str = "mydriver";
