//! # 设备层
//!
//! [`RamDisk`] 是由内存充当介质的块设备：名字与容量在创建时确定，
//! 模式只能由管理命令改变。
//!
//! 模式与后备存储放在同一把锁之下，传输时的模式检查与拷贝因此是原子的；
//! 设备被销毁后存储即被释放，残留的句柄再也读写不到任何字节。

use alloc::string::String;

use block_dev::{BlockDevice, Fault, IoctlError, SECTOR_SHIFT, Segment};
use derive_more::Display;
use spin::Mutex;

use crate::store::{AllocError, BackingStore};
use crate::transfer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum Mode {
    #[default]
    #[display(fmt = "read-write")]
    ReadWrite,
    #[display(fmt = "read-only")]
    ReadOnly,
}

#[derive(Debug)]
pub struct RamDisk {
    name: String,
    /// 以扇区计的容量
    capacity: u64,
    inner: Mutex<RamDiskInner>,
}

#[derive(Debug)]
pub(crate) struct RamDiskInner {
    pub(crate) mode: Mode,
    /// `None` 表示设备已被销毁
    pub(crate) store: Option<BackingStore>,
}

impl Mode {
    /// 管理命令中的编码：0 为读写，1 为只读
    pub fn from_raw(raw: i64) -> Option<Self> {
        match raw {
            0 => Some(Mode::ReadWrite),
            1 => Some(Mode::ReadOnly),
            _ => None,
        }
    }
}

impl RamDisk {
    /// 分配后备存储并以读写模式创建设备
    pub fn new(name: &str, capacity: u64) -> Result<Self, AllocError> {
        let capacity_bytes = capacity
            .checked_mul(1 << SECTOR_SHIFT)
            .ok_or(AllocError::TooLarge(u64::MAX))?;
        log::info!("(device) allocating {capacity_bytes} bytes for {name}");
        let store = BackingStore::new(capacity_bytes)?;

        Ok(Self {
            name: name.into(),
            capacity,
            inner: Mutex::new(RamDiskInner {
                mode: Mode::ReadWrite,
                store: Some(store),
            }),
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn capacity_sectors(&self) -> u64 {
        self.capacity
    }

    #[inline]
    pub fn capacity_bytes(&self) -> u64 {
        self.capacity << SECTOR_SHIFT
    }

    pub fn mode(&self) -> Mode {
        self.inner.lock().mode
    }

    pub(crate) fn set_mode(&self, mode: Mode) {
        self.inner.lock().mode = mode;
    }

    /// 释放后备存储；会等待正在进行的传输结束
    pub(crate) fn release_store(&self) {
        self.inner.lock().store = None;
    }

    pub fn is_released(&self) -> bool {
        self.inner.lock().store.is_none()
    }
}

impl BlockDevice for RamDisk {
    fn open(&self) {
        log::debug!("(device) {} opened", self.name);
    }

    fn release(&self) {
        log::debug!("(device) {} released", self.name);
    }

    fn ioctl(&self, cmd: u32, _arg: usize) -> Result<usize, IoctlError> {
        Err(IoctlError::Unsupported(cmd))
    }

    fn submit(&self, offset: u64, segment: Segment<'_>) -> Result<usize, Fault> {
        let mut inner = self.inner.lock();
        let RamDiskInner { mode, store } = &mut *inner;
        match store {
            Some(store) => transfer::transfer(store, *mode, offset, segment),
            None => {
                log::warn!("(device) {} used after destruction", self.name);
                Ok(0)
            }
        }
    }

    #[inline]
    fn capacity(&self) -> u64 {
        self.capacity
    }
}
