//! # 块设备接口层
//!
//! 块设备以**扇区**为单位编址；[`BlockDevice`] 是宿主块层对一个块设备的全部要求：
//! 打开、释放、控制命令，以及提交一段连续的数据传输。
//! 实现了此特质的类型称为**块设备驱动**。

#![no_std]

use core::any::Any;

use derive_more::Display;

/// 扇区大小，容量与偏移量均以此为单位
pub const SECTOR_SIZE: usize = 512;
/// `SECTOR_SIZE` 的位数
pub const SECTOR_SHIFT: u32 = 9;

/// 块设备驱动特质
pub trait BlockDevice: Send + Sync + Any {
    fn open(&self);

    fn release(&self);

    fn ioctl(&self, cmd: u32, arg: usize) -> Result<usize, IoctlError>;

    /// 从字节偏移 `offset` 处传输一个段，返回实际传输的字节数。
    ///
    /// 返回 `Ok(0)` 表示已越过设备末尾，调用者应停止提交后续的段。
    fn submit(&self, offset: u64, segment: Segment<'_>) -> Result<usize, Fault>;

    /// 以扇区计的容量
    fn capacity(&self) -> u64;
}

/// 一次传输中的一个连续段
#[derive(Debug)]
pub enum Segment<'a> {
    Read(&'a mut [u8]),
    Write(&'a [u8]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Direction {
    #[display(fmt = "read")]
    Read,
    #[display(fmt = "write")]
    Write,
}

impl Segment<'_> {
    #[inline]
    pub fn direction(&self) -> Direction {
        match self {
            Segment::Read(_) => Direction::Read,
            Segment::Write(_) => Direction::Write,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        match self {
            Segment::Read(buf) => buf.len(),
            Segment::Write(buf) => buf.len(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 数据通路上唯一的故障：越界不是故障，而是被截断
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Fault {
    #[display(fmt = "write attempted on a read-only device")]
    WriteProtected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum IoctlError {
    /// Inappropriate ioctl for device
    #[display(fmt = "ioctl command {:#x} is not supported", _0)]
    Unsupported(u32),
}
