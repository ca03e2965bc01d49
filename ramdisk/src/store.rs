//! # 后备存储层
//!
//! 每个设备独占一块定长的内存缓冲区；容量在创建后不可变。
//! 此层只负责分配与带边界检查的切片，不关心读写权限。

use alloc::collections::TryReserveError;
use alloc::vec::Vec;
use core::ops::Range;

use derive_more::{Display, From};

/// 内存中的后备存储
#[derive(Debug)]
pub struct BackingStore {
    bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Display, From)]
pub enum AllocError {
    /// 字节数超出了地址空间
    #[display(fmt = "capacity of {} bytes cannot be addressed", _0)]
    #[from(ignore)]
    TooLarge(u64),
    #[display(fmt = "out of memory")]
    Exhausted(TryReserveError),
}

impl BackingStore {
    /// 分配 `capacity_bytes` 个清零的字节；失败时不会残留任何已分配的内存。
    pub fn new(capacity_bytes: u64) -> Result<Self, AllocError> {
        let len = usize::try_from(capacity_bytes)
            .ok()
            .filter(|&len| len <= isize::MAX as usize)
            .ok_or(AllocError::TooLarge(capacity_bytes))?;

        let mut bytes = Vec::new();
        bytes.try_reserve_exact(len)?;
        bytes.resize(len, 0);

        Ok(Self { bytes })
    }

    #[inline]
    pub fn capacity_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// 把 `[offset, offset + len)` 截断到容量之内。
    ///
    /// 起点越界时返回空区间。
    pub fn clamp(&self, offset: u64, len: usize) -> Range<usize> {
        let capacity = self.bytes.len();
        let start = match usize::try_from(offset) {
            Ok(start) if start < capacity => start,
            _ => return capacity..capacity,
        };
        start..start + len.min(capacity - start)
    }

    pub fn slice(&self, range: Range<usize>) -> Option<&[u8]> {
        self.bytes.get(range)
    }

    pub fn slice_mut(&mut self, range: Range<usize>) -> Option<&mut [u8]> {
        self.bytes.get_mut(range)
    }
}
