//! # 传输引擎
//!
//! 无状态：给定设备的存储与模式，以及一个段，完成一次有界拷贝。
//!
//! - 起点不小于容量时不传输任何字节，表示已到设备末尾；
//! - 终点越过容量时截断到容量为止；
//! - 只读设备拒绝写入，存储保持原样。
//!
//! 引擎不关心段的划分，多段请求由调用者逐段推进偏移量。

use block_dev::{Fault, Segment};

use crate::device::Mode;
use crate::store::BackingStore;

pub fn transfer(
    store: &mut BackingStore,
    mode: Mode,
    offset: u64,
    segment: Segment<'_>,
) -> Result<usize, Fault> {
    let range = store.clamp(offset, segment.len());
    let len = range.len();

    match segment {
        Segment::Write(_) if mode == Mode::ReadOnly => {
            log::warn!("(device) don't try to write to read only device");
            Err(Fault::WriteProtected)
        }
        Segment::Write(buf) => {
            if let Some(dst) = store.slice_mut(range) {
                dst.copy_from_slice(&buf[..len]);
            }
            Ok(len)
        }
        Segment::Read(buf) => {
            if let Some(src) = store.slice(range) {
                buf[..len].copy_from_slice(src);
            }
            Ok(len)
        }
    }
}
