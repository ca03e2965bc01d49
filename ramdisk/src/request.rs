//! # 请求层
//!
//! 宿主块层送来的一个请求由起始扇区和若干连续的段组成，
//! 这里逐段交给设备传输，累计字节数，并把故障映射为请求的完成状态。

use alloc::vec::Vec;

use block_dev::{BlockDevice, Fault, SECTOR_SHIFT, Segment};
use derive_more::Display;

/// 一个块 I/O 请求，用后即弃
#[derive(Debug)]
pub struct Request<'a> {
    /// 起始扇区
    pub sector: u64,
    pub segments: Vec<Segment<'a>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum IoStatus {
    #[display(fmt = "ok")]
    Ok,
    #[display(fmt = "I/O error")]
    IoErr,
}

/// 请求的完成情况
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    pub status: IoStatus,
    /// 故障发生之前已传输的字节数
    pub bytes: usize,
}

impl<'a> Request<'a> {
    pub fn new(sector: u64) -> Self {
        Self {
            sector,
            segments: Vec::new(),
        }
    }

    pub fn read(sector: u64, buf: &'a mut [u8]) -> Self {
        Self::new(sector).segment(Segment::Read(buf))
    }

    pub fn write(sector: u64, buf: &'a [u8]) -> Self {
        Self::new(sector).segment(Segment::Write(buf))
    }

    pub fn segment(mut self, segment: Segment<'a>) -> Self {
        self.segments.push(segment);
        self
    }
}

impl Completion {
    #[inline]
    pub fn is_ok(&self) -> bool {
        self.status == IoStatus::Ok
    }
}

/// 服务一个请求
pub fn queue_rq(dev: &dyn BlockDevice, rq: Request<'_>) -> Completion {
    let mut pos = rq.sector.saturating_mul(1 << SECTOR_SHIFT);
    let mut bytes = 0;

    for segment in rq.segments {
        let requested = segment.len();
        log::trace!("(request) {} {requested} bytes at {pos}", segment.direction());
        match dev.submit(pos, segment) {
            Ok(len) => {
                pos = pos.saturating_add(len as u64);
                bytes += len;
                // 到达设备末尾，余下的段不再提交
                if len == 0 && requested != 0 {
                    break;
                }
            }
            Err(Fault::WriteProtected) => {
                return Completion {
                    status: IoStatus::IoErr,
                    bytes,
                };
            }
        }
    }

    Completion {
        status: IoStatus::Ok,
        bytes,
    }
}
