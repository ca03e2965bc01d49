#![no_std]

extern crate alloc;

/* ramdisk 的整体架构，自上而下 */

// 服务层：启动与关闭，数据通路的入口
mod service;
pub use service::{Config, CreationMode, ServiceState, StartError, SubmitError};

// 命令层：解析管理命令并调度到设备注册表
mod command;
pub use command::{COMMAND_LIST, Command, CommandError, CommandInterpreter, Outcome, Verb};

// 注册表层：活动设备的集合
mod registry;
pub use registry::{CreateError, DestroyError, DeviceInfo, DeviceRegistry, SetModeError};

// 总线层：设备在宿主上的注册接口
mod bus;
pub use bus::{BusError, DeviceBus, SysBus};

// 请求层：把多段请求拆给传输引擎
pub mod request;

// 传输引擎：有界的内存拷贝
pub mod transfer;

// 设备层：名字、容量、模式与后备存储
mod device;
pub use device::{Mode, RamDisk};

// 后备存储层：定长字节缓冲区
mod store;
pub use store::{AllocError, BackingStore};

pub mod config;

pub use block_dev::{BlockDevice, Direction, Fault, SECTOR_SIZE, Segment};
