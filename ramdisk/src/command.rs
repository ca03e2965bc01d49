//! # 命令层
//!
//! 管理通道送来的每条命令都是三个以空白分隔的记号：
//!
//! ```text
//! <verb> <device_name> <integer_argument>
//! ```
//!
//! - `create dev 2048`：创建容量为 2048 个扇区的设备；
//! - `setmode dev 1`：0 为读写，1 为只读。
//!
//! 参数先于任何修改被校验，被拒绝的命令不会改变注册表，也不会让服务停下。

use alloc::string::{String, ToString};
use alloc::sync::Arc;
use core::str;

use derive_more::Display;

use crate::device::Mode;
use crate::registry::{CreateError, DeviceRegistry, SetModeError};

pub const COMMAND_LIST: &str = "Command list:
 create device: create device_name device_capacity (in sectors)
 set device mode: setmode device_name mode (0 - read-write, 1 - read-only)
";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Verb {
    #[display(fmt = "create")]
    Create,
    #[display(fmt = "setmode")]
    SetMode,
}

/// 解析后的命令，用后即弃
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command<'a> {
    pub verb: Verb,
    pub device: &'a str,
    pub argument: i64,
}

/// 命令成功后的确认
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum Outcome {
    #[display(fmt = "device {} created ({} sectors)", name, capacity)]
    Created { name: String, capacity: u64 },
    #[display(fmt = "device {} set to {}", name, mode)]
    ModeSet { name: String, mode: Mode },
}

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum CommandError {
    #[display(fmt = "couldn't recognise a command, expected `<verb> <device_name> <integer>`")]
    ParseError,
    #[display(fmt = "command is not recognised: {}, see the command list", _0)]
    Unrecognized(String),
    #[display(fmt = "invalid argument: {}", _0)]
    InvalidArgument(&'static str),
    #[display(fmt = "device name {} is already in use, choose another name", _0)]
    NameTaken(String),
    #[display(fmt = "device {} not found", _0)]
    NotFound(String),
    #[display(fmt = "not enough memory for device {}", _0)]
    OutOfMemory(String),
    #[display(fmt = "device {} could not be registered on the bus", _0)]
    RegistrationFailure(String),
}

impl<'a> Command<'a> {
    /// 解析一条命令；未知的动词在这里就被拒绝
    pub fn parse(raw: &'a [u8]) -> Result<Self, CommandError> {
        let line = str::from_utf8(raw).map_err(|_| CommandError::ParseError)?;
        let mut tokens = line.split_whitespace();
        let (Some(verb), Some(device), Some(argument), None) =
            (tokens.next(), tokens.next(), tokens.next(), tokens.next())
        else {
            return Err(CommandError::ParseError);
        };
        let argument: i64 = argument.parse().map_err(|_| CommandError::ParseError)?;

        let verb = match verb {
            "create" => Verb::Create,
            "setmode" => Verb::SetMode,
            other => return Err(CommandError::Unrecognized(other.into())),
        };

        Ok(Self {
            verb,
            device,
            argument,
        })
    }
}

#[derive(Debug, Clone)]
pub struct CommandInterpreter {
    registry: Arc<DeviceRegistry>,
}

impl CommandInterpreter {
    pub fn new(registry: Arc<DeviceRegistry>) -> Self {
        Self { registry }
    }

    pub fn execute(&self, raw: &[u8]) -> Result<Outcome, CommandError> {
        let result = Command::parse(raw).and_then(|cmd| {
            log::info!("(commands) command received: {}", cmd.verb);
            self.dispatch(cmd)
        });
        match &result {
            Ok(outcome) => log::info!("(commands) {outcome}"),
            Err(err) => log::warn!("(commands) {err}"),
        }
        result
    }

    /// 可用命令的说明
    pub fn commands(&self) -> &'static str {
        COMMAND_LIST
    }

    fn dispatch(&self, cmd: Command<'_>) -> Result<Outcome, CommandError> {
        match cmd.verb {
            Verb::Create => {
                let capacity = u64::try_from(cmd.argument)
                    .ok()
                    .filter(|&capacity| capacity > 0)
                    .ok_or(CommandError::InvalidArgument(
                        "device capacity (sectors count) should be a positive integer",
                    ))?;
                log::info!(
                    "(commands) starting device creation (name = {}, capacity = {capacity})",
                    cmd.device
                );
                self.registry
                    .create(cmd.device, capacity)
                    .map_err(|err| match err {
                        CreateError::InvalidCapacity => CommandError::InvalidArgument(
                            "device capacity (sectors count) should be a positive integer",
                        ),
                        CreateError::NameAlreadyExists(name) => CommandError::NameTaken(name),
                        CreateError::OutOfMemory(_) => {
                            CommandError::OutOfMemory(cmd.device.to_string())
                        }
                        CreateError::RegistrationFailure(_) => {
                            CommandError::RegistrationFailure(cmd.device.to_string())
                        }
                    })?;
                Ok(Outcome::Created {
                    name: cmd.device.into(),
                    capacity,
                })
            }
            Verb::SetMode => {
                let mode = Mode::from_raw(cmd.argument).ok_or(CommandError::InvalidArgument(
                    "mode should be 0 (read-write) or 1 (read-only)",
                ))?;
                self.registry
                    .set_mode(cmd.device, mode)
                    .map_err(|SetModeError::NotFound(name)| CommandError::NotFound(name))?;
                Ok(Outcome::ModeSet {
                    name: cmd.device.into(),
                    mode,
                })
            }
        }
    }
}
