#[cfg(test)]
mod tests;

use std::io::{self, BufRead, Write};

use block_dev::SECTOR_SIZE;
use ramdisk::request::Request;
use ramdisk::{CommandInterpreter, ServiceState};
use typed_bytesize::ByteSizeIec;

/// 管理通道：逐行读入命令，按到达顺序执行，把结果写回操作者
pub struct Console<'a> {
    service: &'a ServiceState,
    interpreter: Option<CommandInterpreter>,
}

impl<'a> Console<'a> {
    pub fn new(service: &'a ServiceState) -> Self {
        Self {
            service,
            interpreter: service.interpreter(),
        }
    }

    pub fn run(&self, input: impl BufRead, mut out: impl Write) -> io::Result<()> {
        for line in input.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let reply = self.handle(&line);
            writeln!(out, "{reply}")?;
        }
        out.flush()
    }

    pub fn handle(&self, line: &str) -> String {
        let tokens: Vec<_> = line.split_whitespace().collect();
        match tokens.as_slice() {
            ["status"] => self.status(),
            ["read", name, sector] => self.read(name, sector),
            ["write", name, sector, byte] => self.write(name, sector, byte),
            _ => {
                let Some(interpreter) = &self.interpreter else {
                    return "error: administrative channel is disabled in auto mode".to_owned();
                };
                if let ["commands"] = tokens.as_slice() {
                    return interpreter.commands().trim_end().to_owned();
                }
                match interpreter.execute(line.as_bytes()) {
                    Ok(outcome) => format!("ok: {outcome}"),
                    Err(err) => format!("error: {err}"),
                }
            }
        }
    }

    fn status(&self) -> String {
        self.service
            .registry()
            .list()
            .iter()
            .map(|info| {
                let bytes = info.capacity * SECTOR_SIZE as u64;
                format!(
                    "{} {} sectors ({}) {}",
                    info.name,
                    info.capacity,
                    ByteSizeIec(bytes),
                    info.mode
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// 读一个扇区，报告读到的字节数与首字节
    fn read(&self, name: &str, sector: &str) -> String {
        let Ok(sector) = sector.parse::<u64>() else {
            return "error: sector should be a non-negative integer".to_owned();
        };
        let mut buf = [0u8; SECTOR_SIZE];
        match self.service.submit(name, Request::read(sector, &mut buf)) {
            Ok(completion) if completion.is_ok() => format!(
                "ok: {} bytes read, first byte {:#04x}",
                completion.bytes, buf[0]
            ),
            Ok(completion) => format!("error: {}", completion.status),
            Err(err) => format!("error: {err}"),
        }
    }

    /// 用同一个字节填满一个扇区
    fn write(&self, name: &str, sector: &str, byte: &str) -> String {
        let (Ok(sector), Ok(byte)) = (sector.parse::<u64>(), parse_byte(byte)) else {
            return "error: expected `write <device_name> <sector> <byte>`".to_owned();
        };
        let buf = [byte; SECTOR_SIZE];
        match self.service.submit(name, Request::write(sector, &buf)) {
            Ok(completion) if completion.is_ok() => {
                format!("ok: {} bytes written", completion.bytes)
            }
            Ok(completion) => format!("error: {}", completion.status),
            Err(err) => format!("error: {err}"),
        }
    }
}

fn parse_byte(raw: &str) -> Result<u8, std::num::ParseIntError> {
    match raw.strip_prefix("0x") {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => raw.parse(),
    }
}
