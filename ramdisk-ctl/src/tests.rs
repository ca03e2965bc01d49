use std::io::Cursor;
use std::sync::Arc;

use ramdisk::{Config, CreationMode, ServiceState, StartError, SysBus};

use super::Console;

fn start(config: Config) -> Result<ServiceState, StartError> {
    let bus = Arc::new(SysBus::new(&config.bus_name));
    ServiceState::start(config, bus)
}

fn user_service() -> ServiceState {
    start(Config {
        creation: CreationMode::User,
        ..Config::default()
    })
    .unwrap()
}

#[test]
fn script_runs_in_arrival_order() {
    let service = user_service();
    let console = Console::new(&service);
    let script = "create alpha 200\n\
                  create alpha 50\n\
                  setmode alpha 1\n\
                  write alpha 0 0xab\n\
                  setmode alpha 0\n\
                  write alpha 0 0xab\n\
                  read alpha 0\n\
                  create beta -5\n";
    let mut out = Vec::new();
    console.run(Cursor::new(script), &mut out).unwrap();

    let out = String::from_utf8(out).unwrap();
    let replies: Vec<_> = out.lines().collect();
    assert_eq!(replies.len(), 8);
    assert!(replies[0].starts_with("ok: device alpha created"));
    assert!(replies[1].contains("choose another name"));
    assert!(replies[2].starts_with("ok: device alpha set to read-only"));
    assert_eq!(replies[3], "error: I/O error");
    assert!(replies[4].starts_with("ok:"));
    assert_eq!(replies[5], "ok: 512 bytes written");
    assert_eq!(replies[6], "ok: 512 bytes read, first byte 0xab");
    assert!(replies[7].starts_with("error: invalid argument"));
}

#[test]
fn blank_lines_are_skipped() {
    let service = user_service();
    let console = Console::new(&service);
    let mut out = Vec::new();
    console
        .run(Cursor::new("\n   \ncreate gamma 8\n\n"), &mut out)
        .unwrap();
    assert_eq!(String::from_utf8(out).unwrap().lines().count(), 1);
}

#[test]
fn unknown_verb_is_reported() {
    let service = user_service();
    let console = Console::new(&service);
    let reply = console.handle("destroy alpha 0");
    assert!(reply.starts_with("error: command is not recognised"));
    assert!(service.registry().is_empty());
}

#[test]
fn status_lists_devices() {
    let service = user_service();
    let console = Console::new(&service);
    console.handle("create alpha 2048");
    console.handle("setmode alpha 1");
    assert_eq!(console.handle("status").lines().count(), 1);
    assert!(console.handle("status").starts_with("alpha 2048 sectors"));
    assert!(console.handle("status").ends_with("read-only"));
}

#[test]
fn auto_mode_disables_administration() {
    let service = start(Config {
        default_capacity: 16,
        ..Config::default()
    })
    .unwrap();
    let console = Console::new(&service);
    assert!(console.handle("create alpha 8").contains("disabled"));
    assert!(console.handle("commands").contains("disabled"));
    assert!(service.registry().find("alpha").is_none());
    assert!(console.handle("status").starts_with("dev0 16 sectors"));
    assert_eq!(console.handle("read dev0 0"), "ok: 512 bytes read, first byte 0x00");
}

#[test]
fn commands_lists_both_verbs() {
    let service = user_service();
    let reply = Console::new(&service).handle("commands");
    assert!(reply.contains("create device_name"));
    assert!(reply.contains("setmode device_name"));
}

#[test]
fn io_against_missing_device() {
    let service = user_service();
    let reply = Console::new(&service).handle("read ghost 0");
    assert_eq!(reply, "error: no such device: ghost");
}
