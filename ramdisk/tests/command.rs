use std::sync::Arc;

use block_dev::Segment;
use ramdisk::request::{IoStatus, Request, queue_rq};
use ramdisk::{
    Command, CommandError, CommandInterpreter, DeviceRegistry, Mode, Outcome, SysBus, Verb,
};

fn interpreter() -> (Arc<DeviceRegistry>, CommandInterpreter) {
    let bus = Arc::new(SysBus::new("mybus"));
    bus.register_driver("mydriver").unwrap();
    let registry = Arc::new(DeviceRegistry::new(bus));
    let interpreter = CommandInterpreter::new(Arc::clone(&registry));
    (registry, interpreter)
}

#[test]
fn parse_three_tokens() {
    let cmd = Command::parse(b"  create   alpha\t200\n").unwrap();
    assert_eq!(
        cmd,
        Command {
            verb: Verb::Create,
            device: "alpha",
            argument: 200,
        }
    );
    assert_eq!(Command::parse(b"setmode beta -1").unwrap().argument, -1);
}

#[test]
fn malformed_commands() {
    for raw in [
        &b""[..],
        b"create",
        b"create alpha",
        b"create alpha 200 extra",
        b"create alpha lots",
        b"create alpha 1.5",
        b"create alpha 99999999999999999999999",
        b"\xff\xfe alpha 1",
    ] {
        assert_eq!(Command::parse(raw), Err(CommandError::ParseError), "{raw:?}");
    }
}

#[test]
fn unknown_verb() {
    let (registry, interpreter) = interpreter();
    assert_eq!(
        interpreter.execute(b"remove alpha 1"),
        Err(CommandError::Unrecognized("remove".into()))
    );
    // 动词按整词比较
    assert!(matches!(
        interpreter.execute(b"createx alpha 1"),
        Err(CommandError::Unrecognized(_))
    ));
    assert!(registry.is_empty());
}

#[test]
fn create_needs_positive_capacity() {
    let (registry, interpreter) = interpreter();
    for raw in [&b"create beta -5"[..], b"create beta 0"] {
        assert!(matches!(
            interpreter.execute(raw),
            Err(CommandError::InvalidArgument(_))
        ));
    }
    assert!(registry.find("beta").is_none());
}

#[test]
fn duplicate_create_asks_for_another_name() {
    let (_, interpreter) = interpreter();
    interpreter.execute(b"create alpha 200").unwrap();
    let err = interpreter.execute(b"create alpha 50").unwrap_err();
    assert_eq!(err, CommandError::NameTaken("alpha".into()));
    assert!(err.to_string().contains("choose another name"));
}

#[test]
fn setmode_arguments() {
    let (registry, interpreter) = interpreter();
    interpreter.execute(b"create alpha 8").unwrap();

    for raw in [&b"setmode alpha 2"[..], b"setmode alpha -1"] {
        assert!(matches!(
            interpreter.execute(raw),
            Err(CommandError::InvalidArgument(_))
        ));
    }
    assert_eq!(registry.find("alpha").unwrap().mode(), Mode::ReadWrite);

    let err = interpreter.execute(b"setmode ghost 1").unwrap_err();
    assert_eq!(err, CommandError::NotFound("ghost".into()));
    assert_eq!(err.to_string(), "device ghost not found");
}

#[test]
fn scenario() {
    let (registry, interpreter) = interpreter();

    assert_eq!(
        interpreter.execute(b"create alpha 200"),
        Ok(Outcome::Created {
            name: "alpha".into(),
            capacity: 200,
        })
    );
    assert_eq!(
        interpreter.execute(b"create alpha 50"),
        Err(CommandError::NameTaken("alpha".into()))
    );
    assert_eq!(
        interpreter.execute(b"setmode alpha 1"),
        Ok(Outcome::ModeSet {
            name: "alpha".into(),
            mode: Mode::ReadOnly,
        })
    );

    let dev = registry.find("alpha").unwrap();
    let payload = [0xabu8; 512];
    let completion = queue_rq(&*dev, Request::write(0, &payload));
    assert_eq!(completion.status, IoStatus::IoErr);
    let mut back = [0xffu8; 512];
    queue_rq(&*dev, Request::read(0, &mut back));
    assert_eq!(back, [0u8; 512]);

    interpreter.execute(b"setmode alpha 0").unwrap();
    let completion = queue_rq(&*dev, Request::write(0, &payload));
    assert!(completion.is_ok());
    assert_eq!(completion.bytes, 512);

    let mut back = [0u8; 512];
    let completion = queue_rq(&*dev, Request::new(0).segment(Segment::Read(&mut back)));
    assert_eq!(completion.bytes, 512);
    assert_eq!(back, payload);

    assert!(matches!(
        interpreter.execute(b"create beta -5"),
        Err(CommandError::InvalidArgument(_))
    ));
    assert!(registry.find("beta").is_none());
    assert_eq!(registry.len(), 1);
}

#[test]
fn commands_describe_both_verbs() {
    let (_, interpreter) = interpreter();
    let list = interpreter.commands();
    assert!(list.starts_with("Command list:"));
    assert!(list.contains("create device_name"));
    assert!(list.contains("setmode device_name"));
}

#[test]
fn huge_capacity_is_out_of_memory() {
    let (registry, interpreter) = interpreter();
    let err = interpreter
        .execute(b"create huge 9223372036854775807")
        .unwrap_err();
    assert_eq!(err, CommandError::OutOfMemory("huge".into()));
    assert!(err.to_string().contains("not enough memory"));
    assert!(registry.find("huge").is_none());
    assert!(registry.is_empty());

    // 失败之后通道照常工作
    interpreter.execute(b"create huge 8").unwrap();
}

#[test]
fn bus_without_driver_fails_registration() {
    let bus = Arc::new(SysBus::new("mybus"));
    let registry = Arc::new(DeviceRegistry::new(bus.clone()));
    let interpreter = CommandInterpreter::new(Arc::clone(&registry));

    let err = interpreter.execute(b"create alpha 8").unwrap_err();
    assert_eq!(err, CommandError::RegistrationFailure("alpha".into()));
    assert!(err.to_string().contains("could not be registered"));
    assert!(registry.find("alpha").is_none());
    assert!(bus.registered().is_empty());
}
