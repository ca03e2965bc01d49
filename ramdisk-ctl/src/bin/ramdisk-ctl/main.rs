mod cli;

use std::fs::File;
use std::io::{self, BufReader};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use cli::Cli;
use ramdisk::{Config, CreationMode, ServiceState, SysBus};
use ramdisk_ctl::Console;

fn main() -> io::Result<ExitCode> {
    env_logger::init();
    let cli = Cli::parse();

    let config = Config {
        default_name: cli.name,
        default_capacity: cli.capacity,
        creation: if cli.user {
            CreationMode::User
        } else {
            CreationMode::Auto
        },
        ..Config::default()
    };

    let bus = Arc::new(SysBus::new(&config.bus_name));
    let service = match ServiceState::start(config, bus) {
        Ok(service) => service,
        Err(err) => {
            eprintln!("ramdisk: {err}");
            return Ok(ExitCode::FAILURE);
        }
    };

    let console = Console::new(&service);
    match cli.script {
        Some(path) => console.run(BufReader::new(File::open(path)?), io::stdout())?,
        None => console.run(io::stdin().lock(), io::stdout())?,
    }

    service.shutdown();
    Ok(ExitCode::SUCCESS)
}
