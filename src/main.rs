#[macro_use]
extern crate tracing;

use anyhow::Result;
use clap::Parser;
use libvirt_resizer::cli::{Cli, Command};
use libvirt_resizer::libvirt::LibvirtHypervisor;
use libvirt_resizer::resize::resize;
use libvirt_resizer::settings::load_profile;
use libvirt_resizer::structs::{Outcome, ResizeOptions};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let _ = dotenv::dotenv();
    let cli = Cli::parse();

    // setup logging
    let level = if cli.command.common().verbose {
        "debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!(
        "libvirt_resizer {} {}",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH")
    );
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let common = cli.command.common();
    let request = match &cli.command {
        Command::File(args) => load_profile(&args.file, args.option, num_cpus::get())?,
        Command::Cmd(args) => args.patch_request(),
    };
    let opts = ResizeOptions {
        backup_dir: cli.backup_dir.clone(),
        dump: common.dump,
        restart: common.restart,
    };

    let hypervisor = LibvirtHypervisor::connect(&cli.connect)?;
    match resize(hypervisor, &common.vm, &request, &opts)? {
        Outcome::Dumped { xml, .. } => println!("{xml}"),
        Outcome::Applied { .. } => {
            info!("Successfully submitted libvirt domain {} for startup", common.vm)
        }
    }
    Ok(())
}
