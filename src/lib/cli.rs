use crate::pinning::parse_pinning;
use crate::structs::{PatchRequest, DEFAULT_BACKUP_DIR, DEFAULT_VIRT_URI};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "libvirt_resizer",
    version,
    about = "Change the \"fixed\" resources assigned to a VM (cpu, mem, vqueues, cpu pinning) in a non-interactive manner, using transient domains"
)]
pub struct Cli {
    /// libvirt connection URI
    #[arg(long, global = true, env = "LIBVIRT_RESIZER_URI", default_value = DEFAULT_VIRT_URI)]
    pub connect: String,

    /// Directory the current domain XML is saved to before any change
    #[arg(long, global = true, env = "LIBVIRT_RESIZER_BACKUP_DIR", default_value = DEFAULT_BACKUP_DIR)]
    pub backup_dir: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

/// Input type: cmd or (config) file.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Config file
    File(FileArgs),
    /// Oneline config
    Cmd(CmdArgs),
}

#[derive(Args, Debug)]
pub struct FileArgs {
    /// Config file to read from
    #[arg(short, long)]
    pub file: PathBuf,

    /// Option defined in the config file
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..12))]
    pub option: u8,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Args, Debug)]
pub struct CmdArgs {
    /// Memory in MB.
    #[arg(short, long)]
    pub memory: Option<u64>,

    /// vCPU number.
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    pub cpu: Option<u32>,

    /// virtqueues number.
    #[arg(short, long)]
    pub queues: Option<u32>,

    /// CPU pinning in low-high format (e.g. "1-8"). The second value must be
    /// higher than the first one, but lower than the amount of cores in the
    /// physical host (check /proc/cpuinfo)
    #[arg(short, long, value_parser = parse_pinning)]
    pub pin: Option<String>,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Args, Debug)]
pub struct CommonArgs {
    /// Restart VM to apply changes.
    #[arg(short, long)]
    pub restart: bool,

    /// Show debug messages
    #[arg(short, long)]
    pub verbose: bool,

    /// Dump the new domain XML but do not apply it.
    #[arg(short, long)]
    pub dump: bool,

    /// VM name
    pub vm: String,
}

impl Command {
    pub fn common(&self) -> &CommonArgs {
        match self {
            Command::File(args) => &args.common,
            Command::Cmd(args) => &args.common,
        }
    }
}

impl CmdArgs {
    pub fn patch_request(&self) -> PatchRequest {
        PatchRequest {
            cpu: self.cpu,
            memory: self.memory,
            queues: self.queues,
            pin: self.pin.clone(),
        }
    }
}
