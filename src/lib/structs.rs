use serde::Deserialize;
use std::path::PathBuf;

pub const DEFAULT_VIRT_URI: &str = "qemu:///system";
pub const DEFAULT_BACKUP_DIR: &str = "./backup";

// virDomainState values, as laid down by the libvirt ABI
pub const VIR_DOMAIN_SHUTDOWN: u32 = 4;
pub const VIR_DOMAIN_SHUTOFF: u32 = 5;

/// The fields to change on a domain. Anything left as `None` is not touched.
#[derive(Deserialize, Default, Debug, Clone, PartialEq, Eq)]
pub struct PatchRequest {
    /// vCPU count
    #[serde(default)]
    pub cpu: Option<u32>,
    /// memory in MB, converted to KiB when written to the descriptor
    #[serde(default)]
    pub memory: Option<u64>,
    /// virtqueue count, virtio interfaces only
    #[serde(default)]
    pub queues: Option<u32>,
    /// already validated `low-high` range
    #[serde(default)]
    pub pin: Option<String>,
}

impl PatchRequest {
    pub fn is_empty(&self) -> bool {
        self.cpu.is_none() && self.memory.is_none() && self.queues.is_none() && self.pin.is_none()
    }
}

/// Numeric runtime info of a domain, as reported by `virDomainGetInfo`.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomainStatus {
    pub state: u32,
    pub max_mem: u64,
    pub memory: u64,
    pub nr_virt_cpu: u32,
    pub cpu_time: u64,
}

impl DomainStatus {
    pub fn is_stopped(&self) -> bool {
        self.state == VIR_DOMAIN_SHUTDOWN || self.state == VIR_DOMAIN_SHUTOFF
    }
}

#[derive(Debug, Clone)]
pub struct ResizeOptions {
    pub backup_dir: PathBuf,
    pub dump: bool,
    pub restart: bool,
}

impl Default for ResizeOptions {
    fn default() -> Self {
        ResizeOptions {
            backup_dir: PathBuf::from(DEFAULT_BACKUP_DIR),
            dump: false,
            restart: false,
        }
    }
}

/// What a run ended up doing with the patched descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Dumped { xml: String, backup: PathBuf },
    Applied { backup: PathBuf, destroyed: bool },
}
