use crate::descriptor::{current_model, current_pinning, current_queues, parse_descriptor, VIRTIO_MODEL};
use crate::error::Result;
use crate::hypervisor::ManagedDomain;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// What was read from the domain before any change was made.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub name: String,
    pub raw_xml: String,
    pub backup: PathBuf,
}

/// Logs the current state of `dom` and saves its descriptor under `backup_dir`.
pub fn report_and_backup<D: ManagedDomain>(dom: &D, backup_dir: &Path) -> Result<Snapshot> {
    let name = dom.name()?;
    match dom.id() {
        Some(id) => debug!("- VM {name} (id {id}) current status"),
        None => debug!("- VM {name} (inactive) current status"),
    }
    let infos = dom.info()?;
    debug!("  State = {}", infos.state);
    debug!("  Max Memory = {}", infos.max_mem);
    debug!("  Memory used = {}", infos.memory);
    debug!("  Number of virt CPUs = {}", infos.nr_virt_cpu);
    debug!("  CPU Time (in ns) = {}", infos.cpu_time);

    let raw_xml = dom.xml_desc()?;
    match parse_descriptor(&raw_xml) {
        Ok(tree) => {
            debug!(
                "  CPU pinning: {}",
                current_pinning(&tree).unwrap_or_else(|| "none".to_string())
            );
            if current_model(&tree).as_deref() == Some(VIRTIO_MODEL) {
                debug!("  Vqueues: {}", current_queues(&tree));
            }
        }
        Err(e) => warn!("  Couldn't inspect current XML: {e}"),
    }

    let backup = write_backup(backup_dir, &name, &raw_xml, chrono::Utc::now().timestamp())?;
    info!("- Saved {} current XML to {}", name, backup.display());
    Ok(Snapshot {
        name,
        raw_xml,
        backup,
    })
}

/// Writes `raw_xml` to `<dir>/<name>_<timestamp>.xml`, never replacing an existing file.
pub fn write_backup(dir: &Path, name: &str, raw_xml: &str, timestamp: i64) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let mut suffix = 0;
    loop {
        let file_name = match suffix {
            0 => format!("{name}_{timestamp}.xml"),
            n => format!("{name}_{timestamp}_{n}.xml"),
        };
        let path = dir.join(file_name);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut f) => {
                f.write_all(raw_xml.as_bytes())?;
                return Ok(path);
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => suffix += 1,
            Err(e) => return Err(e.into()),
        }
    }
}
