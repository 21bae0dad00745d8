#[macro_use]
extern crate tracing;
pub mod cli;
pub mod descriptor;
pub mod error;
pub mod hypervisor;
#[cfg(feature = "libvirt")]
pub mod libvirt;
pub mod pinning;
pub mod report;
pub mod resize;
pub mod settings;
pub mod structs;
#[cfg(test)]
mod vm_xml;
