use crate::error::{ResizeError, Result};
use crate::hypervisor::{Hypervisor, ManagedDomain};
use crate::structs::DomainStatus;
use virt::connect::Connect;
use virt::domain::Domain;

pub struct LibvirtHypervisor {
    conn: Connect,
}

pub struct LibvirtDomain {
    dom: Domain,
}

impl LibvirtHypervisor {
    pub fn connect(uri: &str) -> Result<LibvirtHypervisor> {
        debug!("About to connect to {uri}");
        match Connect::open(Some(uri)) {
            Ok(conn) => Ok(LibvirtHypervisor { conn }),
            Err(e) => Err(ResizeError::ConnectionError(format!("{uri}: {e}"))),
        }
    }
}

impl Hypervisor for LibvirtHypervisor {
    type Domain = LibvirtDomain;

    fn lookup_domain(&self, name: &str) -> Result<LibvirtDomain> {
        match Domain::lookup_by_name(&self.conn, name) {
            Ok(dom) => Ok(LibvirtDomain { dom }),
            Err(e) => {
                debug!("lookup of {name} failed: {e}");
                Err(ResizeError::NotFound(name.to_string()))
            }
        }
    }

    fn create_transient(&self, xml: &str) -> Result<()> {
        if let Err(e) = Domain::create_xml(&self.conn, xml, 0) {
            return Err(ResizeError::Libvirt(format!("Couldn't create VM: {e}")));
        }
        Ok(())
    }

    fn close(mut self) {
        if let Err(e) = self.conn.close() {
            error!("Failed to disconnect from libvirt: {e}");
        };
        debug!("Disconnected from libvirt");
    }
}

impl ManagedDomain for LibvirtDomain {
    fn name(&self) -> Result<String> {
        self.dom
            .get_name()
            .map_err(|e| ResizeError::Libvirt(format!("The domain had no name: {e}")))
    }

    fn id(&self) -> Option<u32> {
        self.dom.get_id()
    }

    fn xml_desc(&self) -> Result<String> {
        self.dom
            .get_xml_desc(0)
            .map_err(|e| ResizeError::Libvirt(format!("Couldn't read domain XML: {e}")))
    }

    fn info(&self) -> Result<DomainStatus> {
        let info = self
            .dom
            .get_info()
            .map_err(|e| ResizeError::Libvirt(format!("Couldn't read domain info: {e}")))?;
        Ok(DomainStatus {
            state: info.state as u32,
            max_mem: info.max_mem,
            memory: info.memory,
            nr_virt_cpu: info.nr_virt_cpu,
            cpu_time: info.cpu_time,
        })
    }

    fn destroy(&self) -> Result<()> {
        self.dom
            .destroy()
            .map_err(|e| ResizeError::Libvirt(format!("Couldn't stop VM: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use crate::structs::{VIR_DOMAIN_SHUTDOWN, VIR_DOMAIN_SHUTOFF};
    use virt::sys;

    #[test]
    fn state_constants_match_libvirt() {
        assert_eq!(sys::VIR_DOMAIN_SHUTDOWN as u32, VIR_DOMAIN_SHUTDOWN);
        assert_eq!(sys::VIR_DOMAIN_SHUTOFF as u32, VIR_DOMAIN_SHUTOFF);
    }
}
