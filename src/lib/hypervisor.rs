use crate::error::Result;
use crate::structs::DomainStatus;

/// The handful of domain calls the resizer needs from a hypervisor.
pub trait ManagedDomain {
    fn name(&self) -> Result<String>;
    fn id(&self) -> Option<u32>;
    /// Raw XML descriptor of the domain as it is right now.
    fn xml_desc(&self) -> Result<String>;
    fn info(&self) -> Result<DomainStatus>;
    /// Hard stop, not a graceful shutdown.
    fn destroy(&self) -> Result<()>;
}

pub trait Hypervisor {
    type Domain: ManagedDomain;

    fn lookup_domain(&self, name: &str) -> Result<Self::Domain>;
    /// Starts a transient domain; nothing is written to the persistent definitions.
    fn create_transient(&self, xml: &str) -> Result<()>;
    fn close(self);
}
