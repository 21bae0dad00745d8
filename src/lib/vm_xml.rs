pub(crate) const DOMAIN_XML: &str = include_str!("../../tests/fixtures/domain.xml");

pub(crate) const E1000_DOMAIN_XML: &str = include_str!("../../tests/fixtures/domain_e1000.xml");

// virtio interface without a <driver>, vcpu without a cpuset
pub(crate) const NO_DRIVER_DOMAIN_XML: &str =
    include_str!("../../tests/fixtures/domain_no_driver.xml");
