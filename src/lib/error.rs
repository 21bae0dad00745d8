use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResizeError {
    #[error("'{0}' does not match required format")]
    InvalidArgument(String),

    #[error("{0} is out of range")]
    OutOfRange(String),

    #[error("config error: {0}")]
    ConfigError(String),

    #[error("Failed to open connection to the hypervisor: {0}")]
    ConnectionError(String),

    #[error("Failed to find the VM {0}")]
    NotFound(String),

    #[error("Cannot change the number of Vqueues because the interface model is {0}, not virtio")]
    UnsupportedConfiguration(String),

    #[error("domain XML has no <{0}> element")]
    MissingElement(&'static str),

    #[error("XML error: {0}")]
    Xml(String),

    #[error("libvirt error: {0}")]
    Libvirt(String),

    #[error("Io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for ResizeError {
    fn from(e: config::ConfigError) -> Self {
        ResizeError::ConfigError(e.to_string())
    }
}

impl From<xmltree::ParseError> for ResizeError {
    fn from(e: xmltree::ParseError) -> Self {
        ResizeError::Xml(e.to_string())
    }
}

impl From<xmltree::Error> for ResizeError {
    fn from(e: xmltree::Error) -> Self {
        ResizeError::Xml(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ResizeError>;
