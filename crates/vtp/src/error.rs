use thiserror::Error;

/// Raised when a listener is configured with host/port lists that cannot be
/// broadcast against each other.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("host list ({hosts}) and port list ({ports}) are of unequal lengths")]
    UnequalLengths { hosts: usize, ports: usize },
    #[error("at least one endpoint must be configured")]
    Empty,
}

/// Errors from the frame codec. All are fatal to the current connection.
#[derive(Error, Debug)]
pub enum FrameError {
    #[error("connection closed by peer")]
    Closed,
    #[error("timed out waiting for {0} bytes")]
    Timeout(usize),
    #[error("declared frame length is zero")]
    EmptyFrame,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Errors from the packet classifier. Only a parse failure is an error;
/// missing role/ivorn/unknown root tags are represented as
/// [`crate::classify::PacketKind`] variants instead, since they are not
/// supposed to unwind the connection.
#[derive(Error, Debug)]
pub enum ClassifyError {
    #[error("failed to parse XML payload: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("failed to parse XML attribute: {0}")]
    Attr(#[from] quick_xml::events::attributes::AttrError),
}

/// Errors that terminate the connection loop. The supervisor treats
/// every variant identically: log and reconnect.
#[derive(Error, Debug)]
pub enum ConnectionError {
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error(transparent)]
    Classify(#[from] ClassifyError),
}
