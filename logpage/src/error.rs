use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// A read that would have left the bounds of the current window.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("truncated at offset {offset}: need {needed} bytes, {available} left")]
pub struct DecodeError {
    pub offset: usize,
    pub needed: usize,
    pub available: usize,
}

/// Structural problems inside a vendor page. These are rendered inline and
/// only stop the nested structure they were found in.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Anomaly {
    #[error("Ooops! Off the end of the list (subpage at offset {offset})")]
    SubpageOverrun { offset: usize },

    #[error("Bad length for self test report ({length:#x})")]
    SelfTestLength { length: u8 },

    #[error("Bad length for background scan header ({length:#x})")]
    ScanHeaderLength { length: u8 },

    #[error("Expected code 0, found code {code:#x}")]
    ScanHeaderCode { code: u16 },

    #[error("Bad length parameter {length:#x} for retirement {code:#x}")]
    RetirementLength { code: u16, length: u8 },

    #[error(transparent)]
    Truncated(#[from] DecodeError),
}

/// Failure reported by the transport collaborator.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("get log page request failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("get log page request returned error (status {status:#06x})")]
    Completion { status: u16 },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("log page {page} valid only at controller level")]
    ControllerScopedPage { page: u8 },

    #[error("controller does not support per namespace smart/health information")]
    NamespaceSmartUnsupported,

    #[error("log page {page:#04x}: {source}")]
    Transport {
        page: u8,
        #[source]
        source: TransportError,
    },

    #[error("log page {page:#04x}: {source}")]
    Decode {
        page: u8,
        #[source]
        source: DecodeError,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
