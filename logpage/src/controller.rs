//! Retrieval of a log page from a controller and hand-off to its decoder.

use crate::dispatch::{self, page, Decoder, GLOBAL_NAMESPACE};
use crate::error::{Error, Result, TransportError};
use log::{debug, info};
use std::io::Write;

/// Whatever can answer a Get Log Page request: a device, a capture file, a
/// test double.
pub trait Controller {
    /// Issues one Get Log Page request and returns exactly `size` bytes.
    fn read_log_page(&mut self, page: u8, nsid: u32, size: usize)
        -> std::result::Result<Vec<u8>, TransportError>;

    /// Whether the health page may be requested per namespace.
    fn namespace_smart_supported(&self) -> bool;

    /// Zero based number of error information entries the controller keeps.
    fn max_error_log_entries(&self) -> u8;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogPageRequest {
    pub page: u8,
    pub namespace: Option<u32>,
    /// Dump the page as hex instead of decoding it.
    pub hex: bool,
}

impl LogPageRequest {
    pub fn new(page: u8) -> Self {
        LogPageRequest {
            page,
            namespace: None,
            hex: false,
        }
    }

    /// Namespace scope is only meaningful for the health page, and only on
    /// controllers that keep health data per namespace.
    pub fn validate(&self, controller: &impl Controller) -> Result<()> {
        if self.namespace.is_none() {
            return Ok(());
        }

        if self.page != page::HEALTH_INFORMATION {
            return Err(Error::ControllerScopedPage { page: self.page });
        }

        if !controller.namespace_smart_supported() {
            return Err(Error::NamespaceSmartUnsupported);
        }

        Ok(())
    }

    pub fn nsid(&self) -> u32 {
        self.namespace.unwrap_or(GLOBAL_NAMESPACE)
    }
}

/// Fetches the requested page and writes its decoded form to `writer`.
pub fn logpage(
    controller: &mut impl Controller,
    request: &LogPageRequest,
    writer: &mut impl Write,
) -> Result<()> {
    request.validate(controller)?;

    let (decoder, mut size) = dispatch::dispatch(request.page, request.hex);
    if request.page == page::ERROR_INFORMATION {
        size = dispatch::error_log_size(controller.max_error_log_entries());
    }

    info!(
        "get log page {:#04x} nsid {:#x}, {} bytes",
        request.page,
        request.nsid(),
        size
    );

    let buf = controller
        .read_log_page(request.page, request.nsid(), size)
        .map_err(|source| Error::Transport {
            page: request.page,
            source,
        })?;
    debug!("controller returned {} bytes", buf.len());

    decode(decoder, request.page, &buf, writer)
}

fn decode(decoder: Decoder, page: u8, buf: &[u8], writer: &mut impl Write) -> Result<()> {
    decoder.decode(page, buf, writer)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct MockController {
        page: Vec<u8>,
        ns_smart: bool,
        elpe: u8,
        fail: bool,
        requests: Vec<(u8, u32, usize)>,
    }

    impl Controller for MockController {
        fn read_log_page(
            &mut self,
            page: u8,
            nsid: u32,
            size: usize,
        ) -> std::result::Result<Vec<u8>, TransportError> {
            self.requests.push((page, nsid, size));
            if self.fail {
                return Err(TransportError::Completion { status: 0x4002 });
            }
            let mut buf = self.page.clone();
            buf.resize(size, 0);
            Ok(buf)
        }

        fn namespace_smart_supported(&self) -> bool {
            self.ns_smart
        }

        fn max_error_log_entries(&self) -> u8 {
            self.elpe
        }
    }

    fn run(controller: &mut MockController, request: LogPageRequest) -> Result<String> {
        let mut out = vec![];
        logpage(controller, &request, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn controller_scope_uses_global_namespace() {
        let mut ctrl = MockController::default();
        let out = run(&mut ctrl, LogPageRequest::new(0x02)).unwrap();

        assert_eq!(ctrl.requests, vec![(0x02, GLOBAL_NAMESPACE, 512)]);
        assert!(out.starts_with("SMART/Health Information Log\n"));
    }

    #[test]
    fn namespace_rejected_for_other_pages() {
        let mut ctrl = MockController {
            ns_smart: true,
            ..Default::default()
        };
        let request = LogPageRequest {
            namespace: Some(1),
            ..LogPageRequest::new(0x03)
        };

        let err = run(&mut ctrl, request).unwrap_err();
        assert!(matches!(err, Error::ControllerScopedPage { page: 3 }));
        assert_eq!(err.to_string(), "log page 3 valid only at controller level");
        assert!(ctrl.requests.is_empty());
    }

    #[test]
    fn namespace_health_needs_support() {
        let request = LogPageRequest {
            namespace: Some(1),
            ..LogPageRequest::new(0x02)
        };

        let mut ctrl = MockController::default();
        let err = run(&mut ctrl, request).unwrap_err();
        assert!(matches!(err, Error::NamespaceSmartUnsupported));
        assert!(ctrl.requests.is_empty());

        let mut ctrl = MockController {
            ns_smart: true,
            ..Default::default()
        };
        run(&mut ctrl, request).unwrap();
        assert_eq!(ctrl.requests, vec![(0x02, 1, 512)]);
    }

    #[test]
    fn error_log_sized_from_controller() {
        let mut ctrl = MockController {
            elpe: 3,
            ..Default::default()
        };
        let out = run(&mut ctrl, LogPageRequest::new(0x01)).unwrap();
        assert_eq!(ctrl.requests, vec![(0x01, GLOBAL_NAMESPACE, 256)]);
        assert!(out.contains("No error entries found"));

        let mut ctrl = MockController {
            elpe: 3,
            ..Default::default()
        };
        let request = LogPageRequest {
            hex: true,
            ..LogPageRequest::new(0x01)
        };
        let out = run(&mut ctrl, request).unwrap();
        assert_eq!(ctrl.requests[0].2, 256);
        assert!(out.starts_with("Error Information (page 0x01), 256 bytes\n"));
    }

    #[test]
    fn transport_error_is_fatal() {
        let mut ctrl = MockController {
            fail: true,
            ..Default::default()
        };
        let err = run(&mut ctrl, LogPageRequest::new(0xC1)).unwrap_err();
        assert!(matches!(
            err,
            Error::Transport {
                page: 0xC1,
                source: TransportError::Completion { status: 0x4002 }
            }
        ));
    }

    #[test]
    fn unknown_page_dumps_hex() {
        let mut ctrl = MockController {
            page: vec![0xde, 0xad],
            ..Default::default()
        };
        let out = run(&mut ctrl, LogPageRequest::new(0x70)).unwrap();
        assert_eq!(ctrl.requests[0].2, 4096);
        assert!(out.starts_with("Unknown Log Page (page 0x70), 4096 bytes\n0x0000: de ad 00"));
        assert!(out.ends_with("*\n"));
    }
}
