//! Stable per-machine visitor id sent as `X-Visitor-ID`.

use oh_core::ids::VisitorId;
use sha2::{Digest, Sha256};

const VISITOR_SALT: &str = "onehealth-visitor";

/// Hex SHA-256 of the host name, or a random id when the host name is
/// unavailable.
pub fn machine_visitor_id() -> VisitorId {
    let host = gethostname::gethostname().to_string_lossy().into_owned();
    if host.trim().is_empty() {
        return VisitorId::from(uuid::Uuid::new_v4().simple().to_string());
    }
    visitor_id_for_host(&host)
}

fn visitor_id_for_host(host: &str) -> VisitorId {
    let mut hasher = Sha256::new();
    hasher.update(VISITOR_SALT.as_bytes());
    hasher.update(host.as_bytes());
    VisitorId::from(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_host_yields_same_id() {
        assert_eq!(visitor_id_for_host("clinic-pc"), visitor_id_for_host("clinic-pc"));
        assert_ne!(visitor_id_for_host("clinic-pc"), visitor_id_for_host("field-laptop"));
    }

    #[test]
    fn id_is_hex_sha256() {
        let id = visitor_id_for_host("clinic-pc");
        assert_eq!(id.len(), 64);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
