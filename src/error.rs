//! Discovery errors
//!
//! Transport failures stay opaque (`anyhow::Error`) since they come from the
//! request collaborator. Parse failures keep the raw payload around so a bad
//! response can be diagnosed from the log line alone.

use thiserror::Error;

/// Error returned by a discovery cycle
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The transport could not complete a request for `action`
    #[error("cannot obtain {what} via {action}: {source:#}")]
    Transport {
        what: &'static str,
        action: String,
        #[source]
        source: anyhow::Error,
    },

    /// A page was received but did not decode
    #[error("cannot parse {what}: {source}")]
    Parse {
        what: &'static str,
        #[source]
        source: ParseError,
    },
}

/// A response payload that does not match the expected document shape
#[derive(Debug, Error)]
#[error("cannot unmarshal {document} from {:?}: {source}", String::from_utf8_lossy(.payload))]
pub struct ParseError {
    document: &'static str,
    payload: Vec<u8>,
    #[source]
    source: serde_json::Error,
}

impl ParseError {
    pub(crate) fn new(document: &'static str, payload: &[u8], source: serde_json::Error) -> Self {
        Self {
            document,
            payload: payload.to_vec(),
            source,
        }
    }

    /// Name of the document that failed to decode
    pub fn document(&self) -> &'static str {
        self.document
    }

    /// The offending raw payload
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_embeds_payload() {
        let source = serde_json::from_slice::<serde_json::Value>(b"{oops").unwrap_err();
        let err = ParseError::new("InstancesResponse", b"{oops", source);

        assert_eq!(err.payload(), b"{oops");
        assert_eq!(err.document(), "InstancesResponse");
        let msg = err.to_string();
        assert!(msg.starts_with("cannot unmarshal InstancesResponse from \"{oops\""));
    }

    #[test]
    fn test_transport_error_keeps_context_chain() {
        let source = anyhow::anyhow!("connection refused").context("Failed to send request");
        let err = DiscoveryError::Transport {
            what: "instances",
            action: "DescribeInstances".to_string(),
            source,
        };

        let msg = err.to_string();
        assert!(msg.contains("cannot obtain instances via DescribeInstances"));
        assert!(msg.contains("Failed to send request"));
        assert!(msg.contains("connection refused"));
    }
}
