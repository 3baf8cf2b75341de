//! Application version probing and feature derivation.
//!
//! # Thresholds
//! - `authz`, `feegrant`: ≥ 0.43.0
//! - `gov-v1`: ≥ 0.46.0
//! - `group`: ≥ 0.47.0
//!
//! Thresholds are evaluated independently. Versions compare on the
//! `(major, minor, patch)` triple; pre-release and build suffixes are
//! ignored.

use std::collections::BTreeSet;
use std::fmt;

use serde::Deserialize;

use crate::context::CallContext;
use crate::error::{TxError, TxResult};
use crate::rpc::RpcClient;
use crate::types::{Feature, Framework, SdkVersion, TxType};

/// Numeric core of an application version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Semver {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Semver {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self { major, minor, patch }
    }
}

impl fmt::Display for Semver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

const FEATURE_THRESHOLDS: [(Feature, Semver); 4] = [
    (Feature::Authz, Semver::new(0, 43, 0)),
    (Feature::Feegrant, Semver::new(0, 43, 0)),
    (Feature::GovV1, Semver::new(0, 46, 0)),
    (Feature::Group, Semver::new(0, 47, 0)),
];

/// Parse `v0.50.1-rc.0+build` style strings. Patch defaults to 0.
pub fn parse_version(raw: &str) -> TxResult<Semver> {
    let invalid = || TxError::Configuration(format!("unparseable application version {:?}", raw));

    let trimmed = raw.trim();
    let trimmed = trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed);
    let core = trimmed
        .split(|c| c == '-' || c == '+')
        .next()
        .unwrap_or_default();
    if core.is_empty() {
        return Err(invalid());
    }

    let parts = core
        .split('.')
        .map(|part| part.parse::<u64>().map_err(|_| invalid()))
        .collect::<TxResult<Vec<_>>>()?;

    match parts.as_slice() {
        [major, minor] => Ok(Semver::new(*major, *minor, 0)),
        [major, minor, patch] => Ok(Semver::new(*major, *minor, *patch)),
        _ => Err(invalid()),
    }
}

/// Features enabled at `version`.
pub fn features_for(version: Semver) -> BTreeSet<Feature> {
    FEATURE_THRESHOLDS
        .iter()
        .filter(|(_, min)| version >= *min)
        .map(|(feature, _)| *feature)
        .collect()
}

/// Build an [`SdkVersion`] from a raw version string.
pub fn sdk_version(raw: &str) -> TxResult<SdkVersion> {
    let parsed = parse_version(raw)?;
    Ok(SdkVersion {
        framework: Framework::Cosmos,
        version: raw.trim().to_string(),
        features: features_for(parsed),
    })
}

/// Transaction types a Cosmos builder advertises for `sdk`.
pub fn supported_tx_types(sdk: &SdkVersion) -> Vec<TxType> {
    let mut types = vec![TxType::GovVote, TxType::BankSend, TxType::StakingDelegate];
    if sdk.has(Feature::Authz) {
        types.push(TxType::AuthzGrant);
    }
    if sdk.has(Feature::Feegrant) {
        types.push(TxType::FeegrantAllowance);
    }
    types
}

#[derive(Debug, Deserialize)]
struct AbciInfo {
    result: AbciInfoResult,
}

#[derive(Debug, Deserialize)]
struct AbciInfoResult {
    response: AbciInfoResponse,
}

#[derive(Debug, Deserialize)]
struct AbciInfoResponse {
    #[serde(default)]
    version: String,
}

/// Probes a node's `abci_info` endpoint.
#[derive(Debug, Clone)]
pub struct FeatureDetector {
    rpc: RpcClient,
}

impl FeatureDetector {
    pub fn new(rpc: RpcClient) -> Self {
        Self { rpc }
    }

    /// Query the node and derive its feature set.
    ///
    /// An unreachable node, a non-2xx reply or an empty/unparseable version
    /// are all failures; there is no "no features" fallback.
    pub async fn detect(&self, ctx: &CallContext) -> TxResult<SdkVersion> {
        let reply = self.rpc.get(ctx, "abci_info", "abci_info").await?;
        if !reply.is_success() {
            return Err(TxError::Api {
                status: reply.status,
                body: reply.body,
            });
        }

        let info: AbciInfo = serde_json::from_str(&reply.body)
            .map_err(|e| TxError::Transport(format!("malformed abci_info response: {}", e)))?;
        let version = info.result.response.version;
        if version.trim().is_empty() {
            return Err(TxError::Configuration(
                "node reported an empty application version".to_string(),
            ));
        }

        let sdk = sdk_version(&version)?;
        tracing::info!(
            endpoint = %self.rpc.endpoint(),
            version = %sdk.version,
            features = ?sdk.features,
            "Detected application version"
        );
        Ok(sdk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn names(raw: &str) -> Vec<&'static str> {
        sdk_version(raw)
            .unwrap()
            .features
            .iter()
            .map(Feature::as_str)
            .collect()
    }

    #[test]
    fn test_parse_version() {
        assert_eq!(parse_version("v0.50.0").unwrap(), Semver::new(0, 50, 0));
        assert_eq!(parse_version("0.47.5-rc1").unwrap(), Semver::new(0, 47, 5));
        assert_eq!(parse_version("v0.46.0+abcdef").unwrap(), Semver::new(0, 46, 0));
        assert_eq!(parse_version("v1.2").unwrap(), Semver::new(1, 2, 0));
    }

    #[test]
    fn test_parse_version_failures() {
        for raw in ["", "v", "latest", "v0.x.1", "1", "0.1.2.3", "-rc1"] {
            assert!(
                matches!(parse_version(raw), Err(TxError::Configuration(_))),
                "{:?} should fail",
                raw
            );
        }
    }

    #[test]
    fn test_pre_release_tag_compares_equal() {
        assert_eq!(parse_version("v0.47.0-rc2").unwrap(), parse_version("v0.47.0").unwrap());
    }

    #[test]
    fn test_features_by_version() {
        assert_eq!(names("v0.50.0"), vec!["authz", "feegrant", "gov-v1", "group"]);
        assert_eq!(names("v0.45.0"), vec!["authz", "feegrant"]);
        assert_eq!(names("v0.46.3"), vec!["authz", "feegrant", "gov-v1"]);
        assert!(names("v0.42.11").is_empty());
        assert_eq!(names("v1.0.0").len(), 4);
    }

    #[test]
    fn test_supported_tx_types_follow_features() {
        let old = sdk_version("v0.42.0").unwrap();
        assert_eq!(
            supported_tx_types(&old),
            vec![TxType::GovVote, TxType::BankSend, TxType::StakingDelegate]
        );

        let new = sdk_version("v0.47.0").unwrap();
        let types = supported_tx_types(&new);
        assert!(types.contains(&TxType::AuthzGrant));
        assert!(types.contains(&TxType::FeegrantAllowance));
        assert!(!types.contains(&TxType::NativeTransfer));
    }

    async fn detector_for(body: serde_json::Value) -> (MockServer, FeatureDetector) {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/abci_info"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;
        let rpc = RpcClient::new(&server.uri(), Duration::from_secs(5)).unwrap();
        (server, FeatureDetector::new(rpc))
    }

    #[tokio::test]
    async fn test_detect_from_abci_info() {
        let (_server, detector) = detector_for(serde_json::json!({
            "jsonrpc": "2.0",
            "id": -1,
            "result": {"response": {"data": "simd", "version": "v0.50.0", "last_block_height": "12"}}
        }))
        .await;

        let sdk = detector.detect(&CallContext::background()).await.unwrap();
        assert_eq!(sdk.version, "v0.50.0");
        assert!(sdk.has(Feature::Group));
    }

    #[tokio::test]
    async fn test_detect_empty_version_fails() {
        let (_server, detector) = detector_for(serde_json::json!({
            "result": {"response": {"data": "simd"}}
        }))
        .await;

        let err = detector.detect(&CallContext::background()).await.unwrap_err();
        assert!(matches!(err, TxError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_detect_unreachable_node_fails() {
        let rpc = RpcClient::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let err = FeatureDetector::new(rpc)
            .detect(&CallContext::background())
            .await
            .unwrap_err();
        assert!(err.is_transport());
    }
}
