use crate::errors::GatewayError;
use http::uri::{Authority, Scheme, Uri};

/// Backend endpoint, resolved from configuration once at boot.
#[derive(Clone, Debug)]
pub struct Upstream {
    pub scheme: Scheme,
    pub authority: Authority,
}

impl Upstream {
    /// Parses the configured base URL. A bad value aborts startup instead of
    /// surfacing as a runtime 500 on the first forwarded request.
    pub fn parse(base_url: &str) -> Result<Self, GatewayError> {
        let uri: Uri = base_url.parse()?;
        let scheme = uri.scheme().cloned().ok_or(GatewayError::InvalidUpstream)?;
        let authority = uri
            .authority()
            .cloned()
            .ok_or(GatewayError::InvalidUpstream)?;

        Ok(Upstream { scheme, authority })
    }

    /// Builds the outbound URI for an already-rewritten path and query.
    pub fn target_uri(&self, path_and_query: &str) -> Result<Uri, GatewayError> {
        let uri = Uri::builder()
            .scheme(self.scheme.clone())
            .authority(self.authority.clone())
            .path_and_query(path_and_query)
            .build()?;
        Ok(uri)
    }
}

/// Maps an inbound `/api/<rest>` path to the versioned backend path
/// `/v1/<rest>`. Anything outside the `/api` prefix is not routed.
pub fn rewrite_api_path(path: &str) -> Option<String> {
    let rest = path.strip_prefix("/api")?;
    if rest.is_empty() {
        return Some("/v1".to_string());
    }
    if !rest.starts_with('/') {
        return None;
    }
    Some(format!("/v1{rest}"))
}
