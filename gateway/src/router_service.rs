use crate::errors::GatewayError;
use crate::headers::{add_via_header, filter_hop_by_hop};
use crate::metrics_defs::{
    REQUESTS_FORWARDED, REQUESTS_INFLIGHT, REQUESTS_REJECTED, UPSTREAM_ERRORS,
};
use crate::upstream::{Upstream, rewrite_api_path};
use bytes::Bytes;
use http::header::{HOST, HeaderValue};
use http_body_util::BodyExt;
use http_body_util::combinators::BoxBody;
use hyper::body::Incoming;
use hyper::service::Service as HyperService;
use hyper::{Request, Response, StatusCode};
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use shared::http::make_boxed_error_response;
use shared::{counter, gauge};
use std::future::Future;
use std::pin::Pin;

/// Forwards `/api/<rest>` requests to `<upstream>/v1/<rest>`. Stateless:
/// every request is a pure rewrite against the upstream resolved at boot.
pub struct RouterService {
    upstream: Upstream,
    host_header: HeaderValue,
    client: Client<HttpConnector, Incoming>,
}

impl RouterService {
    pub fn try_new(upstream: Upstream) -> Result<Self, GatewayError> {
        let conn = HttpConnector::new();
        let client: Client<_, Incoming> = Client::builder(TokioExecutor::new())
            .http2_adaptive_window(true)
            .build(conn);
        let host_header = HeaderValue::from_str(upstream.authority.as_str())?;

        Ok(Self {
            upstream,
            host_header,
            client,
        })
    }
}

impl HyperService<Request<Incoming>> for RouterService {
    type Response = Response<BoxBody<Bytes, GatewayError>>;
    type Error = GatewayError;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn call(&self, req: Request<Incoming>) -> Self::Future {
        let upstream = self.upstream.clone();
        let host_header = self.host_header.clone();
        let client = self.client.clone();

        Box::pin(async move {
            gauge!(REQUESTS_INFLIGHT).increment(1.0);
            let result = forward(req, upstream, host_header, client).await;
            gauge!(REQUESTS_INFLIGHT).decrement(1.0);
            result
        })
    }
}

async fn forward(
    mut req: Request<Incoming>,
    upstream: Upstream,
    host_header: HeaderValue,
    client: Client<HttpConnector, Incoming>,
) -> Result<Response<BoxBody<Bytes, GatewayError>>, GatewayError> {
    let Some(path) = rewrite_api_path(req.uri().path()) else {
        counter!(REQUESTS_REJECTED).increment(1);
        return Ok(make_boxed_error_response(StatusCode::NOT_FOUND));
    };

    let path_and_query = match req.uri().query() {
        Some(query) => format!("{path}?{query}"),
        None => path,
    };
    *req.uri_mut() = upstream.target_uri(&path_and_query)?;

    let version = req.version();
    filter_hop_by_hop(req.headers_mut(), version);
    add_via_header(req.headers_mut(), version);
    req.headers_mut().insert(HOST, host_header);

    match client.request(req).await {
        Ok(response) => {
            counter!(REQUESTS_FORWARDED).increment(1);
            let mut response = response.map(|body| body.map_err(GatewayError::from).boxed());
            filter_hop_by_hop(response.headers_mut(), version);
            add_via_header(response.headers_mut(), version);
            Ok(response)
        }
        Err(err) => {
            counter!(UPSTREAM_ERRORS).increment(1);
            tracing::warn!(error = %err, "upstream request failed");
            Ok(make_boxed_error_response(StatusCode::BAD_GATEWAY))
        }
    }
}
