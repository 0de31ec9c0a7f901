use std::task::{self, Poll};

use bytes::Bytes;
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use tower::Service;

/// Adapts a [`reqwest::Client`] to the `Service<http::Request<Bytes>>` interface the rest of this
/// crate is written against.
#[derive(Debug, Clone, Default, From)]
pub struct HttpClient(reqwest::Client);

impl HttpClient {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Service<http::Request<Bytes>> for HttpClient {
    type Response = http::Response<reqwest::Body>;
    type Error = reqwest::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut task::Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: http::Request<Bytes>) -> Self::Future {
        let client = self.0.clone();

        async move {
            let request = reqwest::Request::try_from(request.map(reqwest::Body::from))?;
            let response = client.execute(request).await?;

            Ok(http::Response::from(response))
        }
        .boxed()
    }
}
