use std::net::SocketAddr;
use std::time::Duration;

use axum::extract::ConnectInfo;
use tower_http::classify::ServerErrorsFailureClass;
use tower_http::request_id::RequestId;
use tower_http::trace::{
    DefaultOnBodyChunk,
    DefaultOnEos,
    HttpMakeClassifier,
    MakeSpan,
    OnFailure,
    OnRequest,
    OnResponse,
    TraceLayer,
};

/// Returns a [`tower::Layer`] that wraps every request in a `request` span.
pub fn layer<RequestBody, ResponseBody>() -> TraceLayer<
    HttpMakeClassifier,
    impl MakeSpan<RequestBody> + Clone,
    impl OnRequest<RequestBody> + Clone,
    impl OnResponse<ResponseBody> + Clone,
    DefaultOnBodyChunk,
    DefaultOnEos,
    impl OnFailure<ServerErrorsFailureClass> + Clone,
> {
    TraceLayer::new_for_http()
        .make_span_with(make_span::<RequestBody>)
        .on_request(on_request::<RequestBody>)
        .on_response(on_response::<ResponseBody>)
        .on_failure(on_failure)
}

fn make_span<B>(request: &http::Request<B>) -> tracing::Span {
    let client_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|&ConnectInfo(addr)| addr.ip());

    let request_id = request
        .extensions()
        .get::<RequestId>()
        .and_then(|request_id| request_id.header_value().to_str().ok());

    tracing::info_span! {
        target: "signon::http",
        "request",
        client_addr = client_addr.map(tracing::field::display),
        request.id = request_id,
        request.method = %request.method(),
        request.path = request.uri().path(),
        response.status = tracing::field::Empty,
    }
}

fn on_request<B>(_request: &http::Request<B>, _span: &tracing::Span) {
    tracing::debug!(target: "signon::http::request", "starting to process request");
}

fn on_response<B>(response: &http::Response<B>, latency: Duration, span: &tracing::Span) {
    span.record("response.status", response.status().as_u16());

    tracing::info!(target: "signon::http::response", ?latency, "finished processing request");
}

fn on_failure(failure_class: ServerErrorsFailureClass, latency: Duration, span: &tracing::Span) {
    match failure_class {
        ServerErrorsFailureClass::StatusCode(status) => {
            span.record("response.status", status.as_u16());
            tracing::error!(
                target: "signon::http",
                status = status.as_u16(),
                ?latency,
                "failed to handle request",
            );
        },
        ServerErrorsFailureClass::Error(error) => {
            tracing::error!(target: "signon::http", %error, "failed to handle request");
        },
    }
}
