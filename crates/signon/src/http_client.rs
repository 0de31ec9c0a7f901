use axum::body::HttpBody;
use bytes::Bytes;
use http_body_util::BodyExt;
use http_body_util::combinators::UnsyncBoxBody;
use steam_auth::client::BoxError;
use tower::util::BoxCloneSyncService;
use tower::{Service, ServiceBuilder};

/// The HTTP client used for talking to Steam, with its concrete type erased.
pub type HttpService = BoxCloneSyncService<
    http::Request<Bytes>,
    http::Response<UnsyncBoxBody<Bytes, BoxError>>,
    BoxError,
>;

/// Erases the type of `service` so it can be stored in [`AppState`](crate::AppState).
pub fn http_service<S, ResponseBody>(service: S) -> HttpService
where
    S: Service<http::Request<Bytes>, Response = http::Response<ResponseBody>>,
    S: Clone + Send + Sync + 'static,
    S::Error: Into<BoxError>,
    S::Future: Send + 'static,
    ResponseBody: HttpBody<Data = Bytes> + Send + 'static,
    ResponseBody::Error: Into<BoxError>,
{
    BoxCloneSyncService::new(
        ServiceBuilder::new()
            .map_err(Into::<BoxError>::into)
            .map_response(|response: http::Response<ResponseBody>| {
                response.map(|body| body.map_err(Into::<BoxError>::into).boxed_unsync())
            })
            .service(service),
    )
}
