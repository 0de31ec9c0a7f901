use tower_http::request_id::{MakeRequestId, RequestId};
use ulid::Ulid;

/// Returns a [`MakeRequestId`] that tags every request with a fresh [ULID].
///
/// [ULID]: ulid::Ulid
pub fn make_request_id() -> impl MakeRequestId + Clone {
    MakeUlidRequestId
}

#[derive(Debug, Clone, Copy)]
struct MakeUlidRequestId;

impl MakeRequestId for MakeUlidRequestId {
    fn make_request_id<B>(&mut self, _: &http::Request<B>) -> Option<RequestId> {
        Ulid::new()
            .to_string()
            .parse::<http::HeaderValue>()
            .map(RequestId::from)
            .ok()
    }
}
