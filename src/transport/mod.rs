use async_trait::async_trait;

use crate::types::{HttpRequest, HttpResponse};
use crate::Result;

mod mock_transport;
mod reqwest_transport;

pub use mock_transport::MockTransport;
pub use reqwest_transport::ReqwestTransport;

#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Sends an HTTP request to the absolute URL in `request.url`.
    ///
    /// Resolves as soon as the response headers have arrived, whatever the
    /// status; the body is handed back unread.
    async fn send_http_request(&self, request: HttpRequest) -> Result<HttpResponse>;
}
