//! The seam between the generation controller and the remote service.

use std::future::Future;

use quill_gateway::{Gateway, GatewayError, GenerateResponse};
use quill_types::GenerationRequest;

/// Anything that can turn a validated request into a generated document.
///
/// [`Gateway`] is the production implementation; tests substitute scripted services to
/// control timing.
pub trait ReadmeService: Send + Sync {
    fn generate_readme(
        &self,
        request: &GenerationRequest,
    ) -> impl Future<Output = Result<GenerateResponse, GatewayError>> + Send;
}

impl ReadmeService for Gateway {
    fn generate_readme(
        &self,
        request: &GenerationRequest,
    ) -> impl Future<Output = Result<GenerateResponse, GatewayError>> + Send {
        Gateway::generate_readme(self, request)
    }
}
