//! Watermark remover
//!
//! Sends the published URL to the inference service, walking the endpoint chain
//! until an endpoint exists, then classifies the reply. A reply saying the video
//! duration could not be determined earns exactly one retry with the other URL
//! shape, when the hosting service has one.

use reqwest::header::CONTENT_TYPE;
use reqwest::{Response, StatusCode};
use unmark_core::{
    Config, InferenceRequest, InferenceResult, ObjectUrlStore, OutputEncoding, PublicUrl,
    StatusReporter,
};
use unmark_hosting::url_shape;
use unmark_http::{Auth, HttpClient};

use crate::endpoint::{EndpointChain, EndpointDescriptor};
use crate::error::{classify_failure, RemovalError, RemovalErrorKind};
use crate::response::materialize;

pub struct Remover {
    http: HttpClient,
    endpoints: EndpointChain,
    store: ObjectUrlStore,
    output_encoding: OutputEncoding,
}

impl Remover {
    pub fn new(http: HttpClient, endpoints: EndpointChain, store: ObjectUrlStore) -> Self {
        Self {
            http,
            endpoints,
            store,
            output_encoding: OutputEncoding::Binary,
        }
    }

    pub fn from_config(config: &Config, http: HttpClient, store: ObjectUrlStore) -> Self {
        Self::new(http, EndpointChain::from_config(config), store)
    }

    pub fn with_output_encoding(mut self, encoding: OutputEncoding) -> Self {
        self.output_encoding = encoding;
        self
    }

    pub fn endpoints(&self) -> &EndpointChain {
        &self.endpoints
    }

    /// Remove the watermark from the video at `url`.
    pub async fn remove(
        &self,
        url: &PublicUrl,
        credential: &str,
        reporter: &dyn StatusReporter,
    ) -> Result<InferenceResult, RemovalError> {
        let prepared = url_shape::prepare_for_inference(url);
        let request = InferenceRequest::new(prepared.as_str(), self.output_encoding);
        let auth = Auth::XApiKey(credential.to_string());

        let (endpoint, response) = self.submit(&request, &auth).await?;

        if response.status().is_success() {
            tracing::info!(
                endpoint = %endpoint.url,
                version = %endpoint.version,
                status = %response.status(),
                "Inference request accepted"
            );
            reporter.report_accepted();
            return self.read_result(response, &request).await;
        }

        let error = Self::failure(response, endpoint).await;

        if error.is_duration_undetectable() {
            if let Some(alternate) = url_shape::alternate_shape(&prepared) {
                return self
                    .retry_with_shape(&request, &alternate, &auth, error, reporter)
                    .await;
            }
        }

        Err(error)
    }

    /// Try each endpoint until one answers with something other than 404.
    async fn submit(
        &self,
        request: &InferenceRequest,
        auth: &Auth,
    ) -> Result<(&EndpointDescriptor, Response), RemovalError> {
        let count = self.endpoints.len();

        for (index, endpoint) in self.endpoints.iter().enumerate() {
            let is_last = index + 1 == count;
            let body = request.to_body(&endpoint.input_field);

            tracing::debug!(
                endpoint = %endpoint.url,
                version = %endpoint.version,
                source_url = %request.source_url,
                "Submitting inference request"
            );

            match self.http.post_json(&endpoint.url, &body, auth).await {
                Ok(response) if response.status() == StatusCode::NOT_FOUND && !is_last => {
                    tracing::info!(
                        endpoint = %endpoint.url,
                        version = %endpoint.version,
                        "Inference endpoint not found, trying next version"
                    );
                }
                Ok(response) => return Ok((endpoint, response)),
                Err(e) if !is_last => {
                    tracing::warn!(
                        endpoint = %endpoint.url,
                        version = %endpoint.version,
                        error = %e,
                        "Inference endpoint unreachable, trying next version"
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(RemovalError::new(
            RemovalErrorKind::Unknown,
            "Failed to get response from inference service",
        ))
    }

    async fn retry_with_shape(
        &self,
        request: &InferenceRequest,
        alternate: &PublicUrl,
        auth: &Auth,
        original: RemovalError,
        reporter: &dyn StatusReporter,
    ) -> Result<InferenceResult, RemovalError> {
        tracing::info!(
            from = %request.source_url,
            to = %alternate,
            "Duration could not be determined, retrying with alternate URL format"
        );
        reporter.report_status("Retrying with direct URL format...");

        let retry = request.with_source_url(alternate.as_str());
        let endpoint = self.endpoints.last();
        let body = retry.to_body(&endpoint.input_field);

        match self.http.post_json(&endpoint.url, &body, auth).await {
            Ok(response) if response.status().is_success() => {
                reporter.report_accepted();
                match self.read_result(response, &retry).await {
                    Ok(result) => return Ok(result),
                    Err(e) => tracing::warn!(error = %e, "Retry reply could not be read"),
                }
            }
            Ok(response) => {
                let retry_error = Self::failure(response, endpoint).await;
                tracing::warn!(error = %retry_error, "Retry with alternate URL format also failed");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Retry with alternate URL format also failed");
            }
        }

        Err(original.with_access_guidance())
    }

    async fn read_result(
        &self,
        response: Response,
        request: &InferenceRequest,
    ) -> Result<InferenceResult, RemovalError> {
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response.bytes().await.map_err(|e| {
            RemovalError::new(
                RemovalErrorKind::Unknown,
                format!("Failed to read inference response: {}", e),
            )
        })?;

        tracing::debug!(
            content_type = ?content_type,
            bytes = body.len(),
            "Normalizing inference reply"
        );

        Ok(materialize(
            body,
            content_type.as_deref(),
            request.output_encoding,
            &self.store,
        )?)
    }

    async fn failure(response: Response, endpoint: &EndpointDescriptor) -> RemovalError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let error = classify_failure(status, &body);

        tracing::error!(
            endpoint = %endpoint.url,
            status = %status,
            kind = ?error.kind,
            error = %error,
            "Inference request failed"
        );
        error
    }
}
