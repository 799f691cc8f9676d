//! HTTP access to the Colissimo web services.

use std::future::Future;

use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::debug;
use url::Url;

use crate::config::ColissimoConfig;
use crate::error::Result;
use crate::label::LabelReply;
use crate::payload::LabelRequest;

/// Credentials and parcel of a tracking query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackingQuery<'a> {
    /// Colissimo account number.
    pub account_number: &'a str,
    /// Web service password.
    pub password: &'a str,
    /// Parcel tracking number.
    pub skybill_number: &'a str,
}

/// Transport used to reach the Colissimo web services.
pub trait ColissimoApi: Send + Sync {
    /// Posts a label request.
    fn generate_label(
        &self,
        request: &LabelRequest,
    ) -> impl Future<Output = Result<LabelReply>> + Send;

    /// Queries the tracking service, returning the XML body.
    fn track(&self, query: TrackingQuery<'_>) -> impl Future<Output = Result<String>> + Send;
}

/// `reqwest` transport.
#[derive(Debug, Clone)]
pub struct HttpApi {
    http_client: Client,
    label_url: Url,
    tracking_url: Url,
}

impl HttpApi {
    /// Creates a transport for the configured endpoints.
    ///
    /// # Errors
    ///
    /// Returns an error if an endpoint is invalid or the client cannot be
    /// built.
    pub fn new(config: &ColissimoConfig) -> Result<Self> {
        let http_client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            http_client,
            label_url: config.label_endpoint()?,
            tracking_url: config.tracking_endpoint()?,
        })
    }
}

impl ColissimoApi for HttpApi {
    async fn generate_label(&self, request: &LabelRequest) -> Result<LabelReply> {
        debug!("POST {}", self.label_url);
        let response = self
            .http_client
            .post(self.label_url.clone())
            .json(request)
            .send()
            .await?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = response.bytes().await?;

        Ok(LabelReply {
            status,
            content_type,
            body,
        })
    }

    async fn track(&self, query: TrackingQuery<'_>) -> Result<String> {
        debug!("GET {} for {}", self.tracking_url, query.skybill_number);
        let response = self
            .http_client
            .get(self.tracking_url.clone())
            .query(&[
                ("accountNumber", query.account_number),
                ("password", query.password),
                ("skybillNumber", query.skybill_number),
            ])
            .send()
            .await?;

        Ok(response.text().await?)
    }
}
