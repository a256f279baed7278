//! Client entry point
//!
//! A [`Client`] owns the credentials, dialect, endpoint, transport, codec and
//! usage accumulator. Every operation in the crate funnels through
//! [`Client::execute`], which signs the parameters, issues one GET, records
//! box usage and surfaces errors.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::sdb::codec::{Codec, CodecConfig};
use crate::sdb::dialect::Dialect;
use crate::sdb::domain::Domain;
use crate::sdb::error::{Result, SdbError};
use crate::sdb::lister::{Page, PaginatedLister};
use crate::sdb::query::{ParamValue, QueryParams};
use crate::sdb::response::ResponseDocument;
use crate::sdb::signer::RequestSigner;
use crate::sdb::transport::{HttpTransport, Transport};
use crate::sdb::usage::Usage;

/// Request behaviour settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Maximum pages a listing may fetch; unbounded when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_pages: Option<usize>,
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: default_request_timeout(),
            max_pages: None,
        }
    }
}

struct ClientInner {
    signer: RequestSigner,
    dialect: Dialect,
    endpoint: String,
    transport: Arc<dyn Transport>,
    codec: Codec,
    usage: Usage,
    max_pages: Option<usize>,
}

/// Handle to the remote store
///
/// Clone is cheap; clones share the transport and the usage accumulator.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("signer", &self.inner.signer)
            .field("dialect", &self.inner.dialect)
            .field("endpoint", &self.inner.endpoint)
            .field("codec", &self.inner.codec)
            .finish()
    }
}

/// Builder for [`Client`]
pub struct ClientBuilder {
    access_key: String,
    secret_key: String,
    dialect: Dialect,
    endpoint: Option<String>,
    codec: Codec,
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
}

impl ClientBuilder {
    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Override the dialect's default endpoint
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn codec(mut self, codec: impl Into<Codec>) -> Self {
        self.codec = codec.into();
        self
    }

    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout.as_secs();
        self
    }

    pub fn max_pages(mut self, max_pages: Option<usize>) -> Self {
        self.config.max_pages = max_pages;
        self
    }

    /// Use a custom transport instead of the default HTTP client
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn build(self) -> Result<Client> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new(Duration::from_secs(
                self.config.request_timeout,
            ))?),
        };

        let endpoint = self
            .endpoint
            .unwrap_or_else(|| self.dialect.default_endpoint().to_string());

        Ok(Client {
            inner: Arc::new(ClientInner {
                signer: RequestSigner::new(self.access_key, self.secret_key),
                dialect: self.dialect,
                endpoint,
                transport,
                codec: self.codec,
                usage: Usage::new(),
                max_pages: self.config.max_pages,
            }),
        })
    }
}

impl Client {
    /// Client for the default dialect and endpoint over HTTP
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Result<Self> {
        Self::builder(access_key, secret_key).build()
    }

    pub fn builder(access_key: impl Into<String>, secret_key: impl Into<String>) -> ClientBuilder {
        ClientBuilder {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            dialect: Dialect::default(),
            endpoint: None,
            codec: Codec::from(CodecConfig::default()),
            config: ClientConfig::default(),
            transport: None,
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.inner.dialect
    }

    pub fn endpoint(&self) -> &str {
        &self.inner.endpoint
    }

    pub fn codec(&self) -> &Codec {
        &self.inner.codec
    }

    pub fn max_pages(&self) -> Option<usize> {
        self.inner.max_pages
    }

    pub fn usage(&self) -> &Usage {
        &self.inner.usage
    }

    /// Box usage accumulated since creation or the last reset
    pub fn box_usage(&self) -> f64 {
        self.inner.usage.box_usage()
    }

    pub fn reset_usage(&self) {
        self.inner.usage.reset();
    }

    /// Run `operations` and return its output with the box usage it added
    pub async fn measure<F: Future>(&self, operations: F) -> (F::Output, f64) {
        let before = self.box_usage();
        let output = operations.await;
        (output, self.box_usage() - before)
    }

    /// Every domain of the account, following continuation tokens
    pub async fn domains(&self) -> Result<Vec<Domain>> {
        let client = self;
        let dialect = self.dialect();
        let listing = PaginatedLister::new(self.max_pages())
            .collect(move |token| {
                let mut params = QueryParams::new().with("Action", dialect.list_domains_action());
                if let Some(token) = token {
                    params.insert(dialect.token_param(), token);
                }
                async move {
                    let doc = client.execute(params).await?;
                    Ok::<_, SdbError>(Page::new(doc.domain_names, doc.next_token))
                }
            })
            .await?;

        Ok(listing
            .entries
            .into_iter()
            .map(|name| self.domain(name))
            .collect())
    }

    /// Handle to an existing domain; no request is made
    pub fn domain(&self, name: impl Into<String>) -> Domain {
        Domain::new(self.clone(), name)
    }

    /// Create a domain. Idempotent on the service side.
    pub async fn create_domain(&self, name: &str) -> Result<Domain> {
        let dialect = self.dialect();
        let params = QueryParams::new()
            .with("Action", dialect.create_domain_action())
            .with(dialect.domain_param(), name);
        self.execute(params).await?;
        Ok(self.domain(name))
    }

    /// Delete a domain. Deleting a missing domain is not an error.
    pub async fn delete_domain(&self, name: &str) -> Result<()> {
        let dialect = self.dialect();
        let params = QueryParams::new()
            .with("Action", dialect.delete_domain_action())
            .with(dialect.domain_param(), name);
        self.execute(params).await?;
        Ok(())
    }

    /// Sign `params`, send them, and read the response.
    ///
    /// Box usage is recorded before any error is raised.
    pub(crate) async fn execute(&self, params: QueryParams) -> Result<ResponseDocument> {
        let inner = &self.inner;
        let action = params
            .get("Action")
            .and_then(ParamValue::as_single)
            .unwrap_or_default()
            .to_string();

        let signed = inner.signer.sign_params(params, inner.dialect, Utc::now());
        let url = format!("{}?{}", inner.endpoint, signed.encode());

        debug!(action = %action, endpoint = %inner.endpoint, "sdb_request");

        let response = inner.transport.get(&url).await?;

        let doc = match ResponseDocument::parse(&response.body, inner.dialect) {
            Ok(doc) => doc,
            Err(_) if !response.is_success() => {
                return Err(SdbError::Http {
                    status: response.status,
                    body: String::from_utf8_lossy(&response.body).into_owned(),
                });
            }
            Err(e) => return Err(e),
        };

        if let Some(usage) = doc.box_usage {
            inner.usage.add(usage);
        }

        if let Some(err) = &doc.error {
            warn!(
                action = %action,
                code = %err.code,
                category = %err.category,
                "sdb_service_error"
            );
        }
        doc.check()?;

        if !response.is_success() {
            return Err(SdbError::Http {
                status: response.status,
                body: String::from_utf8_lossy(&response.body).into_owned(),
            });
        }

        debug!(
            action = %action,
            box_usage = doc.box_usage.unwrap_or_default(),
            "sdb_response"
        );

        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdb::error::ErrorCategory;
    use crate::sdb::query::decode_query;
    use crate::sdb::transport::{ScriptedTransport, TransportResponse};

    fn scripted(dialect: Dialect) -> (Client, Arc<ScriptedTransport>) {
        let transport = Arc::new(ScriptedTransport::new());
        let client = Client::builder("my_access_id", "secret_key")
            .dialect(dialect)
            .transport(transport.clone())
            .build()
            .unwrap();
        (client, transport)
    }

    fn param(url: &str, key: &str) -> Option<String> {
        decode_query(url)
            .into_iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    #[tokio::test]
    async fn test_envelope_fields_in_url() {
        let (client, transport) = scripted(Dialect::Sdb);
        transport.push("<CreateDomainResponse><BoxUsage>0.5</BoxUsage></CreateDomainResponse>");

        let domain = client.create_domain("test").await.unwrap();
        assert_eq!(domain.name(), "test");

        let url = &transport.urls()[0];
        assert!(url.starts_with("http://sdb.amazonaws.com/?"));
        assert_eq!(param(url, "Action").as_deref(), Some("CreateDomain"));
        assert_eq!(param(url, "DomainName").as_deref(), Some("test"));
        assert_eq!(param(url, "AWSAccessKeyId").as_deref(), Some("my_access_id"));
        assert_eq!(param(url, "SignatureVersion").as_deref(), Some("1"));
        assert_eq!(param(url, "Version").as_deref(), Some("2007-11-07"));
        assert!(param(url, "Timestamp").is_some());
        assert!(param(url, "Signature").is_some());
        assert_eq!(client.box_usage(), 0.5);
    }

    #[tokio::test]
    async fn test_sds_domain_actions() {
        let (client, transport) = scripted(Dialect::Sds);
        transport.push("<DeleteResponse><Success/></DeleteResponse>");

        client.delete_domain("old").await.unwrap();

        let url = &transport.urls()[0];
        assert!(url.starts_with("http://sds.amazonaws.com/?"));
        assert_eq!(param(url, "Action").as_deref(), Some("Delete"));
        assert_eq!(param(url, "Name").as_deref(), Some("old"));
        assert_eq!(param(url, "Version").as_deref(), Some("2006-08-11"));
    }

    #[tokio::test]
    async fn test_error_usage_recorded_before_raise() {
        let (client, transport) = scripted(Dialect::Sdb);
        transport.push_response(TransportResponse::new(
            400,
            "<Response><Errors><Error><Code>AuthFailure</Code><Message>nope</Message>\
             <BoxUsage>0.25</BoxUsage></Error></Errors></Response>",
        ));

        let err = client.delete_domain("x").await.unwrap_err();
        assert_eq!(err.category(), Some(ErrorCategory::Auth));
        assert_eq!(client.box_usage(), 0.25);
    }

    #[tokio::test]
    async fn test_http_error_without_error_element() {
        let (client, transport) = scripted(Dialect::Sdb);
        transport.push_response(TransportResponse::new(503, "Service Unavailable"));

        let err = client.delete_domain("x").await.unwrap_err();
        assert!(matches!(err, SdbError::Http { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_measure_and_reset() {
        let (client, transport) = scripted(Dialect::Sdb);
        transport.push("<R><BoxUsage>0.125</BoxUsage></R>");
        transport.push("<R><BoxUsage>0.25</BoxUsage></R>");

        client.delete_domain("a").await.unwrap();
        let (result, used) = client.measure(client.delete_domain("b")).await;
        result.unwrap();

        assert_eq!(used, 0.25);
        assert_eq!(client.box_usage(), 0.375);

        client.reset_usage();
        assert_eq!(client.box_usage(), 0.0);
    }

    #[test]
    fn test_client_config_defaults() {
        let config: ClientConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.request_timeout, 30);
        assert_eq!(config.max_pages, None);
    }
}
