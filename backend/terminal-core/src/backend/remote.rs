//! Connector for the business backend.
//!
//! JSON over HTTPS with a client certificate. Every call goes through
//! [`RemoteBackend::send_with_backoff`], which keeps retrying connection-level
//! failures until the caller's timeout drops the future.

use crate::USER_AGENT;
use crate::backend::{
    BackendConnector, REASON_ALREADY_OCCUPIED, REASON_FORBIDDEN_BY_BACKEND,
    REASON_NOT_IMPLEMENTED, REASON_NOT_OCCUPIED, REASON_WRONG_DOMAIN, StorageVerdict, UiResponse,
    Verdict,
};
use crate::error::backend::BackendError;

use common::{ErrorLocation, HttpStatusCode};
use models::{Fineness, OccupiedCells, Spectrum, StorageCell};

use std::fmt::{Display, Formatter, Result as FormatResult};
use std::panic::Location;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use backoff::{ExponentialBackoff, backoff::Backoff};
use log::{debug, warn};
use reqwest::{Certificate, Client, Identity, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tokio::time::sleep as TokioSleep;
use url::Url;

const BACKOFF_MAX_INTERVAL: Duration = Duration::from_secs(15);
const TCP_KEEPALIVE: Duration = Duration::from_secs(60);
const HTTP2_KEEPALIVE_INTERVAL: Duration = Duration::from_secs(60);
const HTTP2_KEEPALIVE_TIMEOUT: Duration = Duration::from_secs(30);

const STORAGE_OCCUPIED_ENDPOINT: &str = "v1/storage/occupied";
const STORAGE_OCCUPY_ENDPOINT: &str = "v1/storage/occupy";
const STORAGE_RELEASE_ENDPOINT: &str = "v1/storage/release";
const EVAL_BEGIN_ENDPOINT: &str = "v1/eval/begin";
const EVAL_SPECTRUM_ENDPOINT: &str = "v1/eval/spectrum";
const EVAL_DRY_WEIGHT_ENDPOINT: &str = "v1/eval/dry_weight";
const EVAL_WET_WEIGHT_ENDPOINT: &str = "v1/eval/wet_weight";
const EVAL_FINALIZE_ENDPOINT: &str = "v1/eval/finalize";
const INTEGRATION_UI_METHOD_ENDPOINT: &str = "v1/integration/ui_method";

/// Client certificate, private key and CA bundle, all PEM.
#[derive(Debug, Clone)]
pub struct TlsFiles {
    pub cert: PathBuf,
    pub key: PathBuf,
    pub ca: PathBuf,
}

/// Storage domains known to the business backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageDomain {
    Other,
    Dashboard,
    Buyout,
    Shop,
    Pawnshop,
}

impl StorageDomain {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageDomain::Other => "other",
            StorageDomain::Dashboard => "dashboard",
            StorageDomain::Buyout => "buyout",
            StorageDomain::Shop => "shop",
            StorageDomain::Pawnshop => "pawnshop",
        }
    }
}

impl Display for StorageDomain {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for StorageDomain {
    type Err = BackendError;

    #[track_caller]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "other" => Ok(StorageDomain::Other),
            "dashboard" => Ok(StorageDomain::Dashboard),
            "buyout" => Ok(StorageDomain::Buyout),
            "shop" => Ok(StorageDomain::Shop),
            "pawnshop" => Ok(StorageDomain::Pawnshop),
            _ => Err(BackendError::UnknownDomain {
                domain: s.to_string(),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }
}

// ============================================
// WIRE SHAPES
// ============================================

#[derive(Debug, Deserialize)]
struct OccupiedReply {
    #[serde(default)]
    domains: OccupiedCells,
}

#[derive(Debug, Deserialize)]
struct BeginReply {
    eval_id: u64,
}

#[derive(Debug, Deserialize)]
struct FinenessModel {
    alloy: String,
    purity: f64,
    millesimal: u32,
    carat: String,
    confidence: f64,
    risky: bool,
}

impl From<FinenessModel> for Fineness {
    fn from(model: FinenessModel) -> Self {
        Fineness {
            alloy: model.alloy,
            purity: model.purity,
            millesimal: model.millesimal,
            carat: model.carat,
            confidence: model.confidence,
            risky: model.risky,
        }
    }
}

/// Either a fineness, a reject sub-message, or neither.
#[derive(Debug, Default, Deserialize)]
struct EvalReply {
    #[serde(default)]
    fineness: Option<FinenessModel>,
    #[serde(default)]
    reject: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct StorageReply {
    #[serde(default)]
    success: Option<Value>,
    #[serde(default)]
    forbidden: Option<Value>,
    #[serde(default)]
    already_occupied: Option<Value>,
    #[serde(default)]
    not_found: Option<Value>,
    #[serde(default)]
    wrong_domain: Option<Value>,
}

impl StorageReply {
    fn into_verdict(self) -> StorageVerdict {
        if self.success.is_some() {
            StorageVerdict::Granted
        } else if self.forbidden.is_some() {
            StorageVerdict::forbidden(REASON_FORBIDDEN_BY_BACKEND)
        } else if self.already_occupied.is_some() {
            StorageVerdict::forbidden(REASON_ALREADY_OCCUPIED)
        } else if self.not_found.is_some() {
            StorageVerdict::forbidden(REASON_NOT_OCCUPIED)
        } else if self.wrong_domain.is_some() {
            StorageVerdict::forbidden(REASON_WRONG_DOMAIN)
        } else {
            StorageVerdict::forbidden(REASON_NOT_IMPLEMENTED)
        }
    }
}

#[derive(Debug, Deserialize)]
struct UiMethodReply {
    http_status: u16,
    #[serde(default)]
    body: Map<String, Value>,
}

// ============================================
// CLIENT
// ============================================

#[derive(Clone)]
pub struct RemoteBackend {
    base_url: Url,
    client: Client,
}

impl RemoteBackend {
    /// Builds a mutually authenticated client for `address`.
    ///
    /// `address` may omit the scheme, in which case `https://` is assumed.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Tls`] if any PEM file is unreadable or invalid.
    pub fn connect(address: &str, tls: &TlsFiles) -> Result<Self, BackendError> {
        let mut identity_pem = std::fs::read(&tls.cert)?;
        identity_pem.extend_from_slice(b"\n");
        identity_pem.extend_from_slice(&std::fs::read(&tls.key)?);
        let identity = Identity::from_pem(&identity_pem)
            .map_err(|e| BackendError::tls(format!("loading tls cert pair: {e}")))?;

        let ca_pem = std::fs::read(&tls.ca)?;
        let authorities = Certificate::from_pem_bundle(&ca_pem)
            .map_err(|e| BackendError::tls(format!("loading ca certs: {e}")))?;
        if authorities.is_empty() {
            return Err(BackendError::tls(format!(
                "no ca certs found in {}",
                tls.ca.display()
            )));
        }

        let mut builder = Self::client_builder().identity(identity);
        for authority in authorities {
            builder = builder.add_root_certificate(authority);
        }

        Self::from_client(address, builder.build()?)
    }

    /// Builds a client without TLS material, for plain HTTP backends.
    pub fn plain(address: &str) -> Result<Self, BackendError> {
        Self::from_client(address, Self::client_builder().build()?)
    }

    fn client_builder() -> reqwest::ClientBuilder {
        Client::builder()
            .user_agent(USER_AGENT)
            .tcp_keepalive(TCP_KEEPALIVE)
            .http2_keep_alive_interval(HTTP2_KEEPALIVE_INTERVAL)
            .http2_keep_alive_timeout(HTTP2_KEEPALIVE_TIMEOUT)
            .http2_keep_alive_while_idle(true)
    }

    fn from_client(address: &str, client: Client) -> Result<Self, BackendError> {
        let mut base = if address.contains("://") {
            address.to_string()
        } else {
            format!("https://{address}")
        };
        if !base.ends_with('/') {
            base.push('/');
        }

        Ok(Self {
            base_url: Url::parse(&base)?,
            client,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Sends the request built by `build`, retrying connection failures.
    ///
    /// Waits grow exponentially up to 15 seconds each; there is no overall
    /// limit, the caller's timeout is the limit.
    async fn send_with_backoff<F>(&self, build: F) -> Result<Response, BackendError>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut backoff = ExponentialBackoff {
            max_interval: BACKOFF_MAX_INTERVAL,
            max_elapsed_time: None,
            ..Default::default()
        };

        loop {
            match build().send().await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_connect() => match backoff.next_backoff() {
                    Some(duration) => {
                        warn!("Backend unreachable, retrying after {duration:?}: {e}");
                        TokioSleep(duration).await;
                    }
                    None => return Err(e.into()),
                },
                Err(e) => return Err(e.into()),
            }
        }
    }

    async fn read_json<R: DeserializeOwned>(response: Response) -> Result<R, BackendError> {
        let status = HttpStatusCode(response.status().as_u16());
        if !status.is_success() {
            return Err(BackendError::Server {
                message: format!(
                    "HTTP {} - {}",
                    status,
                    response.text().await.unwrap_or_default()
                ),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let json: Value = response.json().await?;
        Ok(serde_json::from_value(json)?)
    }

    async fn get<R: DeserializeOwned>(&self, endpoint: &str) -> Result<R, BackendError> {
        let url = self.base_url.join(endpoint)?;
        debug!("GET {url}");
        let response = self
            .send_with_backoff(|| self.client.get(url.clone()))
            .await?;
        Self::read_json(response).await
    }

    async fn post<R: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &Value,
    ) -> Result<R, BackendError> {
        let url = self.base_url.join(endpoint)?;
        debug!("POST {url}");
        let response = self
            .send_with_backoff(|| self.client.post(url.clone()).json(body))
            .await?;
        Self::read_json(response).await
    }

    async fn post_eval(
        &self,
        endpoint: &str,
        body: &Value,
    ) -> Result<Verdict<Option<Fineness>>, BackendError> {
        let reply: EvalReply = self.post(endpoint, body).await?;
        if reply.reject.is_some() {
            return Ok(Verdict::Rejected);
        }
        Ok(Verdict::Accepted(reply.fineness.map(Fineness::from)))
    }

    async fn post_fineness(
        &self,
        endpoint: &str,
        body: &Value,
    ) -> Result<Verdict<Fineness>, BackendError> {
        match self.post_eval(endpoint, body).await? {
            Verdict::Rejected => Ok(Verdict::Rejected),
            Verdict::Accepted(Some(fineness)) => Ok(Verdict::Accepted(fineness)),
            Verdict::Accepted(None) => Err(BackendError::server(format!(
                "{endpoint} reply carries neither fineness nor reject"
            ))),
        }
    }
}

#[async_trait]
impl BackendConnector for RemoteBackend {
    async fn occupied_cells(&self) -> Result<OccupiedCells, BackendError> {
        let reply: OccupiedReply = self.get(STORAGE_OCCUPIED_ENDPOINT).await?;
        Ok(reply.domains)
    }

    async fn new_eval(&self) -> Result<u64, BackendError> {
        let reply: BeginReply = self.post(EVAL_BEGIN_ENDPOINT, &json!({})).await?;
        Ok(reply.eval_id)
    }

    async fn evaluate_spectrum(
        &self,
        eval_id: u64,
        spectrum: &Spectrum,
    ) -> Result<Verdict<Fineness>, BackendError> {
        self.post_fineness(
            EVAL_SPECTRUM_ENDPOINT,
            &json!({"eval_id": eval_id, "spectrum": spectrum}),
        )
        .await
    }

    async fn evaluate_hydro(
        &self,
        eval_id: u64,
        dry_weight: f64,
        wet_weight: f64,
    ) -> Result<Verdict<()>, BackendError> {
        for (endpoint, weight) in [
            (EVAL_DRY_WEIGHT_ENDPOINT, dry_weight),
            (EVAL_WET_WEIGHT_ENDPOINT, wet_weight),
        ] {
            let verdict = self
                .post_eval(endpoint, &json!({"eval_id": eval_id, "weight": weight}))
                .await?;
            if verdict == Verdict::Rejected {
                return Ok(Verdict::Rejected);
            }
        }
        Ok(Verdict::Accepted(()))
    }

    async fn finalize_evaluation(&self, eval_id: u64) -> Result<Verdict<Fineness>, BackendError> {
        self.post_fineness(EVAL_FINALIZE_ENDPOINT, &json!({"eval_id": eval_id}))
            .await
    }

    async fn occupy_storage_cell(
        &self,
        domain: &str,
        cell: &StorageCell,
        transaction_id: &str,
    ) -> Result<StorageVerdict, BackendError> {
        let domain: StorageDomain = domain.parse()?;
        let reply: StorageReply = self
            .post(
                STORAGE_OCCUPY_ENDPOINT,
                &json!({"domain": domain, "cell": cell, "transaction_id": transaction_id}),
            )
            .await?;
        Ok(reply.into_verdict())
    }

    async fn release_storage_cell(
        &self,
        domain: &str,
        cell: &StorageCell,
        transaction_id: &str,
        strict: bool,
    ) -> Result<StorageVerdict, BackendError> {
        let domain: StorageDomain = domain.parse()?;
        let reply: StorageReply = self
            .post(
                STORAGE_RELEASE_ENDPOINT,
                &json!({
                    "domain": domain,
                    "cell": cell,
                    "transaction_id": transaction_id,
                    "strict_domain": strict,
                }),
            )
            .await?;
        Ok(reply.into_verdict())
    }

    async fn integration_ui_method(
        &self,
        method: &str,
        body: Map<String, Value>,
    ) -> Result<UiResponse, BackendError> {
        let reply: UiMethodReply = self
            .post(
                INTEGRATION_UI_METHOD_ENDPOINT,
                &json!({"method": method, "body": body}),
            )
            .await?;
        Ok(UiResponse {
            http_status: reply.http_status,
            body: reply.body,
        })
    }
}
