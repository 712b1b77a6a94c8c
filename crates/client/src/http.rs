//! HTTP implementation of the pod client.

use async_trait::async_trait;
use podfs_common::PodUri;
use reqwest::header::ACCEPT;
use reqwest::{Response, StatusCode};

use crate::error::ClientError;
use crate::parse::parse_containment;
use crate::traits::PodClient;
use crate::types::FolderListing;

/// `PodClient` implementation over HTTP.
///
/// Authentication is cookie-based: `login` posts form credentials to the
/// identity provider once and the cookie store carries the session for all
/// subsequent requests. Unauthenticated access to public pods works without
/// calling `login` at all.
pub struct HttpPodClient {
    http: reqwest::Client,
}

impl HttpPodClient {
    /// Create a client with an empty cookie store.
    pub fn new() -> Result<Self, ClientError> {
        let http: reqwest::Client = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|e| ClientError::Network {
                uri: String::new(),
                message: e.to_string(),
            })?;
        Ok(Self { http })
    }

    /// Log in against an identity provider.
    ///
    /// Posts `username`/`password` as a form to the provider's
    /// `/login/password` endpoint; on success the session cookie lives in
    /// the client's cookie store.
    ///
    /// # Arguments
    /// * `idp` - Identity provider base URI
    /// * `username` - Account name
    /// * `password` - Account password
    pub async fn login(
        &self,
        idp: &str,
        username: &str,
        password: &str,
    ) -> Result<(), ClientError> {
        let endpoint = format!("{}/login/password", idp.trim_end_matches('/'));
        tracing::debug!(endpoint = %endpoint, username = %username, "logging in");

        let response: Response = self
            .http
            .post(&endpoint)
            .form(&[("username", username), ("password", password)])
            .send()
            .await
            .map_err(|e| ClientError::LoginFailed {
                idp: idp.to_string(),
                message: e.to_string(),
            })?;

        let status: StatusCode = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(ClientError::LoginFailed {
                idp: idp.to_string(),
                message: format!("status {status}"),
            });
        }
        Ok(())
    }

    fn network_error(uri: &PodUri, err: reqwest::Error) -> ClientError {
        ClientError::Network {
            uri: uri.to_string(),
            message: err.to_string(),
        }
    }

    fn check_status(uri: &PodUri, status: StatusCode) -> Result<(), ClientError> {
        if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
            return Err(ClientError::NotFound {
                uri: uri.to_string(),
            });
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ClientError::AccessDenied {
                uri: uri.to_string(),
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            return Err(ClientError::UnexpectedStatus {
                uri: uri.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl PodClient for HttpPodClient {
    async fn read_folder(&self, uri: &PodUri) -> Result<FolderListing, ClientError> {
        tracing::debug!(uri = %uri, "read_folder");
        let response: Response = self
            .http
            .get(uri.as_str())
            .header(ACCEPT, "text/turtle")
            .send()
            .await
            .map_err(|e| Self::network_error(uri, e))?;

        Self::check_status(uri, response.status())?;
        let body: String = response
            .text()
            .await
            .map_err(|e| Self::network_error(uri, e))?;
        parse_containment(uri, &body)
    }

    async fn get(&self, uri: &PodUri) -> Result<Vec<u8>, ClientError> {
        tracing::debug!(uri = %uri, "get");
        let response: Response = self
            .http
            .get(uri.as_str())
            .send()
            .await
            .map_err(|e| Self::network_error(uri, e))?;

        Self::check_status(uri, response.status())?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| Self::network_error(uri, e))?;
        Ok(bytes.to_vec())
    }

    async fn put_file(
        &self,
        uri: &PodUri,
        data: &[u8],
        media_type: &str,
    ) -> Result<(), ClientError> {
        tracing::debug!(uri = %uri, bytes = data.len(), media_type = %media_type, "put_file");
        let response: Response = self
            .http
            .put(uri.as_str())
            .header(reqwest::header::CONTENT_TYPE, media_type)
            .body(data.to_vec())
            .send()
            .await
            .map_err(|e| Self::network_error(uri, e))?;

        Self::check_status(uri, response.status())
    }
}
