//! Storage credentials
//!
//! Parses storage connection strings and authorizes blob requests, either by
//! signing them with the account key (Shared Key) or by appending a shared
//! access signature to the query.

use std::fmt;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use hmac::{Hmac, Mac};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Method, Request, Url};
use sha2::Sha256;

use crate::error::{ClientError, Result};

/// Storage service version sent with every signed request
pub const STORAGE_VERSION: &str = "2021-08-06";

const DEV_ACCOUNT: &str = "devstoreaccount1";
const DEV_ACCOUNT_KEY: &str =
    "Eby8vdM02xNOcqFlqUwJPLlmEtlCDXJ1OUzFT50uSRZ6IFsuFq2UVErCz4I6tq/K1SZFPTOtr/KBHBeksoGMGw==";
const DEV_BLOB_ENDPOINT: &str = "http://127.0.0.1:10000/devstoreaccount1";

/// Standard headers that take part in the Shared Key string-to-sign, in order
const SIGNED_HEADERS: [&str; 11] = [
    "content-encoding",
    "content-language",
    "content-length",
    "content-md5",
    "content-type",
    "date",
    "if-modified-since",
    "if-match",
    "if-none-match",
    "if-unmodified-since",
    "range",
];

/// How blob requests are authorized
#[derive(Clone)]
pub enum StorageCredential {
    /// Account name and decoded account key
    SharedKey {
        account: String,
        key: Vec<u8>,
        blob_endpoint: Url,
    },
    /// Shared access signature query string, without the leading `?`
    SharedAccessSignature { blob_endpoint: Url, token: String },
}

impl StorageCredential {
    /// Parse a storage connection string
    ///
    /// Recognized keys: `DefaultEndpointsProtocol`, `AccountName`,
    /// `AccountKey`, `EndpointSuffix`, `BlobEndpoint`, `SharedAccessSignature`
    /// and `UseDevelopmentStorage`.
    ///
    /// # Example
    /// ```
    /// use bes_client::StorageCredential;
    ///
    /// let credential = StorageCredential::from_connection_string(
    ///     "DefaultEndpointsProtocol=https;AccountName=acct;AccountKey=a2V5",
    /// ).unwrap();
    /// assert_eq!(credential.blob_endpoint().as_str(), "https://acct.blob.core.windows.net/");
    /// ```
    pub fn from_connection_string(connection_string: &str) -> Result<Self> {
        let mut protocol = "https";
        let mut account = None;
        let mut account_key = None;
        let mut suffix = "core.windows.net";
        let mut blob_endpoint = None;
        let mut sas = None;
        let mut development = false;

        for part in connection_string.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = part.split_once('=').ok_or_else(|| {
                ClientError::InvalidCredential(format!("expected key=value, found '{}'", part))
            })?;

            match key.to_ascii_lowercase().as_str() {
                "defaultendpointsprotocol" => protocol = value,
                "accountname" => account = Some(value),
                "accountkey" => account_key = Some(value),
                "endpointsuffix" => suffix = value,
                "blobendpoint" => blob_endpoint = Some(value),
                "sharedaccesssignature" => sas = Some(value),
                "usedevelopmentstorage" => development = value.eq_ignore_ascii_case("true"),
                _ => {}
            }
        }

        if development {
            return Self::shared_key(DEV_ACCOUNT, DEV_ACCOUNT_KEY, DEV_BLOB_ENDPOINT);
        }

        if let Some(token) = sas {
            let endpoint = match (blob_endpoint, account) {
                (Some(endpoint), _) => endpoint.to_string(),
                (None, Some(account)) => format!("{}://{}.blob.{}", protocol, account, suffix),
                (None, None) => {
                    return Err(ClientError::InvalidCredential(
                        "SharedAccessSignature needs BlobEndpoint or AccountName".to_string(),
                    ));
                }
            };
            return Ok(Self::SharedAccessSignature {
                blob_endpoint: parse_endpoint(&endpoint)?,
                token: token.trim_start_matches('?').to_string(),
            });
        }

        let account = account.ok_or_else(|| {
            ClientError::InvalidCredential("connection string has no AccountName".to_string())
        })?;
        let account_key = account_key.ok_or_else(|| {
            ClientError::InvalidCredential("connection string has no AccountKey".to_string())
        })?;
        let endpoint = blob_endpoint
            .map(str::to_string)
            .unwrap_or_else(|| format!("{}://{}.blob.{}", protocol, account, suffix));

        Self::shared_key(account, account_key, &endpoint)
    }

    fn shared_key(account: &str, encoded_key: &str, endpoint: &str) -> Result<Self> {
        let key = BASE64.decode(encoded_key).map_err(|e| {
            ClientError::InvalidCredential(format!("AccountKey is not valid base64: {}", e))
        })?;

        Ok(Self::SharedKey {
            account: account.to_string(),
            key,
            blob_endpoint: parse_endpoint(endpoint)?,
        })
    }

    /// Base URL of the blob service
    pub fn blob_endpoint(&self) -> &Url {
        match self {
            Self::SharedKey { blob_endpoint, .. } => blob_endpoint,
            Self::SharedAccessSignature { blob_endpoint, .. } => blob_endpoint,
        }
    }

    /// Authorize a fully built request
    ///
    /// Shared Key requests must already carry every header that is sent,
    /// including `x-ms-date` and `x-ms-version`.
    pub fn authorize(&self, request: &mut Request) -> Result<()> {
        match self {
            Self::SharedKey { account, key, .. } => {
                let to_sign =
                    string_to_sign(request.method(), request.url(), request.headers(), account);
                let signature = sign(key, &to_sign)?;
                let value = HeaderValue::from_str(&format!("SharedKey {}:{}", account, signature))
                    .map_err(|e| ClientError::InvalidCredential(e.to_string()))?;
                request.headers_mut().insert(AUTHORIZATION, value);
            }
            Self::SharedAccessSignature { token, .. } => {
                let url = request.url_mut();
                let query = match url.query() {
                    Some(existing) if !existing.is_empty() => format!("{}&{}", existing, token),
                    _ => token.clone(),
                };
                url.set_query(Some(&query));
            }
        }
        Ok(())
    }
}

impl FromStr for StorageCredential {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_connection_string(s)
    }
}

impl fmt::Debug for StorageCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SharedKey {
                account,
                blob_endpoint,
                ..
            } => f
                .debug_struct("SharedKey")
                .field("account", account)
                .field("blob_endpoint", &blob_endpoint.as_str())
                .field("key", &"<redacted>")
                .finish(),
            Self::SharedAccessSignature { blob_endpoint, .. } => f
                .debug_struct("SharedAccessSignature")
                .field("blob_endpoint", &blob_endpoint.as_str())
                .field("token", &"<redacted>")
                .finish(),
        }
    }
}

fn parse_endpoint(endpoint: &str) -> Result<Url> {
    let url = Url::parse(endpoint).map_err(|e| {
        ClientError::InvalidCredential(format!("invalid blob endpoint '{}': {}", endpoint, e))
    })?;
    if url.cannot_be_a_base() {
        return Err(ClientError::InvalidCredential(format!(
            "blob endpoint '{}' cannot be a base URL",
            endpoint
        )));
    }
    Ok(url)
}

/// Build the Shared Key string-to-sign for a blob service request
pub(crate) fn string_to_sign(
    method: &Method,
    url: &Url,
    headers: &HeaderMap,
    account: &str,
) -> String {
    let mut out = String::new();
    out.push_str(method.as_str());
    out.push('\n');

    for name in SIGNED_HEADERS {
        let value = headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        // A zero length is signed as an empty string
        if !(name == "content-length" && value == "0") {
            out.push_str(value);
        }
        out.push('\n');
    }

    let mut ms_headers: Vec<(String, &str)> = headers
        .iter()
        .filter(|(name, _)| name.as_str().starts_with("x-ms-"))
        .map(|(name, value)| (name.as_str().to_string(), value.to_str().unwrap_or_default().trim()))
        .collect();
    ms_headers.sort_by(|a, b| a.0.cmp(&b.0));
    for (name, value) in ms_headers {
        out.push_str(&name);
        out.push(':');
        out.push_str(value);
        out.push('\n');
    }

    out.push('/');
    out.push_str(account);
    out.push_str(url.path());

    let mut params: Vec<(String, String)> = Vec::new();
    for (name, value) in url.query_pairs() {
        let name = name.to_lowercase();
        match params.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, values)) => {
                values.push(',');
                values.push_str(&value);
            }
            None => params.push((name, value.into_owned())),
        }
    }
    params.sort_by(|a, b| a.0.cmp(&b.0));
    for (name, value) in params {
        out.push('\n');
        out.push_str(&name);
        out.push(':');
        out.push_str(&value);
    }

    out
}

fn sign(key: &[u8], to_sign: &str) -> Result<String> {
    let mut mac = Hmac::<Sha256>::new_from_slice(key)
        .map_err(|e| ClientError::InvalidCredential(e.to_string()))?;
    mac.update(to_sign.as_bytes());
    Ok(BASE64.encode(mac.finalize().into_bytes()))
}
