// Outbound control requests (media keys, updater) over plain HTTP.
//
// The channel is read-mostly; commands that change backend state go
// through short POSTs against the same host.

use serde::de::DeserializeOwned;
use url::Url;

use crate::error::Error;
use crate::protocol::UpdaterPayload;
use crate::transport::TransportConfig;

/// A backend command with no request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum ControlRequest {
    PreviousTrack,
    NextTrack,
    TogglePlayback,
    CheckForUpdate,
    ConfirmUpdate,
}

impl ControlRequest {
    /// Endpoint path relative to the backend base URL.
    pub fn path(self) -> &'static str {
        match self {
            Self::PreviousTrack => "media/previous",
            Self::NextTrack => "media/next",
            Self::TogglePlayback => "media/play-pause",
            Self::CheckForUpdate => "updater/check",
            Self::ConfirmUpdate => "updater/update",
        }
    }
}

/// HTTP client for [`ControlRequest`]s.
#[derive(Debug, Clone)]
pub struct ControlClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ControlClient {
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        Ok(Self::from_reqwest(base_url, transport.build_client()?))
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn from_reqwest(mut base_url: Url, http: reqwest::Client) -> Self {
        // `Url::join` drops the last segment unless the path ends in '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Fire a command and wait for the backend to acknowledge it.
    pub async fn send(&self, request: ControlRequest) -> Result<(), Error> {
        let url = self.base_url.join(request.path())?;
        tracing::debug!(%request, url = %url, "Sending control request");
        self.http.post(url).send().await?.error_for_status()?;
        Ok(())
    }

    /// Ask the backend to look for an update and return its answer.
    ///
    /// The same result is also pushed over the channel as an `updater`
    /// envelope; this is for callers that want it synchronously.
    pub async fn check_for_update(&self) -> Result<UpdaterPayload, Error> {
        self.post_json(ControlRequest::CheckForUpdate).await
    }

    async fn post_json<T: DeserializeOwned>(&self, request: ControlRequest) -> Result<T, Error> {
        let url = self.base_url.join(request.path())?;
        tracing::debug!(%request, url = %url, "Sending control request");
        let body = self
            .http
            .post(url)
            .send()
            .await?
            .error_for_status()?
            .json::<T>()
            .await?;
        Ok(body)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn every_request_has_a_distinct_path() {
        let mut paths: Vec<&str> = ControlRequest::iter().map(ControlRequest::path).collect();
        paths.sort_unstable();
        paths.dedup();
        assert_eq!(paths.len(), 5);
    }

    #[test]
    fn base_url_keeps_its_prefix() {
        let base = Url::parse("http://localhost:8000/api").unwrap();
        let client = ControlClient::from_reqwest(base, reqwest::Client::new());
        let url = client.base_url().join(ControlRequest::NextTrack.path()).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/media/next");
    }
}
