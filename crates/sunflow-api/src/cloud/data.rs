// Device-data retrieval
//
// `POST /v1.0/device/latest` with bearer authorization. Returns the raw
// wire response; `sunflow-core::convert` turns it into a Snapshot.

use serde_json::json;
use tracing::debug;

use crate::cloud::CloudClient;
use crate::cloud::models::DeviceLatestResponse;
use crate::error::{Error, body_preview};

impl CloudClient {
    /// Fetch the latest readings for the configured device serial.
    ///
    /// Obtains a token first (cached when possible), then posts the
    /// single-element `deviceList`. A non-200 status is a data-fetch
    /// error; an empty `deviceDataList` is *not* -- the conversion
    /// layer degrades that to an empty snapshot.
    pub async fn latest_data(&self) -> Result<DeviceLatestResponse, Error> {
        let token = self.get_token().await?;
        self.latest_data_with_token(&token).await
    }

    /// Same as [`latest_data`](Self::latest_data) with a caller-supplied token.
    pub async fn latest_data_with_token(
        &self,
        token: &str,
    ) -> Result<DeviceLatestResponse, Error> {
        let url = self.api_url("/v1.0/device/latest")?;
        debug!("POST {}", url);

        let body = json!({ "deviceList": [self.credentials.device_serial] });

        let resp = self
            .http
            .post(url)
            .header("authorization", format!("Bearer {token}"))
            .json(&body)
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if status != reqwest::StatusCode::OK {
            let text = resp.text().await.unwrap_or_default();
            return Err(Error::CloudApi {
                status: status.as_u16(),
                message: body_preview(&text).to_owned(),
            });
        }

        let text = resp.text().await.map_err(Error::Transport)?;
        let result: DeviceLatestResponse =
            serde_json::from_str(&text).map_err(|e| Error::Deserialization {
                message: format!("{e} (body preview: {:?})", body_preview(&text)),
            })?;

        debug!(devices = result.device_data_list.len(), "received device data");
        Ok(result)
    }
}
