// Tracker platform HTTP client.
//
// Wraps `reqwest::Client` with the platform's calling convention: every
// authenticated endpoint is a form POST carrying `token`, `u_hash`, and a
// JSON-encoded `data` field, and every response uses the
// `{ code, message, data }` envelope. All methods return unwrapped `data`
// payloads -- the envelope is stripped before the caller sees it.

use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::{
    AuthGrant, Envelope, NotificationDto, NotificationListData, PaymentOrder,
    SubscriptionCreatedData, SubscriptionDto, SubscriptionListData, TrackerBoundData, TrackerDto,
    TrackerListData,
};
use crate::transport::TransportConfig;

/// Async client for the tracker platform API.
pub struct TrackerClient {
    http: reqwest::Client,
    base_url: Url,
}

impl TrackerClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` is the platform root (e.g. `https://api.geoblink.example`).
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// The platform base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Authentication ───────────────────────────────────────────────

    /// Begin SMS login: asks the platform to text a one-time code.
    pub async fn request_code(&self, phone: &str) -> Result<(), Error> {
        debug!(phone, "requesting login code");
        let form = [("phone", phone)];
        let _: Envelope<serde_json::Value> = self.post_form("auth", &form).await?;
        Ok(())
    }

    /// Complete SMS login with the received code, yielding a token pair.
    pub async fn confirm_code(&self, phone: &str, code: &str) -> Result<AuthGrant, Error> {
        debug!(phone, "confirming login code");
        let form = [("phone", phone), ("code", code)];
        let env: Envelope<AuthGrant> = self.post_form("token", &form).await?;
        unwrap_data(env)
    }

    // ── Tracker data ─────────────────────────────────────────────────

    /// List all trackers bound to the authenticated account.
    pub async fn list_trackers(
        &self,
        token: &SecretString,
        hash: &SecretString,
    ) -> Result<Vec<TrackerDto>, Error> {
        let env: Envelope<TrackerListData> = self
            .post_authed("trackers", token, hash, json!({}))
            .await?;
        let data = unwrap_data(env)?;
        debug!(count = data.trackers.len(), "tracker list fetched");
        Ok(data.trackers)
    }

    /// List notification feed entries for the authenticated account.
    pub async fn list_notifications(
        &self,
        token: &SecretString,
        hash: &SecretString,
    ) -> Result<Vec<NotificationDto>, Error> {
        let env: Envelope<NotificationListData> = self
            .post_authed("notifications", token, hash, json!({}))
            .await?;
        let data = unwrap_data(env)?;
        Ok(data.items)
    }

    /// Bind a tracker to the authenticated account by its 15-digit IMEI.
    pub async fn bind_tracker(
        &self,
        token: &SecretString,
        hash: &SecretString,
        imei: &str,
        name: Option<&str>,
    ) -> Result<TrackerDto, Error> {
        debug!(imei, "binding tracker");
        let env: Envelope<TrackerBoundData> = self
            .post_authed("bind", token, hash, json!({ "imei": imei, "name": name }))
            .await?;
        let data = unwrap_data(env)?;
        Ok(data.tracker)
    }

    // ── Subscriptions & payments ─────────────────────────────────────

    /// List subscriptions attached to the authenticated account.
    pub async fn list_subscriptions(
        &self,
        token: &SecretString,
        hash: &SecretString,
    ) -> Result<Vec<SubscriptionDto>, Error> {
        let env: Envelope<SubscriptionListData> = self
            .post_authed("subscriptions", token, hash, json!({}))
            .await?;
        let data = unwrap_data(env)?;
        Ok(data.subscription)
    }

    /// Open an auto-renewing subscription on a tariff, returning its id.
    pub async fn create_subscription(
        &self,
        token: &SecretString,
        hash: &SecretString,
        tariff: &str,
    ) -> Result<String, Error> {
        debug!(tariff, "creating subscription");
        let data = json!({ "tariff": tariff, "autoRenew": 1 });
        let env: Envelope<SubscriptionCreatedData> =
            self.post_authed("subscription", token, hash, data).await?;
        let data = unwrap_data(env)?;
        Ok(data.subs_id)
    }

    /// Create a payment order, optionally tied to a subscription.
    ///
    /// `sum` is a decimal amount in rubles as the platform expects it
    /// ("199.00"). The returned order carries the provider checkout URL.
    pub async fn create_payment(
        &self,
        token: &SecretString,
        hash: &SecretString,
        sum: &str,
        subs_id: Option<&str>,
    ) -> Result<PaymentOrder, Error> {
        debug!(sum, "creating payment order");
        let data = json!({
            "sum": sum,
            "currency": "RUB",
            "paymentService": 1,
            "subsId": subs_id,
            "paymentWay": 2,
        });
        let env: Envelope<PaymentOrder> = self.post_authed("payment", token, hash, data).await?;
        unwrap_data(env)
    }

    // ── Transport mechanics ──────────────────────────────────────────

    /// POST an unauthenticated form and decode the envelope.
    async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &[(&str, &str)],
    ) -> Result<Envelope<T>, Error> {
        let url = self.base_url.join(path)?;
        let resp = self.http.post(url).form(form).send().await?;
        decode_envelope(resp).await
    }

    /// POST an authenticated form: `token`, `u_hash`, and JSON `data`.
    async fn post_authed<T: DeserializeOwned>(
        &self,
        path: &str,
        token: &SecretString,
        hash: &SecretString,
        data: serde_json::Value,
    ) -> Result<Envelope<T>, Error> {
        let url = self.base_url.join(path)?;
        let form = [
            ("token", token.expose_secret()),
            ("u_hash", hash.expose_secret()),
            ("data", &data.to_string()),
        ];
        let resp = self.http.post(url).form(&form).send().await?;
        decode_envelope(resp).await
    }
}

/// Decode a response body into an envelope, keeping the raw body on failure.
async fn decode_envelope<T: DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<Envelope<T>, Error> {
    let body = resp.text().await?;
    serde_json::from_str(&body).map_err(|e| Error::Deserialization {
        message: e.to_string(),
        body,
    })
}

/// Unwrap the envelope, translating non-"200" codes into errors.
fn unwrap_data<T>(env: Envelope<T>) -> Result<T, Error> {
    match env.code.as_str() {
        "200" => env.data.ok_or_else(|| Error::Deserialization {
            message: "envelope code 200 but no data".into(),
            body: String::new(),
        }),
        "401" | "403" => Err(Error::SessionExpired),
        code => Err(Error::Platform {
            code: code.to_owned(),
            message: env.message.unwrap_or_else(|| "request rejected".into()),
        }),
    }
}
