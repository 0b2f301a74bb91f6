// Wire models for the tracker platform API.
//
// Every response arrives in a `{ code, message, data }` envelope where
// `code == "200"` means success. Numeric fields are sent inconsistently
// (sometimes as JSON numbers, sometimes as strings), so coordinate and
// charge fields go through a tolerant deserializer.

use serde::{Deserialize, Deserializer, Serialize};

/// The platform's standard response envelope.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Envelope<T> {
    pub code: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<T>,
}

/// Token pair returned after a confirmed SMS login.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthGrant {
    pub token: String,
    pub u_hash: String,
}

/// A tracker record as the platform sends it.
///
/// Coordinates may be absent (device never reported a fix) or out of
/// range (GPS glitches); validity is decided by the consumer, not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerDto {
    pub imei: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub lat: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub lng: Option<f64>,
    /// Vehicle registration plate, free-form.
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub online: Option<bool>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub charge: Option<f64>,
    /// Last position report, unix seconds.
    #[serde(default)]
    pub updated: Option<i64>,
}

/// A notification feed entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationDto {
    pub imei: String,
    pub time: i64,
    #[serde(rename = "type")]
    pub kind: String,
}

/// A paid subscription attached to the account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionDto {
    #[serde(rename = "subsId")]
    pub subs_id: String,
    #[serde(default)]
    pub tariff: Option<String>,
    /// Paid-until timestamp, unix seconds.
    #[serde(default, rename = "paidTill")]
    pub paid_till: Option<i64>,
    /// 1 = renews automatically, 0 = expires.
    #[serde(default, rename = "autoRenew")]
    pub auto_renew: Option<i64>,
}

/// A freshly created payment order awaiting checkout.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentOrder {
    #[serde(rename = "pId")]
    pub payment_id: String,
    /// Provider checkout URL the payment is completed at.
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TrackerListData {
    #[serde(default)]
    pub trackers: Vec<TrackerDto>,
}

#[derive(Debug, Deserialize)]
pub struct TrackerBoundData {
    pub tracker: TrackerDto,
}

#[derive(Debug, Deserialize)]
pub struct SubscriptionListData {
    #[serde(default)]
    pub subscription: Vec<SubscriptionDto>,
}

#[derive(Debug, Deserialize)]
pub struct SubscriptionCreatedData {
    #[serde(rename = "subsId")]
    pub subs_id: String,
}

#[derive(Debug, Deserialize)]
pub struct NotificationListData {
    #[serde(default)]
    pub items: Vec<NotificationDto>,
}

/// Accept a JSON number, a numeric string, or null.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(f64),
        Text(String),
        Null,
    }

    match Raw::deserialize(deserializer)? {
        Raw::Num(n) => Ok(Some(n)),
        Raw::Text(s) if s.trim().is_empty() => Ok(None),
        Raw::Text(s) => Ok(s.trim().parse().ok()),
        Raw::Null => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracker_coordinates_accept_strings_and_numbers() {
        let json = r#"{"imei":"860000000000001","lat":"55.75","lng":37.61}"#;
        let dto: TrackerDto = serde_json::from_str(json).expect("valid tracker");
        assert_eq!(dto.lat, Some(55.75));
        assert_eq!(dto.lng, Some(37.61));
    }

    #[test]
    fn tracker_blank_coordinate_is_none() {
        let json = r#"{"imei":"860000000000001","lat":"","lng":null}"#;
        let dto: TrackerDto = serde_json::from_str(json).expect("valid tracker");
        assert_eq!(dto.lat, None);
        assert_eq!(dto.lng, None);
    }

    #[test]
    fn envelope_carries_error_message() {
        let json = r#"{"code":"403","message":"bad hash"}"#;
        let env: Envelope<TrackerListData> = serde_json::from_str(json).expect("valid envelope");
        assert_eq!(env.code, "403");
        assert_eq!(env.message.as_deref(), Some("bad hash"));
        assert!(env.data.is_none());
    }
}
