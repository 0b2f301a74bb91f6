// ── Wire-to-domain conversion ──
//
// Translates geoblink-api DTOs into the canonical model types. Nothing
// here validates coordinates: out-of-range fixes are preserved so the
// cache reflects what the platform sent, and the map layer decides what
// is actually mappable.

use chrono::DateTime;

use geoblink_api::{NotificationDto, TrackerDto};

use crate::model::{Coordinates, Device, Imei, NotificationItem};

impl From<TrackerDto> for Device {
    fn from(dto: TrackerDto) -> Self {
        let position = match (dto.lat, dto.lng) {
            (Some(lat), Some(lng)) => Some(Coordinates::new(lat, lng)),
            _ => None,
        };

        let imei = Imei::from(dto.imei);
        // Unnamed trackers fall back to their IMEI for display.
        let name = dto
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| imei.as_str().to_owned());

        Self {
            imei,
            name,
            position,
            registration_plate: dto.number.unwrap_or_default(),
            online: dto.online.unwrap_or(false),
            battery_pct: dto.charge,
            last_seen: dto.updated.and_then(|t| DateTime::from_timestamp(t, 0)),
        }
    }
}

impl From<NotificationDto> for NotificationItem {
    fn from(dto: NotificationDto) -> Self {
        Self {
            imei: Imei::from(dto.imei),
            time: DateTime::from_timestamp(dto.time, 0).unwrap_or_default(),
            kind: dto.kind,
        }
    }
}
