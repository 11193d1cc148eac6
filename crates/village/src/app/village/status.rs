use serde::Deserialize;
use tracing::debug;

use super::avatar::AvatarState;
use super::layout::VillageLayout;
use super::status_source::StatusChannel;

/// Polled status document. Every field is optional and unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub(crate) struct StatusDocument {
    #[serde(default)]
    pub(crate) location: Option<String>,
    #[serde(default)]
    pub(crate) zone: Option<String>,
    #[serde(default)]
    pub(crate) building: Option<String>,
    #[serde(default)]
    pub(crate) activity: Option<String>,
    #[serde(default)]
    pub(crate) floor: Option<String>,
}

impl StatusDocument {
    pub(crate) fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// `location`, then `zone`, then `building`.
    pub(crate) fn location_key(&self) -> Option<&str> {
        self.location
            .as_deref()
            .or(self.zone.as_deref())
            .or(self.building.as_deref())
    }
}

/// What one status document asks the scene to do, in application order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct StatusUpdate {
    pub(crate) switch_floor: Option<usize>,
    pub(crate) move_to: Option<String>,
    pub(crate) activity: Option<String>,
    pub(crate) unknown_floor: Option<String>,
    pub(crate) unknown_location: Option<String>,
}

impl StatusUpdate {
    pub(crate) fn is_noop(&self) -> bool {
        self.switch_floor.is_none() && self.move_to.is_none() && self.activity.is_none()
    }
}

pub(crate) fn plan_status_update(
    layout: &VillageLayout,
    active_floor: usize,
    avatar: &AvatarState,
    document: &StatusDocument,
) -> StatusUpdate {
    let mut update = StatusUpdate::default();

    if let Some(floor_key) = document.floor.as_deref() {
        match layout.floor_index(floor_key) {
            Some(index) if index != active_floor => update.switch_floor = Some(index),
            Some(_) => {}
            None => update.unknown_floor = Some(floor_key.to_string()),
        }
    }

    let target_floor = update.switch_floor.unwrap_or(active_floor);
    if let (Some(key), Some(floor)) = (document.location_key(), layout.floor(target_floor)) {
        // A floor switch places the avatar on the new floor's first location.
        let current_key = if update.switch_floor.is_some() {
            floor.locations.first().key.as_str()
        } else {
            avatar.current_location_key.as_str()
        };
        if !floor.locations.contains(key) {
            update.unknown_location = Some(key.to_string());
        } else if key != current_key {
            update.move_to = Some(key.to_string());
        }
    }

    update.activity = document
        .activity
        .as_deref()
        .filter(|activity| !activity.is_empty())
        .map(ToString::to_string);
    update
}

/// Issues one status read per period and hands back whatever documents arrived.
pub(crate) struct StatusPoller {
    period_seconds: f32,
    elapsed_seconds: f32,
    channel: Box<dyn StatusChannel>,
}

impl StatusPoller {
    pub(crate) fn new(period_seconds: f32, channel: Box<dyn StatusChannel>) -> Self {
        Self {
            period_seconds: period_seconds.max(f32::EPSILON),
            elapsed_seconds: 0.0,
            channel,
        }
    }

    pub(crate) fn tick(&mut self, dt_seconds: f32) -> Vec<StatusDocument> {
        self.elapsed_seconds += dt_seconds;
        if self.elapsed_seconds >= self.period_seconds {
            self.elapsed_seconds %= self.period_seconds;
            if !self.channel.request() {
                debug!("status_poll_skipped_in_flight");
            }
        }

        let mut documents = Vec::new();
        for result in self.channel.drain() {
            match result {
                Ok(document) => documents.push(document),
                Err(error) => debug!(error = %error, "status_fetch_failed"),
            }
        }
        documents
    }
}
