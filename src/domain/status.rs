//! Status vocabulary for items, bags and events.
//!
//! Statuses are stored as plain strings; these enums are the single
//! place that knows which strings are valid and which transitions the
//! rule engine allows.

use super::errors::ApiError;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ItemStatus {
    Available,
    InBag,
    OnEvent,
    Lost,
    Maintenance,
}

impl ItemStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            ItemStatus::Available => "available",
            ItemStatus::InBag => "in-bag",
            ItemStatus::OnEvent => "on-event",
            ItemStatus::Lost => "lost",
            ItemStatus::Maintenance => "maintenance",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ApiError> {
        match s {
            "available" => Ok(ItemStatus::Available),
            "in-bag" => Ok(ItemStatus::InBag),
            "on-event" => Ok(ItemStatus::OnEvent),
            "lost" => Ok(ItemStatus::Lost),
            "maintenance" => Ok(ItemStatus::Maintenance),
            other => Err(ApiError::Validation(format!(
                "Invalid item status: {}",
                other
            ))),
        }
    }

    /// An item holds a bag reference exactly while it is packed or out
    /// on an event.
    pub fn requires_bag(self) -> bool {
        matches!(self, ItemStatus::InBag | ItemStatus::OnEvent)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BagStatus {
    Available,
    OnEvent,
}

impl BagStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            BagStatus::Available => "available",
            BagStatus::OnEvent => "on-event",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ApiError> {
        match s {
            "available" => Ok(BagStatus::Available),
            "on-event" => Ok(BagStatus::OnEvent),
            other => Err(ApiError::Validation(format!(
                "Invalid bag status: {}",
                other
            ))),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EventStatus {
    Active,
    Completed,
}

impl EventStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            EventStatus::Active => "active",
            EventStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ApiError> {
        match s {
            "active" => Ok(EventStatus::Active),
            "completed" => Ok(EventStatus::Completed),
            other => Err(ApiError::Validation(format!(
                "Invalid event status: {}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_status_round_trips() {
        for s in ["available", "in-bag", "on-event", "lost", "maintenance"] {
            assert_eq!(ItemStatus::parse(s).unwrap().as_str(), s);
        }
        assert!(ItemStatus::parse("borrowed").is_err());
    }

    #[test]
    fn bag_reference_follows_status() {
        assert!(ItemStatus::InBag.requires_bag());
        assert!(ItemStatus::OnEvent.requires_bag());
        assert!(!ItemStatus::Available.requires_bag());
        assert!(!ItemStatus::Lost.requires_bag());
        assert!(!ItemStatus::Maintenance.requires_bag());
    }
}
