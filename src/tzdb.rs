// Timezone database handed to the dispatcher at startup. Wraps the
// chrono-tz bundled IANA data so no system tzdata is required, and lets
// tests substitute a fixed subset of zones.
use chrono_tz::Tz;

use crate::error::TimeError;

pub struct ZoneDb {
    zones: Vec<Tz>,
}

impl ZoneDb {
    /// All zones from the bundled IANA database, sorted by name.
    pub fn bundled() -> Self {
        Self::with_zones(chrono_tz::TZ_VARIANTS.to_vec())
    }

    pub fn with_zones(mut zones: Vec<Tz>) -> Self {
        zones.sort_by_key(|z| z.name());
        ZoneDb { zones }
    }

    /// Looks up an IANA name. Resolution is against this database's
    /// contents, not ambient process state.
    pub fn resolve(&self, name: &str) -> Result<Tz, TimeError> {
        self.zones
            .iter()
            .find(|z| z.name() == name)
            .copied()
            .ok_or_else(|| TimeError::InvalidTimezone(name.to_string()))
    }

    /// Sorted zone names, optionally restricted by a case-insensitive
    /// substring match. Recomputed on every call.
    pub fn names(&self, filter_text: Option<&str>) -> Vec<&'static str> {
        let filter = filter_text.map(str::to_lowercase);
        self.zones
            .iter()
            .map(|z| z.name())
            .filter(|name| match &filter {
                Some(f) => name.to_lowercase().contains(f),
                None => true,
            })
            .collect()
    }
}
