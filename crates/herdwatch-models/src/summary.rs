//! Aggregate cow counts returned per request.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::posture::Posture;

/// Aggregated posture counts for one image.
///
/// `total` is only ever incremented together with one of the posture
/// counters, so `total == standing + laying` holds at all times.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CountSummary {
    #[serde(rename = "total_cows")]
    total: u64,
    #[serde(rename = "standing_cows")]
    standing: u64,
    #[serde(rename = "laying_cows")]
    laying: u64,
}

impl CountSummary {
    /// An empty summary (valid response for images with no cows).
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one classified detection.
    pub fn record(&mut self, posture: Posture) {
        match posture {
            Posture::Standing => self.standing += 1,
            Posture::Laying => self.laying += 1,
        }
        self.total += 1;
    }

    /// Fold an iterator of postures into a summary.
    pub fn from_postures<I: IntoIterator<Item = Posture>>(postures: I) -> Self {
        let mut summary = Self::new();
        for posture in postures {
            summary.record(posture);
        }
        summary
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn standing(&self) -> u64 {
        self.standing
    }

    pub fn laying(&self) -> u64 {
        self.laying
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_summary() {
        let summary = CountSummary::new();
        assert_eq!(summary.total(), 0);
        assert_eq!(summary.standing(), 0);
        assert_eq!(summary.laying(), 0);
    }

    #[test]
    fn test_total_tracks_posture_counters() {
        let mut summary = CountSummary::new();
        summary.record(Posture::Standing);
        summary.record(Posture::Laying);
        summary.record(Posture::Laying);

        assert_eq!(summary.total(), 3);
        assert_eq!(summary.standing(), 1);
        assert_eq!(summary.laying(), 2);
        assert_eq!(summary.total(), summary.standing() + summary.laying());
    }

    #[test]
    fn test_from_postures() {
        let summary = CountSummary::from_postures([
            Posture::Standing,
            Posture::Standing,
            Posture::Laying,
        ]);
        assert_eq!(summary.total(), 3);
        assert_eq!(summary.standing(), 2);
        assert_eq!(summary.laying(), 1);
    }

    #[test]
    fn test_wire_field_names() {
        let summary = CountSummary::from_postures([Posture::Standing, Posture::Laying]);
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["total_cows"], 2);
        assert_eq!(json["standing_cows"], 1);
        assert_eq!(json["laying_cows"], 1);
    }
}
