use std::collections::BTreeSet;

use geo::{distance_meters, Coordinate, PROXIMITY_THRESHOLD_M};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Entered,
    Left,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProximityChange {
    pub site_id: String,
    pub transition: Transition,
    pub distance_m: f64,
}

/// Edge-triggered range detector. A site produces one `Entered` when it comes
/// into range and one `Left` when it drops out; ticks in between are silent.
#[derive(Debug, Clone)]
pub struct ProximityTracker {
    threshold_m: f64,
    triggered: BTreeSet<String>,
}

impl Default for ProximityTracker {
    fn default() -> Self {
        Self::new(PROXIMITY_THRESHOLD_M)
    }
}

impl ProximityTracker {
    pub fn new(threshold_m: f64) -> Self {
        Self {
            threshold_m,
            triggered: BTreeSet::new(),
        }
    }

    pub fn threshold_m(&self) -> f64 {
        self.threshold_m
    }

    pub fn is_triggered(&self, site_id: &str) -> bool {
        self.triggered.contains(site_id)
    }

    pub fn triggered(&self) -> impl Iterator<Item = &str> {
        self.triggered.iter().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.triggered.clear();
    }

    /// Evaluates every site against `position` in the order given. Sites are
    /// independent, so one call may report entries and exits together.
    pub fn evaluate<'a, I>(&mut self, position: Coordinate, sites: I) -> Vec<ProximityChange>
    where
        I: IntoIterator<Item = (&'a str, Coordinate)>,
    {
        let mut changes = Vec::new();

        for (site_id, site_position) in sites {
            let distance_m = distance_meters(position, site_position);
            let in_range = distance_m <= self.threshold_m;
            let was_triggered = self.triggered.contains(site_id);

            let transition = match (in_range, was_triggered) {
                (true, false) => {
                    self.triggered.insert(site_id.to_owned());
                    Transition::Entered
                }
                (false, true) => {
                    self.triggered.remove(site_id);
                    Transition::Left
                }
                _ => continue,
            };

            changes.push(ProximityChange {
                site_id: site_id.to_owned(),
                transition,
                distance_m,
            });
        }

        changes
    }
}
