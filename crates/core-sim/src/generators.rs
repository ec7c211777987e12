use geo::Coordinate;

const STEP_SCALE: f64 = 0.002;
const LAT_RATE: f64 = 0.6;
const LNG_RATE: f64 = 0.4;
const WEAVE_FREQUENCY: f64 = 0.1;
const WEAVE_AMPLITUDE: f64 = 0.0005;

/// Deterministic ambulance route: a straight north-east drift with a small
/// sinusoidal weave in longitude.
#[derive(Debug, Clone)]
pub struct SyntheticPath {
    origin: Coordinate,
    step: u64,
}

impl SyntheticPath {
    pub fn new(origin: Coordinate) -> Self {
        Self { origin, step: 0 }
    }

    pub fn origin(&self) -> Coordinate {
        self.origin
    }

    pub fn step(&self) -> u64 {
        self.step
    }

    pub fn next_position(&mut self) -> Coordinate {
        self.step += 1;
        position_at(self.origin, self.step)
    }

    pub fn reset(&mut self) {
        self.step = 0;
    }
}

pub fn position_at(origin: Coordinate, step: u64) -> Coordinate {
    let step = step as f64;
    let t = step * STEP_SCALE;

    Coordinate {
        lat: origin.lat + t * LAT_RATE,
        lng: origin.lng + t * LNG_RATE + (step * WEAVE_FREQUENCY).sin() * WEAVE_AMPLITUDE,
    }
}
