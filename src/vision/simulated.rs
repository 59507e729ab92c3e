//! Offline detector used when no vision service is configured

use crate::simulation::SimulationResult;
use crate::vision::{BoundingPoly, DetectedObject, DetectionRequest, DetectionResponse, VisionDetector};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// Labels the simulated detector chooses from
pub const SIMULATED_LABELS: &[&str] = &["Snack", "Drink", "Fruit", "Vegetable", "Bread", "Canned Item"];

/// Returns one to three random boxes per valid image
#[derive(Debug, Clone)]
pub struct SimulatedVisionDetector {
    rng: StdRng,
    max_objects: usize,
}

impl SimulatedVisionDetector {
    /// Detector seeded for reproducible output
    pub fn seeded(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed), max_objects: 3 }
    }

    /// Detector seeded from entropy
    pub fn from_entropy() -> Self {
        Self { rng: StdRng::from_entropy(), max_objects: 3 }
    }

    fn random_object(&mut self) -> DetectedObject {
        // boxes span a twentieth to a third of the frame on each axis
        let width = self.rng.gen_range(0.05..0.34);
        let height = self.rng.gen_range(0.05..0.34);
        let x = self.rng.gen_range(0.0..1.0 - width);
        let y = self.rng.gen_range(0.0..1.0 - height);
        let label = SIMULATED_LABELS.choose(&mut self.rng).copied().unwrap_or("Snack");
        DetectedObject::new(label, self.rng.gen_range(0.7..1.0), BoundingPoly::from_box(x, y, width, height))
    }
}

impl VisionDetector for SimulatedVisionDetector {
    fn detect(&mut self, request: &DetectionRequest) -> SimulationResult<DetectionResponse> {
        request.validate()?;
        let count = self.rng.gen_range(1..=self.max_objects);
        let objects: Vec<DetectedObject> = (0..count).map(|_| self.random_object()).collect();
        debug!(objects = objects.len(), "simulated detection");
        Ok(DetectionResponse { objects })
    }
}
