//! Time control over the morph frames of an animated point cloud.

use glam::Vec3;
use itertools::izip;

use crate::globe::point_cloud::Frame;

/// Clamps `t` to [0, 1]. NaN and infinities rewind to the first frame.
fn clamp_time(t: f32) -> f32 {
    if t.is_finite() {
        t.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Influence of every frame at time `t`. Padding frames always get 0, and at most two
/// neighbouring real frames share the unit weight.
pub fn frame_weights(frames: &[Frame], t: f32) -> Vec<f32> {
    let mut weights = vec![0.0; frames.len()];

    let real: Vec<usize> = frames
        .iter()
        .enumerate()
        .filter(|(_, frame)| !frame.padding)
        .map(|(i, _)| i)
        .collect();

    if real.is_empty() {
        return weights;
    }

    let t = clamp_time(t);
    let last = (real.len() - 1) as f32;
    let scaled = t * last + 1.0;
    let index = scaled.floor() as usize;
    let leftover = scaled - index as f32;

    if let Some(&previous) = index.checked_sub(1).and_then(|i| real.get(i)) {
        weights[previous] = 1.0 - leftover;
    }
    if let Some(&current) = real.get(index) {
        weights[current] = leftover;
    }

    weights
}

/// `base + Σ w (frame - base)` for every vertex.
pub fn blend_positions(base: &[Vec3], frames: &[Frame], weights: &[f32]) -> Vec<Vec3> {
    let mut positions = base.to_vec();

    for (frame, &weight) in frames.iter().zip(weights) {
        if weight == 0.0 {
            continue;
        }
        for (position, target, origin) in izip!(positions.iter_mut(), &frame.positions, base) {
            *position += (*target - *origin) * weight;
        }
    }

    positions
}

/// Current animation time and the weights derived from it.
#[derive(Debug, Clone, Default)]
pub struct MorphState {
    time: f32,
    weights: Vec<f32>,
}

impl MorphState {
    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Stores the clamped time and recomputes the weights for `frames`.
    pub fn set_time(&mut self, frames: &[Frame], t: f32) {
        self.time = clamp_time(t);
        self.weights = frame_weights(frames, self.time);
    }
}
