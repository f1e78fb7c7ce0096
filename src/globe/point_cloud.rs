//! Builds the merged box mesh for data points, with optional morph frames.

use std::{fmt, str::FromStr};

use anyhow::bail;
use glam::Vec3;

use crate::{
    color::{default_color_fn, Color, ColorFn},
    globe::projection::{ProjectedPoint, BOX_INDICES},
    model::{Material, Model, Vertex},
};

/// Multiplier from data magnitude to box height.
pub const POINT_SIZE_SCALE: f32 = 200.0;
/// Animated clouds always carry at least this many morph frames.
pub const MIN_MORPH_FRAMES: usize = 8;

const VERTICES_PER_POINT: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataFormat {
    /// `lat, lng, magnitude` triples, colored by magnitude.
    #[default]
    Magnitude,
    /// `lat, lng, magnitude, legend` quadruples, colored by legend value.
    Legend,
}

impl DataFormat {
    pub fn stride(self) -> usize {
        match self {
            DataFormat::Magnitude => 3,
            DataFormat::Legend => 4,
        }
    }
}

impl FromStr for DataFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "magnitude" => Ok(DataFormat::Magnitude),
            "legend" => Ok(DataFormat::Legend),
            other => bail!("format not supported: {other}"),
        }
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataFormat::Magnitude => write!(f, "magnitude"),
            DataFormat::Legend => write!(f, "legend"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AddDataOptions {
    pub format: DataFormat,
    pub animated: bool,
    pub name: Option<String>,
}

/// One morph target: a full set of vertex positions for the cloud.
#[derive(Debug, Clone)]
pub struct Frame {
    pub name: String,
    pub positions: Vec<Vec3>,
    /// Filler frame that only repeats the base layout.
    pub padding: bool,
}

/// A finalized cloud ready to be turned into a mesh.
#[derive(Debug, Clone)]
pub struct PointCloud {
    pub base: Vec<Vec3>,
    pub colors: Vec<Color>,
    pub frames: Vec<Frame>,
}

impl PointCloud {
    pub fn point_count(&self) -> usize {
        self.base.len() / VERTICES_PER_POINT
    }

    pub fn is_animated(&self) -> bool {
        !self.frames.is_empty()
    }

    pub fn real_frames(&self) -> impl Iterator<Item = &Frame> {
        self.frames.iter().filter(|frame| !frame.padding)
    }

    pub fn vertices(&self, positions: &[Vec3]) -> Vec<Vertex> {
        positions
            .iter()
            .zip(&self.colors)
            .enumerate()
            .map(|(i, (position, color))| {
                // Normal points away from the middle of the box the vertex belongs to
                let first = i - i % VERTICES_PER_POINT;
                let center = positions[first..first + VERTICES_PER_POINT]
                    .iter()
                    .sum::<Vec3>()
                    / VERTICES_PER_POINT as f32;

                Vertex {
                    color: color.to_vec3(),
                    ..Vertex::new(
                        *position,
                        (*position - center).normalize_or(Vec3::Y),
                        glam::Vec2::ZERO,
                    )
                }
            })
            .collect()
    }

    pub fn indices(&self) -> Vec<u32> {
        (0..self.point_count() as u32)
            .flat_map(|point| {
                BOX_INDICES
                    .iter()
                    .map(move |index| point * VERTICES_PER_POINT as u32 + index)
            })
            .collect()
    }

    /// Mesh of the cloud with the given (possibly blended) positions.
    pub fn to_model(&self, positions: &[Vec3]) -> Model {
        Model::new("Points").with_primitive(
            self.vertices(positions),
            self.indices(),
            Material {
                name: "Points".to_string(),
                unlit: true,
                ..Default::default()
            },
        )
    }
}

pub struct PointCloudBuilder {
    color_fn: ColorFn,
    base: Option<Vec<ProjectedPoint>>,
    frames: Vec<Frame>,
    animated_calls: usize,
}

impl PointCloudBuilder {
    pub fn new(color_fn: ColorFn) -> Self {
        Self {
            color_fn,
            base: None,
            frames: Vec::new(),
            animated_calls: 0,
        }
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn has_data(&self) -> bool {
        self.base.is_some()
    }

    fn parse_points(&self, data: &[f32], format: DataFormat) -> anyhow::Result<Vec<ProjectedPoint>> {
        let stride = format.stride();
        if data.len() % stride != 0 {
            bail!(
                "{} values do not form whole {format} records of {stride}",
                data.len()
            );
        }

        Ok(data
            .chunks_exact(stride)
            .map(|record| {
                let value = match format {
                    DataFormat::Magnitude => record[2],
                    DataFormat::Legend => record[3],
                };
                ProjectedPoint {
                    lat: record[0],
                    lng: record[1],
                    size: record[2] * POINT_SIZE_SCALE,
                    color: (self.color_fn)(value),
                }
            })
            .collect())
    }

    pub fn add_data(&mut self, data: &[f32], options: &AddDataOptions) -> anyhow::Result<()> {
        let points = self.parse_points(data, options.format)?;

        if !options.animated {
            self.base = Some(points);
            self.frames.clear();
            self.animated_calls = 0;
            return Ok(());
        }

        if let Some(base) = &self.base {
            if base.len() != points.len() {
                bail!(
                    "animated data has {} points but the base layout has {}",
                    points.len(),
                    base.len()
                );
            }
        } else {
            self.base = Some(
                points
                    .iter()
                    .map(|point| ProjectedPoint { size: 0.0, ..*point })
                    .collect(),
            );
        }

        let name = options
            .name
            .clone()
            .unwrap_or_else(|| format!("morphTarget{}", self.animated_calls));
        self.animated_calls += 1;

        self.frames.push(Frame {
            name,
            positions: point_positions(&points),
            padding: false,
        });

        Ok(())
    }

    /// Finalizes the cloud. Returns `None` when no data has been added.
    pub fn create_points(&mut self) -> Option<PointCloud> {
        let base = self.base.as_ref()?;
        let base_positions = point_positions(base);

        if !self.frames.is_empty() && self.frames.len() < MIN_MORPH_FRAMES {
            let padding = MIN_MORPH_FRAMES - self.frames.len();
            log::info!("Padding point cloud with {} morph frames", padding);

            for i in 0..padding {
                self.frames.push(Frame {
                    name: format!("morphPadding{i}"),
                    positions: base_positions.clone(),
                    padding: true,
                });
            }
        }

        let colors = base
            .iter()
            .flat_map(|point| std::iter::repeat(point.color).take(VERTICES_PER_POINT))
            .collect();

        Some(PointCloud {
            base: base_positions,
            colors,
            frames: self.frames.clone(),
        })
    }
}

impl Default for PointCloudBuilder {
    fn default() -> Self {
        Self::new(default_color_fn())
    }
}

fn point_positions(points: &[ProjectedPoint]) -> Vec<Vec3> {
    points.iter().flat_map(|point| point.corners()).collect()
}
