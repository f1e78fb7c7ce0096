//! Dataset files: a JSON array of `[name, [lat, lng, magnitude, ...]]` series.

use std::path::Path;

use anyhow::{bail, Context};
use serde::Deserialize;

use crate::globe::point_cloud::{AddDataOptions, DataFormat, PointCloudBuilder};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Series(pub String, pub Vec<f32>);

impl Series {
    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn values(&self) -> &[f32] {
        &self.1
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Dataset {
    pub series: Vec<Series>,
}

impl Dataset {
    pub fn parse(source: &str) -> anyhow::Result<Self> {
        let dataset: Dataset = serde_json::from_str(source).context("Invalid dataset JSON")?;
        if dataset.series.is_empty() {
            bail!("Dataset contains no series");
        }
        Ok(dataset)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read dataset {}", path.display()))?;
        Self::parse(&source).with_context(|| format!("Failed to load dataset {}", path.display()))
    }

    pub fn is_animated(&self) -> bool {
        self.series.len() > 1
    }

    /// Adds every series in order: as named morph frames when there are several, otherwise
    /// as a static cloud.
    pub fn add_to(&self, builder: &mut PointCloudBuilder, format: DataFormat) -> anyhow::Result<()> {
        let animated = self.is_animated();

        for series in &self.series {
            log::info!(
                "Adding series {} ({} values)",
                series.name(),
                series.values().len()
            );

            builder
                .add_data(
                    series.values(),
                    &AddDataOptions {
                        format,
                        animated,
                        name: Some(series.name().to_string()),
                    },
                )
                .with_context(|| format!("Invalid series {}", series.name()))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_series() {
        let dataset =
            Dataset::parse(r#"[["1990", [10, 20, 0.5, -5, 3.5, 0.1]], ["1995", [10, 20, 0.2, -5, 3.5, 0.3]]]"#)
                .unwrap();

        assert_eq!(dataset.series.len(), 2);
        assert_eq!(dataset.series[0].name(), "1990");
        assert_eq!(dataset.series[1].values(), &[10.0, 20.0, 0.2, -5.0, 3.5, 0.3]);
        assert!(dataset.is_animated());
    }

    #[test]
    fn multiple_series_become_frames() {
        let dataset =
            Dataset::parse(r#"[["a", [0, 0, 0.5]], ["b", [0, 0, 0.7]], ["c", [0, 0, 0.9]]]"#).unwrap();
        let mut builder = PointCloudBuilder::default();
        dataset.add_to(&mut builder, DataFormat::Magnitude).unwrap();

        let names: Vec<&str> = builder.frames().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn single_series_is_static() {
        let dataset = Dataset::parse(r#"[["only", [0, 0, 0.5]]]"#).unwrap();
        let mut builder = PointCloudBuilder::default();
        dataset.add_to(&mut builder, DataFormat::Magnitude).unwrap();

        assert!(builder.frames().is_empty());
        assert!(!builder.create_points().unwrap().is_animated());
    }

    #[test]
    fn rejects_malformed_files() {
        assert!(Dataset::parse("[]").is_err());
        assert!(Dataset::parse(r#"{"a": [1, 2, 3]}"#).is_err());
        assert!(Dataset::parse(r#"[["a", [1, "x", 3]]]"#).is_err());

        let dataset = Dataset::parse(r#"[["a", [1, 2]]]"#).unwrap();
        let error = dataset
            .add_to(&mut PointCloudBuilder::default(), DataFormat::Magnitude)
            .unwrap_err();
        assert!(format!("{error:#}").contains("Invalid series a"));
    }
}
