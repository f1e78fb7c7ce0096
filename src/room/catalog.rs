//! The furniture placed in the room on start.

use std::path::{Path, PathBuf};

use glam::Vec3;

use crate::{color::Color, rendering::lighting::PointLight, scene_graph::Transform};

/// Point light that belongs to a piece of furniture, placed relative to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttachedLight {
    pub offset: Vec3,
    pub color: Color,
    pub intensity: f32,
    pub range: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FurnitureAsset {
    pub name: &'static str,
    /// Texture loaded before the model and used for materials without a map.
    pub preload_texture: Option<&'static str>,
    pub position: Vec3,
    /// XYZ Euler angles in radians.
    pub rotation: Vec3,
    pub scale: Vec3,
    pub draggable: bool,
    pub light: Option<AttachedLight>,
}

const fn asset(name: &'static str, position: Vec3, scale: Vec3) -> FurnitureAsset {
    FurnitureAsset {
        name,
        preload_texture: None,
        position,
        rotation: Vec3::ZERO,
        scale,
        draggable: false,
        light: None,
    }
}

impl FurnitureAsset {
    const fn draggable(mut self) -> Self {
        self.draggable = true;
        self
    }

    const fn rotated(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    const fn textured(mut self, texture: &'static str) -> Self {
        self.preload_texture = Some(texture);
        self
    }

    const fn with_light(mut self, light: AttachedLight) -> Self {
        self.light = Some(light);
        self
    }

    pub fn obj_path(&self, asset_dir: &Path) -> PathBuf {
        asset_dir.join("models").join(format!("{}.obj", self.name))
    }

    pub fn mtl_path(&self, asset_dir: &Path) -> PathBuf {
        asset_dir.join("models").join(format!("{}.mtl", self.name))
    }

    pub fn texture_path(&self, asset_dir: &Path) -> Option<PathBuf> {
        self.preload_texture
            .map(|texture| asset_dir.join("models").join(texture))
    }

    pub fn transform(&self) -> Transform {
        Transform::from_euler(self.position, self.rotation, self.scale)
    }

    pub fn point_light(&self) -> Option<PointLight> {
        self.light.map(|light| PointLight {
            position: self.position + light.offset,
            color: light.color,
            intensity: light.intensity,
            range: light.range,
        })
    }
}

const STREET_LAMP_LIGHT: AttachedLight = AttachedLight {
    offset: Vec3::new(1.0, 10.0, 4.0),
    color: Color::new(1.0, 1.0, 0.0),
    intensity: 1.0,
    range: 10.0,
};

pub const CATALOG: [FurnitureAsset; 12] = [
    asset("house_empty", Vec3::new(100.0, -1.0, -20.0), Vec3::new(1.5, 2.5, 1.5))
        .textured("Wood.jpg"),
    asset("tv_stand", Vec3::new(-28.0, -1.0, 2.0), Vec3::new(0.1, 0.1, 0.12)).draggable(),
    asset("tv", Vec3::new(-20.0, 1.0, 30.0), Vec3::splat(0.01))
        .rotated(Vec3::new(0.0, 3.2, 0.0))
        .draggable(),
    asset("bed", Vec3::new(-20.0, -1.0, 10.0), Vec3::splat(0.05)),
    asset("cybertruck", Vec3::new(40.0, -2.0, 0.0), Vec3::splat(3.0)),
    asset("lamp_street_2", Vec3::new(35.0, -3.0, 15.0), Vec3::splat(0.5))
        .rotated(Vec3::new(0.0, -1.5, 0.0))
        .with_light(STREET_LAMP_LIGHT),
    asset("table", Vec3::new(-16.0, 0.1, -13.0), Vec3::ONE)
        .textured("Wood.jpg")
        .draggable(),
    asset("grass", Vec3::new(11.5, -6.5, 2.8), Vec3::splat(0.5))
        .rotated(Vec3::new(1.55, 3.15, 0.0))
        .textured("grass_texture/grass.jpg"),
    asset("chair1", Vec3::new(10.0, 3.0, -10.0), Vec3::splat(7.0))
        .textured("study_chair_cm.jpg")
        .draggable(),
    asset("chair2", Vec3::new(-16.0, -1.0, -20.0), Vec3::splat(0.1))
        .textured("wood.jpg")
        .draggable(),
    asset("table1", Vec3::new(20.0, -2.0, -10.0), Vec3::ONE)
        .textured("greytable.jpg")
        .draggable(),
    asset("flower-vase", Vec3::new(20.0, 1.0, 10.0), Vec3::ONE)
        .textured("dead_in_a_vase_by_textureific.jpg")
        .draggable(),
];

pub fn find(name: &str) -> Option<&'static FurnitureAsset> {
    CATALOG.iter().find(|asset| asset.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_unique() {
        for (i, asset) in CATALOG.iter().enumerate() {
            assert!(
                CATALOG[i + 1..].iter().all(|other| other.name != asset.name),
                "{} is listed twice",
                asset.name
            );
        }
    }

    #[test]
    fn paths_follow_asset_name() {
        let tv = find("tv").unwrap();
        let dir = Path::new("assets");

        assert_eq!(tv.obj_path(dir), Path::new("assets/models/tv.obj"));
        assert_eq!(tv.mtl_path(dir), Path::new("assets/models/tv.mtl"));
        assert_eq!(tv.texture_path(dir), None);
        assert_eq!(
            find("grass").unwrap().texture_path(dir),
            Some(PathBuf::from("assets/models/grass_texture/grass.jpg"))
        );
    }

    #[test]
    fn draggable_furniture() {
        let draggable: Vec<_> = CATALOG
            .iter()
            .filter(|asset| asset.draggable)
            .map(|asset| asset.name)
            .collect();

        assert_eq!(
            draggable,
            ["tv_stand", "tv", "table", "chair1", "chair2", "table1", "flower-vase"]
        );
    }

    #[test]
    fn street_lamp_light_is_placed_above_the_lamp() {
        let light = find("lamp_street_2").unwrap().point_light().unwrap();

        assert_eq!(light.position, Vec3::new(36.0, 7.0, 19.0));
        assert_eq!(light.range, 10.0);
        assert!(find("bed").unwrap().point_light().is_none());
    }

    #[test]
    fn transform_uses_catalog_values() {
        let house = find("house_empty").unwrap().transform();

        assert_eq!(house.translation(), Vec3::new(100.0, -1.0, -20.0));
        assert_eq!(house.scale(), Vec3::new(1.5, 2.5, 1.5));
    }
}
