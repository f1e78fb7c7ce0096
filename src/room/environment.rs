//! Day/night state, the lights that go with it and the floor texture choice.

use std::path::{Path, PathBuf};

use glam::Vec3;

use crate::{
    color::Color,
    rendering::{
        common::Background,
        lighting::{DirectionalLight, Lighting, PointLight},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FloorTexture {
    #[default]
    Floor1,
    Wood4,
    Wood5,
    Wood6,
    Wood7,
    Wood8,
    GreyBrick,
    Brick1,
    Brick2,
}

impl FloorTexture {
    pub const ALL: [FloorTexture; 9] = [
        FloorTexture::Floor1,
        FloorTexture::Wood4,
        FloorTexture::Wood5,
        FloorTexture::Wood6,
        FloorTexture::Wood7,
        FloorTexture::Wood8,
        FloorTexture::GreyBrick,
        FloorTexture::Brick1,
        FloorTexture::Brick2,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FloorTexture::Floor1 => "floor1",
            FloorTexture::Wood4 => "wood4",
            FloorTexture::Wood5 => "wood5",
            FloorTexture::Wood6 => "wood6",
            FloorTexture::Wood7 => "wood7",
            FloorTexture::Wood8 => "wood8",
            FloorTexture::GreyBrick => "greybrick",
            FloorTexture::Brick1 => "brick1",
            FloorTexture::Brick2 => "brick2",
        }
    }

    fn file_name(self) -> String {
        let extension = match self {
            FloorTexture::Wood6 | FloorTexture::Wood8 => "png",
            _ => "jpg",
        };
        format!("{}.{}", self.name(), extension)
    }

    pub fn path(self, asset_dir: &Path) -> PathBuf {
        asset_dir.join("img").join(self.file_name())
    }

    pub fn index(self) -> usize {
        Self::ALL
            .iter()
            .position(|&texture| texture == self)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeOfDay {
    #[default]
    Night,
    Noon,
}

impl TimeOfDay {
    pub fn toggled(self) -> Self {
        match self {
            TimeOfDay::Night => TimeOfDay::Noon,
            TimeOfDay::Noon => TimeOfDay::Night,
        }
    }

    pub fn background_dir(self, asset_dir: &Path) -> PathBuf {
        let name = match self {
            TimeOfDay::Night => "night",
            TimeOfDay::Noon => "noon",
        };
        asset_dir.join("bg").join(name)
    }
}

/// White light from straight above, only on at night.
const NIGHT_LIGHT: DirectionalLight = DirectionalLight {
    direction: Vec3::Y,
    color: Color::WHITE,
    intensity: 0.5,
};

#[derive(Debug, Clone, Default)]
pub struct Environment {
    pub time_of_day: TimeOfDay,
    pub floor: FloorTexture,
    /// Follows the light cube around.
    pub cube_light: Option<PointLight>,
    /// Lights that came with furniture.
    pub fixed_lights: Vec<PointLight>,
}

impl Environment {
    pub fn toggle_time_of_day(&mut self) {
        self.time_of_day = self.time_of_day.toggled();
        log::info!("Switched to {:?}", self.time_of_day);
    }

    pub fn move_cube_light(&mut self, position: Vec3) {
        if let Some(light) = &mut self.cube_light {
            light.position = position;
        }
    }

    pub fn lighting(&self) -> Lighting {
        let (ambient, directional) = match self.time_of_day {
            TimeOfDay::Night => (Color::BLACK, Some(NIGHT_LIGHT)),
            TimeOfDay::Noon => (Color::WHITE, None),
        };

        Lighting {
            ambient,
            directional,
            point_lights: self
                .cube_light
                .iter()
                .chain(&self.fixed_lights)
                .copied()
                .collect(),
        }
    }

    pub fn background(&self, asset_dir: &Path) -> Background {
        Background::cube_map(self.time_of_day.background_dir(asset_dir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn light_at(position: Vec3) -> PointLight {
        PointLight {
            position,
            color: Color::WHITE,
            intensity: 1.0,
            range: 100.0,
        }
    }

    #[test]
    fn starts_at_night_with_directional_light() {
        let environment = Environment::default();
        let lighting = environment.lighting();

        assert_eq!(environment.time_of_day, TimeOfDay::Night);
        assert_eq!(lighting.ambient, Color::BLACK);
        assert_eq!(lighting.directional, Some(NIGHT_LIGHT));
    }

    #[test]
    fn toggle_swaps_lights_and_background() {
        let mut environment = Environment::default();
        let dir = Path::new("assets");
        let night_background = environment.background(dir);

        environment.toggle_time_of_day();
        let lighting = environment.lighting();
        assert_eq!(lighting.ambient, Color::WHITE);
        assert_eq!(lighting.directional, None);
        assert_eq!(
            environment.background(dir).cube_map,
            Some(PathBuf::from("assets/bg/noon"))
        );

        environment.toggle_time_of_day();
        assert_eq!(environment.background(dir), night_background);
        assert_eq!(night_background.cube_map, Some(PathBuf::from("assets/bg/night")));
    }

    #[test]
    fn cube_light_follows_and_comes_first() {
        let mut environment = Environment {
            cube_light: Some(light_at(Vec3::ZERO)),
            fixed_lights: vec![light_at(Vec3::ONE)],
            ..Default::default()
        };

        environment.move_cube_light(Vec3::new(3.0, 0.0, -2.0));

        let lights = environment.lighting().point_lights;
        assert_eq!(lights.len(), 2);
        assert_eq!(lights[0].position, Vec3::new(3.0, 0.0, -2.0));
        assert_eq!(lights[1].position, Vec3::ONE);
    }

    #[test]
    fn floor_texture_files() {
        let dir = Path::new("assets");

        assert_eq!(FloorTexture::Floor1.path(dir), Path::new("assets/img/floor1.jpg"));
        assert_eq!(FloorTexture::Wood6.path(dir), Path::new("assets/img/wood6.png"));
        assert_eq!(FloorTexture::Wood8.path(dir), Path::new("assets/img/wood8.png"));
        assert_eq!(FloorTexture::Brick2.index(), 8);
    }
}
