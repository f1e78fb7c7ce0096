//! Wavefront OBJ and MTL reading for the room editor's furniture.
//!
//! Handles the common subset: `v`, `vt`, `vn`, `f` (fan-triangulated, negative indices),
//! `usemtl`, `mtllib`, and `newmtl`/`Kd`/`map_Kd` in material libraries. Each material
//! used by the OBJ becomes one primitive of the resulting model.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{bail, Context};
use glam::{Vec2, Vec3};

use crate::{
    color::Color,
    model::{ImageData, Material, Model, Vertex},
};

#[derive(Debug, Clone, PartialEq)]
pub struct ObjMaterial {
    pub name: String,
    pub diffuse_color: Color,
    pub diffuse_texture: Option<String>,
}

impl Default for ObjMaterial {
    fn default() -> Self {
        Self {
            name: String::new(),
            diffuse_color: Color::WHITE,
            diffuse_texture: None,
        }
    }
}

#[derive(Debug, Default)]
pub struct ObjGroup {
    pub material: Option<String>,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    lookup: HashMap<VertexKey, u32>,
}

#[derive(Debug, Default)]
pub struct ObjData {
    pub groups: Vec<ObjGroup>,
    pub material_libraries: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct VertexKey {
    position: usize,
    tex_coords: Option<usize>,
    normal: Option<usize>,
}

fn parse_floats<const N: usize>(tokens: &mut std::str::SplitWhitespace, line: usize) -> anyhow::Result<[f32; N]> {
    let mut values = [0.0; N];
    for value in values.iter_mut() {
        let token = tokens
            .next()
            .with_context(|| format!("line {line}: expected {N} numbers"))?;
        *value = token
            .parse()
            .with_context(|| format!("line {line}: invalid number {token:?}"))?;
    }
    Ok(values)
}

fn resolve_index(token: &str, len: usize, line: usize) -> anyhow::Result<usize> {
    let index: i64 = token
        .parse()
        .with_context(|| format!("line {line}: invalid index {token:?}"))?;

    let resolved = match index {
        i if i > 0 => i - 1,
        i if i < 0 => len as i64 + i,
        _ => bail!("line {line}: index 0 is not valid"),
    };

    if resolved < 0 || resolved as usize >= len {
        bail!("line {line}: index {index} out of range ({len} elements)");
    }

    Ok(resolved as usize)
}

pub fn parse_obj(source: &str) -> anyhow::Result<ObjData> {
    let mut positions: Vec<Vec3> = Vec::new();
    let mut tex_coords: Vec<Vec2> = Vec::new();
    let mut normals: Vec<Vec3> = Vec::new();

    let mut data = ObjData::default();
    let mut current: Option<usize> = None;

    for (line_index, line) in source.lines().enumerate() {
        let line_number = line_index + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut tokens = line.split_whitespace();
        let Some(tag) = tokens.next() else {
            continue;
        };

        match tag {
            "v" => positions.push(Vec3::from_array(parse_floats(&mut tokens, line_number)?)),
            "vt" => {
                let [u, v] = parse_floats(&mut tokens, line_number)?;
                // OBJ puts v = 0 at the bottom of the image
                tex_coords.push(Vec2::new(u, 1.0 - v));
            }
            "vn" => normals.push(Vec3::from_array(parse_floats(&mut tokens, line_number)?)),
            "mtllib" => data
                .material_libraries
                .extend(tokens.map(String::from)),
            "usemtl" => {
                let name = tokens.next().map(String::from);
                current = Some(
                    match data.groups.iter().position(|group| group.material == name) {
                        Some(index) => index,
                        None => {
                            data.groups.push(ObjGroup {
                                material: name,
                                ..Default::default()
                            });
                            data.groups.len() - 1
                        }
                    },
                );
            }
            "f" => {
                let group_index = match current {
                    Some(index) => index,
                    None => {
                        data.groups.push(ObjGroup::default());
                        let index = data.groups.len() - 1;
                        current = Some(index);
                        index
                    }
                };

                let mut keys = Vec::new();
                for token in tokens {
                    let mut parts = token.split('/');
                    let position = resolve_index(parts.next().unwrap_or(""), positions.len(), line_number)?;
                    let tex_coord = match parts.next() {
                        Some(part) if !part.is_empty() => {
                            Some(resolve_index(part, tex_coords.len(), line_number)?)
                        }
                        _ => None,
                    };
                    let normal = match parts.next() {
                        Some(part) if !part.is_empty() => {
                            Some(resolve_index(part, normals.len(), line_number)?)
                        }
                        _ => None,
                    };
                    keys.push(VertexKey {
                        position,
                        tex_coords: tex_coord,
                        normal,
                    });
                }

                if keys.len() < 3 {
                    bail!("line {line_number}: face with fewer than three vertices");
                }

                let face_normal = {
                    let [a, b, c] = [keys[0], keys[1], keys[2]].map(|key| positions[key.position]);
                    (b - a).cross(c - a).normalize_or_zero()
                };

                let group = &mut data.groups[group_index];
                let face: Vec<u32> = keys
                    .iter()
                    .map(|key| {
                        *group.lookup.entry(*key).or_insert_with(|| {
                            let vertex = Vertex::new(
                                positions[key.position],
                                key.normal.map_or(face_normal, |index| normals[index]),
                                key.tex_coords.map_or(Vec2::ZERO, |index| tex_coords[index]),
                            );
                            group.vertices.push(vertex);
                            group.vertices.len() as u32 - 1
                        })
                    })
                    .collect();

                for i in 1..face.len() - 1 {
                    group.indices.extend_from_slice(&[face[0], face[i], face[i + 1]]);
                }
            }
            // Groups, objects, smoothing groups and other statements don't affect the mesh
            _ => {}
        }
    }

    data.groups.retain(|group| !group.indices.is_empty());
    Ok(data)
}

pub fn parse_mtl(source: &str) -> HashMap<String, ObjMaterial> {
    let mut materials = HashMap::new();
    let mut current: Option<ObjMaterial> = None;

    for line in source.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut tokens = line.split_whitespace();
        let tag = tokens.next().unwrap_or("");

        match tag {
            "newmtl" => {
                if let Some(previous) = current.take() {
                    materials.insert(previous.name.clone(), previous);
                }
                current = Some(ObjMaterial {
                    name: tokens.next().unwrap_or("").to_string(),
                    ..Default::default()
                });
            }
            "Kd" => {
                if let Some(material) = current.as_mut() {
                    let mut channel = || tokens.next().and_then(|t| t.parse().ok()).unwrap_or(0.8);
                    material.diffuse_color = Color::new(channel(), channel(), channel());
                }
            }
            "map_Kd" => {
                if let Some(material) = current.as_mut() {
                    // Options such as -s come before the file name, which is last
                    material.diffuse_texture = tokens.last().map(String::from);
                }
            }
            _ => {}
        }
    }

    if let Some(previous) = current.take() {
        materials.insert(previous.name.clone(), previous);
    }

    materials
}

/// Loads an OBJ with its MTL library. `fallback_texture` is used for materials without
/// a diffuse map of their own.
pub fn load_model(
    name: &str,
    obj_path: &Path,
    mtl_path: Option<&Path>,
    fallback_texture: Option<Arc<ImageData>>,
) -> anyhow::Result<Model> {
    let source = std::fs::read_to_string(obj_path)
        .with_context(|| format!("Failed to read OBJ file {}", obj_path.display()))?;
    let data = parse_obj(&source).with_context(|| format!("Failed to parse {}", obj_path.display()))?;

    let base_dir = obj_path.parent().map(Path::to_path_buf).unwrap_or_default();
    let mtl_paths: Vec<PathBuf> = match mtl_path {
        Some(path) => vec![path.to_path_buf()],
        None => data
            .material_libraries
            .iter()
            .map(|library| base_dir.join(library))
            .collect(),
    };

    let mut materials = HashMap::new();
    let mut texture_dirs = HashMap::new();
    for path in &mtl_paths {
        match std::fs::read_to_string(path) {
            Ok(source) => {
                let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
                for (key, material) in parse_mtl(&source) {
                    texture_dirs.insert(key.clone(), dir.clone());
                    materials.insert(key, material);
                }
            }
            Err(e) => log::warn!("Missing material library {}: {}", path.display(), e),
        }
    }

    let mut textures: HashMap<PathBuf, Option<Arc<ImageData>>> = HashMap::new();
    let mut model = Model::new(name);

    for group in data.groups {
        let obj_material = group
            .material
            .as_ref()
            .and_then(|name| materials.get(name))
            .cloned()
            .unwrap_or_default();

        let texture = match &obj_material.diffuse_texture {
            Some(file) => {
                let dir = texture_dirs
                    .get(&obj_material.name)
                    .cloned()
                    .unwrap_or_else(|| base_dir.clone());
                let path = dir.join(file);
                textures
                    .entry(path.clone())
                    .or_insert_with(|| match ImageData::load(&path) {
                        Ok(image) => Some(Arc::new(image)),
                        Err(e) => {
                            log::warn!("{:#}", e);
                            None
                        }
                    })
                    .clone()
                    .or_else(|| fallback_texture.clone())
            }
            None => fallback_texture.clone(),
        };

        model.add_primitive(
            group.vertices,
            group.indices,
            Material {
                name: obj_material.name,
                base_color: obj_material.diffuse_color,
                texture,
                unlit: false,
            },
        );
    }

    if model.primitives.is_empty() {
        bail!("{} contains no faces", obj_path.display());
    }

    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD: &str = "
# a unit quad split across two materials
mtllib quad.mtl
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 0 1
usemtl red
f 1/1/1 2/2/1 3/3/1 4/4/1
usemtl blue
f -4 -2 -1
";

    #[test]
    fn parses_groups_per_material() {
        let data = parse_obj(QUAD).unwrap();

        assert_eq!(data.material_libraries, vec!["quad.mtl".to_string()]);
        assert_eq!(data.groups.len(), 2);

        let red = &data.groups[0];
        assert_eq!(red.material.as_deref(), Some("red"));
        assert_eq!(red.vertices.len(), 4);
        // Quad fan-triangulated into two triangles
        assert_eq!(red.indices, vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(red.vertices[2].tex_coords, Vec2::new(1.0, 0.0));
        assert_eq!(red.vertices[0].normal, Vec3::Z);
    }

    #[test]
    fn negative_indices_and_missing_normals() {
        let data = parse_obj(QUAD).unwrap();
        let blue = &data.groups[1];

        assert_eq!(blue.indices.len(), 3);
        let positions: Vec<Vec3> = blue.vertices.iter().map(|v| v.position).collect();
        assert_eq!(
            positions,
            vec![Vec3::ZERO, Vec3::new(1.0, 1.0, 0.0), Vec3::new(0.0, 1.0, 0.0)]
        );
        // Flat normal from the winding
        assert!((blue.vertices[0].normal - Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn rejects_out_of_range_faces() {
        let error = parse_obj("v 0 0 0\nv 1 0 0\nf 1 2 3\n").unwrap_err();
        assert!(format!("{error:#}").contains("out of range"));

        assert!(parse_obj("v 0 0 0\nf 1 1\n").is_err());
        assert!(parse_obj("v 0 zero 0\n").is_err());
    }

    #[test]
    fn parses_material_library() {
        let materials = parse_mtl(
            "newmtl red\nKd 1 0 0\nmap_Kd -s 1 1 1 textures/red.jpg\n\nnewmtl blue\nKd 0 0 1\n",
        );

        assert_eq!(materials.len(), 2);
        assert_eq!(materials["red"].diffuse_color, Color::new(1.0, 0.0, 0.0));
        assert_eq!(materials["red"].diffuse_texture.as_deref(), Some("textures/red.jpg"));
        assert_eq!(materials["blue"].diffuse_texture, None);
    }
}
