//! glTF Loader
//!
//! Turns a `.gltf` or `.glb` document into a [`Prefab`]. Only the node
//! tree, transforms, material factors and per-primitive bounds are read;
//! vertex buffers are left alone, so external `.bin` files are not needed.

use glam::{Quat, Vec3};

use crate::assets::prefab::{Prefab, PrefabNode};
use crate::errors::AssetError;
use crate::scene::geometry::{BoundingBox, Geometry};
use crate::scene::material::Material;
use crate::scene::mesh::Mesh;

pub struct GltfLoader {
    materials: Vec<Material>,
}

impl GltfLoader {
    /// Parses a glTF/GLB document. CPU-bound; run it off the tick thread.
    pub fn load_prefab(bytes: &[u8], name: &str) -> Result<Prefab, AssetError> {
        let gltf = gltf::Gltf::from_slice(bytes)?;

        let unsupported: Vec<&str> = gltf.extensions_required().collect();
        if !unsupported.is_empty() {
            log::warn!("glTF '{name}' requires unsupported extensions: {unsupported:?}");
        }

        let loader = Self {
            materials: gltf.materials().map(|m| Self::convert_material(&m)).collect(),
        };

        let mut prefab = Prefab::new(name);
        for node in gltf.nodes() {
            prefab.nodes.push(loader.convert_node(&node));
        }

        prefab.root_indices = match gltf.default_scene().or_else(|| gltf.scenes().next()) {
            Some(scene) => scene.nodes().map(|n| n.index()).collect(),
            None => Self::parentless(&prefab),
        };

        prefab.animations = gltf
            .animations()
            .map(|a| {
                a.name()
                    .map_or_else(|| format!("Animation_{}", a.index()), str::to_string)
            })
            .collect();

        log::debug!(
            "Parsed glTF '{name}': {} nodes, {} meshes, {} animations",
            prefab.nodes.len(),
            prefab.mesh_count(),
            prefab.animations.len()
        );
        Ok(prefab)
    }

    fn convert_node(&self, node: &gltf::Node) -> PrefabNode {
        let mut out = PrefabNode::new();
        out.name = Some(
            node.name()
                .map_or_else(|| format!("Node_{}", node.index()), str::to_string),
        );

        let (t, r, s) = node.transform().decomposed();
        out.transform.position = Vec3::from_array(t);
        out.transform.rotation = Quat::from_array(r);
        out.transform.scale = Vec3::from_array(s);

        out.children_indices = node.children().map(|c| c.index()).collect();
        out.mesh = node.mesh().and_then(|mesh| self.convert_mesh(&mesh));
        out
    }

    /// One engine mesh per glTF mesh: bounds and vertex counts of all
    /// primitives are merged, and the first primitive's material is used.
    fn convert_mesh(&self, mesh: &gltf::Mesh) -> Option<Mesh> {
        let mut bounds = BoundingBox::empty();
        let mut vertex_count = 0;
        let mut material = None;

        for primitive in mesh.primitives() {
            let Some(positions) = primitive.get(&gltf::Semantic::Positions) else {
                continue;
            };
            vertex_count += positions.count();
            if let (Some(min), Some(max)) = (
                accessor_vec3(positions.min()),
                accessor_vec3(positions.max()),
            ) {
                bounds.expand(min);
                bounds.expand(max);
            }
            if material.is_none() {
                material = Some(
                    primitive
                        .material()
                        .index()
                        .and_then(|i| self.materials.get(i).cloned())
                        .unwrap_or_default(),
                );
            }
        }

        let material = material?;
        if bounds.is_empty() {
            bounds = BoundingBox::new(Vec3::ZERO, Vec3::ZERO);
        }
        Some(Mesh::new(Geometry::Model { bounds, vertex_count }, material))
    }

    fn convert_material(material: &gltf::Material) -> Material {
        let pbr = material.pbr_metallic_roughness();
        let [r, g, b, a] = pbr.base_color_factor();
        let mut out = Material::standard(pbr.metallic_factor(), pbr.roughness_factor())
            .with_color(Vec3::new(r, g, b));
        out.opacity = a;
        out.transparent = material.alpha_mode() == gltf::material::AlphaMode::Blend;
        out
    }

    fn parentless(prefab: &Prefab) -> Vec<usize> {
        let mut is_child = vec![false; prefab.nodes.len()];
        for node in &prefab.nodes {
            for &child in &node.children_indices {
                if let Some(flag) = is_child.get_mut(child) {
                    *flag = true;
                }
            }
        }
        (0..prefab.nodes.len()).filter(|&i| !is_child[i]).collect()
    }
}

fn accessor_vec3(value: Option<gltf::json::Value>) -> Option<Vec3> {
    let value = value?;
    let items = value.as_array()?;
    if items.len() < 3 {
        return None;
    }
    Some(Vec3::new(
        items[0].as_f64()? as f32,
        items[1].as_f64()? as f32,
        items[2].as_f64()? as f32,
    ))
}
