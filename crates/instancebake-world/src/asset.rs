use anyhow::{Context, Result};
use glam::{Quat, Vec2, Vec3};
use instancebake_mesh::Mesh;
use instancebake_transform::Transform;

use crate::{ObjectData, Scene};

impl Scene {
    pub fn from_gltf_file(path: &str) -> Result<Scene> {
        let (document, buffers, _images) =
            gltf::import(path).with_context(|| format!("failed to load scene '{path}'"))?;
        Self::from_gltf(&document, &buffers)
    }

    pub fn from_gltf_slice(data: &[u8]) -> Result<Scene> {
        let (document, buffers, _images) = gltf::import_slice(data)?;
        Self::from_gltf(&document, &buffers)
    }

    /// Builds a scene from the default glTF scene. Nodes sharing a glTF mesh
    /// index come out referencing one shared mesh data block, so imported
    /// duplicates form instance groups directly. Nodes without a mesh import
    /// as `Empty` objects. Nothing is selected after import.
    pub fn from_gltf(document: &gltf::Document, buffers: &[gltf::buffer::Data]) -> Result<Scene> {
        let mut scene = Scene::new();
        let mut mesh_handles: Vec<Option<u32>> = vec![None; document.meshes().len()];

        if let Some(gltf_scene) = document.default_scene() {
            for root_node in gltf_scene.nodes() {
                process_node_recursive(&root_node, buffers, None, &mut scene, &mut mesh_handles)?;
            }
        }

        Ok(scene)
    }
}

fn process_node_recursive(
    node: &gltf::Node,
    buffers: &[gltf::buffer::Data],
    parent: Option<u32>,
    scene: &mut Scene,
    mesh_handles: &mut [Option<u32>],
) -> Result<()> {
    let (translation, rotation, scale) = node.transform().decomposed();
    let transform = Transform::new(
        Vec3::from(translation),
        Quat::from_xyzw(rotation[0], rotation[1], rotation[2], rotation[3]),
        Vec3::from(scale),
    );

    let data = match node.mesh() {
        Some(mesh) => {
            let handle = match mesh_handles[mesh.index()] {
                Some(handle) => handle,
                None => {
                    let handle = scene.add_mesh(process_mesh(&mesh, buffers)?);
                    mesh_handles[mesh.index()] = Some(handle);
                    handle
                }
            };
            ObjectData::Mesh(handle)
        }
        None => ObjectData::Empty,
    };

    let name = node
        .name()
        .map(str::to_owned)
        .unwrap_or_else(|| format!("node_{}", node.index()));
    let object = scene.add_object(&name, transform, data);
    if let Some(parent) = parent {
        scene.set_parent(object, parent);
    }

    for child in node.children() {
        process_node_recursive(&child, buffers, Some(object), scene, mesh_handles)?;
    }

    Ok(())
}

fn process_mesh(mesh: &gltf::Mesh, buffers: &[gltf::buffer::Data]) -> Result<Mesh> {
    let mut mesh_vertex_positions = vec![];
    let mut mesh_vertex_normals = vec![];
    let mut mesh_vertex_tex_coords = vec![];
    let mut mesh_indices = vec![];

    for primitive in mesh.primitives() {
        if primitive.mode() == gltf::mesh::Mode::Triangles {
            let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

            let mut vertex_positions = reader
                .read_positions()
                .context("mesh primitive has no vertex positions")?
                .map(Vec3::from)
                .collect::<Vec<_>>();

            let indices = reader
                .read_indices()
                .context("mesh primitive has no indices")?
                .into_u32()
                .collect::<Vec<_>>();

            let mut vertex_normals = if let Some(normals) = reader.read_normals() {
                normals.map(Vec3::from).collect()
            } else {
                vec![]
            };

            let mut vertex_tex_coords = if let Some(tex_coords) = reader.read_tex_coords(0) {
                tex_coords.into_f32().map(Vec2::from).collect()
            } else {
                vec![]
            };

            let mut indices = indices
                .into_iter()
                .map(|index| index + mesh_vertex_positions.len() as u32)
                .collect::<Vec<u32>>();
            mesh_vertex_positions.append(&mut vertex_positions);
            mesh_vertex_normals.append(&mut vertex_normals);
            mesh_vertex_tex_coords.append(&mut vertex_tex_coords);
            mesh_indices.append(&mut indices);
        }
    }

    let mut mesh = Mesh::new(
        mesh_vertex_positions,
        mesh_vertex_normals,
        mesh_vertex_tex_coords,
        mesh_indices,
    );
    if !mesh.has_normals() {
        mesh.generate_normals();
    }

    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Two instances of one triangle mesh plus an attachment under the first.
    const TEST_SCENE: &str = r#"{
        "asset": {"version": "2.0"},
        "scene": 0,
        "scenes": [{"nodes": [0, 1]}],
        "nodes": [
            {"name": "base", "mesh": 0, "scale": [2, 2, 2], "children": [2]},
            {"name": "instance", "mesh": 0, "translation": [3, 0, 0]},
            {"name": "attachment", "translation": [0, 1, 0]}
        ],
        "meshes": [{"primitives": [{"attributes": {"POSITION": 0}, "indices": 1}]}],
        "accessors": [
            {"bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
             "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0]},
            {"bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR"}
        ],
        "bufferViews": [
            {"buffer": 0, "byteOffset": 0, "byteLength": 36},
            {"buffer": 0, "byteOffset": 36, "byteLength": 6}
        ],
        "buffers": [{"byteLength": 42, "uri":
            "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAAAAABAAIA"}]
    }"#;

    #[test]
    fn shared_gltf_meshes_become_shared_data_blocks() {
        let scene = Scene::from_gltf_slice(TEST_SCENE.as_bytes()).unwrap();

        assert_eq!(scene.object_count(), 3);
        assert_eq!(scene.meshes().len(), 1);

        // Depth-first import: base, its attachment, then the second instance.
        assert_eq!(scene.object(0).name, "base");
        assert_eq!(scene.object(1).name, "attachment");
        assert_eq!(scene.object(2).name, "instance");

        assert_eq!(scene.object(0).data, ObjectData::Mesh(0));
        assert_eq!(scene.object(2).data, ObjectData::Mesh(0));
        assert_eq!(scene.object(1).data, ObjectData::Empty);
    }

    #[test]
    fn gltf_hierarchy_and_transforms_survive_import() {
        let scene = Scene::from_gltf_slice(TEST_SCENE.as_bytes()).unwrap();

        assert_eq!(scene.object(1).parent, Some(0));
        assert_eq!(scene.object(0).children, vec![1]);
        assert_eq!(scene.object(0).transform.get_scale(), glam::Vec3::splat(2.0));
        assert_eq!(
            scene.object(2).transform.get_translation(),
            glam::Vec3::new(3.0, 0.0, 0.0)
        );
        assert!(!scene.objects().iter().any(|object| object.selected));
    }

    #[test]
    fn meshes_without_normals_get_generated_ones() {
        let scene = Scene::from_gltf_slice(TEST_SCENE.as_bytes()).unwrap();

        let mesh = scene.mesh(0);
        assert_eq!(mesh.vertex_positions.len(), 3);
        assert_eq!(mesh.triangle_count(), 1);
        assert!(mesh.has_normals());
    }
}
