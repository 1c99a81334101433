use glam::Mat4;
use instancebake_transform::{inverted_safe, BakeMask};

use crate::{ObjectData, Scene};

/// One shared-data group touched by an invocation: the representative whose
/// transform donates into the data block, and every other object in the
/// scene referencing that same block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceGroup {
    pub base: u32,
    pub dependents: Vec<u32>,
}

/// Summary of one apply invocation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ApplyReport {
    pub groups: usize,
    pub instances_adjusted: usize,
}

/// Bakes the selected transform components of `object` into its data block
/// and returns the inverse of the baked matrix, ready to compensate other
/// objects sharing that data.
///
/// The local transform decomposes into translation, rotation and scale;
/// selected slots multiply into the baked matrix, unselected slots stay on
/// the object, both in slot order. The baked matrix is applied to the mesh
/// data (skipped for `Empty` data) and prepended to every direct child so the
/// children keep their world placement relative to the reshaped basis. A
/// baked scale of odd sign parity mirrors the data, so the mesh gets its
/// faces flipped once to restore outward-facing normals.
pub fn bake(scene: &mut Scene, object: u32, mask: BakeMask) -> Mat4 {
    let (translation, rotation, scale) = scene.object(object).transform.elementary_matrices();
    let scale_signs = scene.object(object).transform.get_scale();

    let (baked, remainder) = mask.split(translation, rotation, scale);

    if let ObjectData::Mesh(handle) = scene.object(object).data {
        let mirrored = mask.contains(BakeMask::SCALE)
            && scale_signs.x * scale_signs.y * scale_signs.z < 0.0;

        let mesh = scene.mesh_mut(handle);
        mesh.transform(baked);
        if mirrored {
            mesh.flip_normals();
        }
    }

    let children = scene.object(object).children.clone();
    for child in children {
        let child_local = scene.object(child).transform.get_matrix();
        scene.object_mut(child).transform.set_matrix(baked * child_local);
    }

    scene.object_mut(object).transform.set_matrix(remainder);

    inverted_safe(baked)
}

/// Partitions the current selection by shared mesh data. Every distinct data
/// block referenced by a selected mesh object forms one group containing all
/// scene objects referencing it, selected or not; unselected instances must
/// be compensated too or the data mutation would silently move them.
///
/// The base is the instance with the largest `|sx|·|sy|·|sz|`, a rough
/// stand-in for world volume that ignores parent scale. Ties go to the first
/// instance in scene order.
pub fn group_selection(scene: &Scene) -> Vec<InstanceGroup> {
    let mut touched: Vec<u32> = Vec::new();
    for object in scene.objects() {
        if object.selected {
            if let ObjectData::Mesh(handle) = object.data {
                if !touched.contains(&handle) {
                    touched.push(handle);
                }
            }
        }
    }

    touched
        .into_iter()
        .map(|handle| {
            let members: Vec<u32> = (0..scene.object_count())
                .filter(|&id| scene.object(id).data == ObjectData::Mesh(handle))
                .collect();

            let mut base = members[0];
            let mut base_volume = scale_volume(scene, base);
            for &member in &members[1..] {
                let volume = scale_volume(scene, member);
                if volume > base_volume {
                    base = member;
                    base_volume = volume;
                }
            }

            InstanceGroup {
                base,
                dependents: members.into_iter().filter(|&id| id != base).collect(),
            }
        })
        .collect()
}

fn scale_volume(scene: &Scene, object: u32) -> f32 {
    let scale = scene.object(object).transform.get_scale();
    scale.x.abs() * scale.y.abs() * scale.z.abs()
}

/// Applies the selected transform components of every selected mesh object
/// into its shared data, compensating all sibling instances so nothing moves
/// on screen. Returns how many instances were touched; an empty or meshless
/// selection is a zero-count success, not an error.
pub fn apply_instance_transform(scene: &mut Scene, mask: BakeMask) -> ApplyReport {
    let groups = group_selection(scene);

    let mut report = ApplyReport {
        groups: groups.len(),
        instances_adjusted: 0,
    };

    for group in &groups {
        if let ObjectData::Mesh(handle) = scene.object(group.base).data {
            log::debug!(
                "baking '{}' into mesh {}",
                scene.object(group.base).name,
                scene.mesh(handle).uuid()
            );
        }

        let inverse = bake(scene, group.base, mask);

        for &dependent in &group.dependents {
            let local = scene.object(dependent).transform.get_matrix();
            scene.object_mut(dependent).transform.set_matrix(local * inverse);
        }

        report.instances_adjusted += 1 + group.dependents.len();
    }

    log::info!("{} instances were adjusted.", report.instances_adjusted);
    report
}
