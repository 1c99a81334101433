use anyhow::Result;
use clap::{Parser, ValueEnum};
use glam::Vec3;
use instancebake::instancebake_transform::BakeMask;
use instancebake::instancebake_world::apply::apply_instance_transform;
use instancebake::instancebake_world::{ObjectData, Scene};
use instancebake::Instancebake;

#[derive(ValueEnum, Debug, Clone, Copy)]
enum Mode {
    Location,
    Rotation,
    Scale,
    All,
    RotationScale,
}

impl From<Mode> for BakeMask {
    fn from(value: Mode) -> Self {
        match value {
            Mode::Location => BakeMask::LOCATION,
            Mode::Rotation => BakeMask::ROTATION,
            Mode::Scale => BakeMask::SCALE,
            Mode::All => BakeMask::ALL,
            Mode::RotationScale => BakeMask::ROTATION_SCALE,
        }
    }
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Scene file to load (glTF or GLB)
    scene: String,

    /// Which transform components to apply
    #[arg(value_enum)]
    mode: Mode,

    /// Select only objects whose name contains one of these filters; every
    /// mesh object is selected when omitted
    #[arg(long)]
    select: Vec<String>,
}

/// World-space vertex positions per object, the on-screen appearance the
/// bake is supposed to preserve.
fn world_vertices(scene: &Scene) -> Vec<Vec<Vec3>> {
    (0..scene.object_count())
        .map(|object| match scene.object(object).data {
            ObjectData::Mesh(handle) => {
                let world = scene.world_matrix(object);
                scene
                    .mesh(handle)
                    .vertex_positions
                    .iter()
                    .map(|&position| world.transform_point3(position))
                    .collect()
            }
            ObjectData::Empty => vec![],
        })
        .collect()
}

pub fn internal_main() -> Result<()> {
    let _instancebake = Instancebake::new("Bake CLI");
    let args = Args::parse();

    let mut scene = Scene::from_gltf_file(&args.scene)?;
    log::info!(
        "loaded '{}': {} objects, {} meshes",
        args.scene,
        scene.object_count(),
        scene.meshes().len()
    );

    for object in 0..scene.object_count() {
        let name = &scene.object(object).name;
        let selected =
            args.select.is_empty() || args.select.iter().any(|filter| name.contains(filter));
        scene.set_selected(object, selected);
    }

    let before = world_vertices(&scene);

    apply_instance_transform(&mut scene, args.mode.into());

    let mut max_drift = 0.0f32;
    for (object_before, object_after) in before.iter().zip(world_vertices(&scene)) {
        for (&vertex_before, vertex_after) in object_before.iter().zip(object_after) {
            max_drift = max_drift.max(vertex_before.distance(vertex_after));
        }
    }
    log::info!("max world-space drift: {max_drift:.6}");

    for object in scene.objects() {
        log::debug!(
            "'{}': translation {} rotation {} scale {}",
            object.name,
            object.transform.get_translation(),
            object.transform.get_rotation(),
            object.transform.get_scale()
        );
    }

    Ok(())
}
