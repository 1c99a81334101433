use glam::Mat4;
use instancebake_mesh::Mesh;
use instancebake_transform::Transform;

pub mod apply;
pub mod asset;

/// The data block a scene object references. Only mesh data supports having
/// transforms baked into it; `Empty` objects still take part in the
/// local-transform split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectData {
    Empty,
    Mesh(u32),
}

pub struct SceneObject {
    pub name: String,
    pub transform: Transform,
    pub parent: Option<u32>,
    pub children: Vec<u32>,
    pub data: ObjectData,
    pub selected: bool,
}

/// The scene is a flat object table with index-based hierarchy, plus the
/// mesh data blocks those objects share. Object and mesh indices are stable
/// for the lifetime of the scene and double as identity handles.
#[derive(Default)]
pub struct Scene {
    objects: Vec<SceneObject>,
    meshes: Vec<Mesh>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_mesh(&mut self, mesh: Mesh) -> u32 {
        self.meshes.push(mesh);
        self.meshes.len() as u32 - 1
    }

    pub fn add_object(&mut self, name: &str, transform: Transform, data: ObjectData) -> u32 {
        if let ObjectData::Mesh(handle) = data {
            debug_assert!((handle as usize) < self.meshes.len());
        }

        self.objects.push(SceneObject {
            name: name.to_owned(),
            transform,
            parent: None,
            children: Vec::new(),
            data,
            selected: false,
        });
        self.objects.len() as u32 - 1
    }

    /// Reparents `child` under `parent`. The child's local transform is left
    /// untouched, so its world transform changes accordingly.
    pub fn set_parent(&mut self, child: u32, parent: u32) {
        if let Some(old_parent) = self.objects[child as usize].parent {
            self.objects[old_parent as usize]
                .children
                .retain(|&c| c != child);
        }

        self.objects[child as usize].parent = Some(parent);
        self.objects[parent as usize].children.push(child);
    }

    pub fn object(&self, object: u32) -> &SceneObject {
        &self.objects[object as usize]
    }

    pub fn object_mut(&mut self, object: u32) -> &mut SceneObject {
        &mut self.objects[object as usize]
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn object_count(&self) -> u32 {
        self.objects.len() as u32
    }

    pub fn mesh(&self, handle: u32) -> &Mesh {
        &self.meshes[handle as usize]
    }

    pub fn mesh_mut(&mut self, handle: u32) -> &mut Mesh {
        &mut self.meshes[handle as usize]
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn set_selected(&mut self, object: u32, selected: bool) {
        self.objects[object as usize].selected = selected;
    }

    pub fn select_all(&mut self) {
        for object in &mut self.objects {
            object.selected = true;
        }
    }

    /// The object's local-to-world matrix, composed through its parent chain.
    pub fn world_matrix(&self, object: u32) -> Mat4 {
        let local = self.objects[object as usize].transform.get_matrix();

        match self.objects[object as usize].parent {
            Some(parent) => self.world_matrix(parent) * local,
            None => local,
        }
    }
}
