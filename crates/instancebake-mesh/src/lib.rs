use glam::{Mat3, Mat4, Vec2, Vec3};
use uuid::Uuid;

/// A shared mesh data block. Multiple scene objects may reference one mesh;
/// mutating it affects every instance at once.
#[derive(Clone)]
pub struct Mesh {
    pub vertex_positions: Vec<Vec3>,
    pub vertex_normals: Vec<Vec3>,
    pub vertex_tex_coords: Vec<Vec2>,
    pub indices: Vec<u32>,
    uuid: Uuid,
}

impl Mesh {
    pub fn new(
        vertex_positions: Vec<Vec3>,
        vertex_normals: Vec<Vec3>,
        vertex_tex_coords: Vec<Vec2>,
        indices: Vec<u32>,
    ) -> Self {
        debug_assert_eq!(indices.len() % 3, 0);

        Mesh {
            vertex_positions,
            vertex_normals,
            vertex_tex_coords,
            indices,
            uuid: Uuid::new_v4(),
        }
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    pub fn has_normals(&self) -> bool {
        !self.vertex_normals.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn generate_normals(&mut self) {
        for normal in &mut self.vertex_normals {
            *normal = Vec3::ZERO;
        }
        self.vertex_normals
            .resize(self.vertex_positions.len(), Vec3::ZERO);

        for i in 0..(self.indices.len() / 3) {
            let p0 = self.vertex_positions[self.indices[i * 3] as usize];
            let p1 = self.vertex_positions[self.indices[i * 3 + 1] as usize];
            let p2 = self.vertex_positions[self.indices[i * 3 + 2] as usize];
            let n = (p1 - p0).cross(p2 - p0).normalize_or_zero();

            self.vertex_normals[self.indices[i * 3] as usize] += n;
            self.vertex_normals[self.indices[i * 3 + 1] as usize] += n;
            self.vertex_normals[self.indices[i * 3 + 2] as usize] += n;
        }

        for normal in &mut self.vertex_normals {
            *normal = normal.normalize_or_zero();
        }
    }

    /// Permanently bakes `matrix` into the vertex data. Positions transform
    /// by the full matrix, normals by the inverse transpose of its linear
    /// part. A singular matrix collapses the affected normals to zero rather
    /// than producing non-finite values.
    pub fn transform(&mut self, matrix: Mat4) {
        for position in &mut self.vertex_positions {
            *position = matrix.transform_point3(*position);
        }

        let normal_matrix = Mat3::from_mat4(matrix).inverse().transpose();
        for normal in &mut self.vertex_normals {
            *normal = (normal_matrix * *normal).normalize_or_zero();
        }
    }

    /// Reverses the winding of every face and negates every vertex normal,
    /// turning each face inside out. Always operates on the whole mesh,
    /// never on a subset.
    pub fn flip_normals(&mut self) {
        for triangle in self.indices.chunks_exact_mut(3) {
            triangle.swap(1, 2);
        }

        for normal in &mut self.vertex_normals {
            *normal = -*normal;
        }
    }
}
