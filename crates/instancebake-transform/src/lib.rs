use bitflags::bitflags;
use glam::{Mat4, Quat, Vec3, Vec4};
use std::sync::Mutex;

pub const RIGHT: Vec3 = Vec3::new(1.0, 0.0, 0.0);
pub const UP: Vec3 = Vec3::new(0.0, 1.0, 0.0);
pub const FORWARD: Vec3 = Vec3::new(0.0, 0.0, 1.0);

const SINGULAR_EPSILON: f32 = 1e-8;

/// A local transform stored as translation, rotation and scale, composing to
/// a matrix in T·R·S order. Scale components may be negative, which encodes
/// mirroring; the rotation quaternion is always a proper rotation.
#[derive(Debug)]
pub struct Transform {
    translation: Vec3,
    rotation: Quat,
    scale: Vec3,
    matrix: Mutex<(Mat4, bool)>,
}

impl Clone for Transform {
    fn clone(&self) -> Self {
        let matrix = self.matrix.lock().unwrap();

        Self {
            translation: self.translation,
            rotation: self.rotation,
            scale: self.scale,
            matrix: Mutex::new(*matrix),
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            matrix: Mutex::new((Mat4::IDENTITY, true)),
        }
    }
}

impl From<Mat4> for Transform {
    fn from(value: Mat4) -> Self {
        let (scale, rotation, translation) = value.to_scale_rotation_translation();
        Self {
            translation,
            rotation,
            scale,
            ..Default::default()
        }
    }
}

impl Transform {
    pub fn new(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            translation,
            rotation,
            scale,
            matrix: Mutex::new((
                Mat4::from_scale_rotation_translation(scale, rotation, translation),
                false,
            )),
        }
    }

    pub fn from_translation(translation: Vec3) -> Self {
        Self::new(translation, Quat::IDENTITY, Vec3::ONE)
    }

    pub fn from_scale(scale: Vec3) -> Self {
        Self::new(Vec3::ZERO, Quat::IDENTITY, scale)
    }

    pub fn get_translation(&self) -> Vec3 {
        self.translation
    }

    pub fn get_rotation(&self) -> Quat {
        self.rotation
    }

    pub fn get_scale(&self) -> Vec3 {
        self.scale
    }

    pub fn set_translation(&mut self, translation: Vec3) {
        self.translation = translation;
        self.matrix.lock().unwrap().1 = true;
    }

    pub fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
        self.matrix.lock().unwrap().1 = true;
    }

    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
        self.matrix.lock().unwrap().1 = true;
    }

    pub fn get_matrix(&self) -> Mat4 {
        let mut matrix = self.matrix.lock().unwrap();

        if matrix.1 {
            matrix.0 =
                Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation);
            matrix.1 = false;
        }

        matrix.0
    }

    pub fn set_matrix(&mut self, matrix: Mat4) {
        let mut my_matrix = self.matrix.lock().unwrap();
        my_matrix.0 = matrix;
        my_matrix.1 = false;

        (self.scale, self.rotation, self.translation) = matrix.to_scale_rotation_translation();
    }

    /// The three elementary matrices of this transform in slot order, such
    /// that `translation * rotation * scale == self.get_matrix()`.
    pub fn elementary_matrices(&self) -> (Mat4, Mat4, Mat4) {
        (
            Mat4::from_translation(self.translation),
            Mat4::from_quat(self.rotation),
            Mat4::from_scale(self.scale),
        )
    }
}

bitflags! {
    /// Selects which transform components get baked into shared mesh data.
    /// The named combinations match the five operator entries exposed by the
    /// command surface; all eight raw combinations are valid, including
    /// `empty()` which bakes nothing.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct BakeMask: u32 {
        const LOCATION = 0b00000001;
        const ROTATION = 0b00000010;
        const SCALE = 0b00000100;

        const ROTATION_SCALE = Self::ROTATION.bits() | Self::SCALE.bits();
        const ALL = Self::LOCATION.bits() | Self::ROTATION.bits() | Self::SCALE.bits();
    }
}

impl BakeMask {
    /// Splits the elementary matrices of a transform into the matrix to bake
    /// into data and the matrix left on the object. Selected slots multiply
    /// into the baked matrix, unselected slots into the remainder, each kept
    /// in translation-rotation-scale slot order with identity standing in for
    /// slots that went the other way.
    pub fn split(self, translation: Mat4, rotation: Mat4, scale: Mat4) -> (Mat4, Mat4) {
        [
            (Self::LOCATION, translation),
            (Self::ROTATION, rotation),
            (Self::SCALE, scale),
        ]
        .into_iter()
        .fold(
            (Mat4::IDENTITY, Mat4::IDENTITY),
            |(baked, remainder), (flag, matrix)| {
                if self.contains(flag) {
                    (baked * matrix, remainder)
                } else {
                    (baked, remainder * matrix)
                }
            },
        )
    }
}

/// Inverse that tolerates degenerate matrices. A singular matrix (zero scale
/// on some axis) gets a small diagonal nudge before inversion so the result
/// stays finite; callers trade exact compensation for robustness there.
pub fn inverted_safe(matrix: Mat4) -> Mat4 {
    if matrix.determinant().abs() > SINGULAR_EPSILON {
        matrix.inverse()
    } else {
        (matrix + Mat4::from_diagonal(Vec4::splat(SINGULAR_EPSILON))).inverse()
    }
}
