#![doc(html_no_source)]

mod instancebake;
pub use crate::instancebake::Instancebake;

// Reexport all crates
pub use instancebake_mesh;
pub use instancebake_transform;
pub use instancebake_world;
