//! **opengrid-core** — geometry primitives shared by the *opengrid* crates.
//!
//! Grid cells are addressed by integer [`Point`]s inside a half-open
//! [`Range`]; each cell may also carry a continuous world-space [`Vec3`].

pub mod geom;

pub use geom::{Point, Range, RangeIter, Vec3};
