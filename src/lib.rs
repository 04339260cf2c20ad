pub mod axis;
pub use axis::*;

pub mod ray;
pub use ray::*;

pub mod aabb;
pub use aabb::*;

pub mod intersections;
pub use intersections::*;

pub mod primitive;
pub use primitive::*;

pub mod triangle;
pub use triangle::*;

pub mod cuboid;
pub use cuboid::*;

pub mod error;
pub use error::*;

pub mod config;
pub use config::*;

pub mod mailbox;
pub use mailbox::*;

pub mod kdtree;
pub use kdtree::*;
