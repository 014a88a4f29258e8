mod index;
mod parse_mtl;
mod parse_obj;
mod types;

pub use parse_mtl::parse_mtl;
pub use parse_obj::parse_obj;
pub use types::{GeometryResult, Material, MaterialTable};
