pub mod obj;
pub mod source;

pub use obj::{parse_mtl, parse_obj, GeometryResult, Material, MaterialTable};
pub use source::{AssetSource, DirectorySource, MemorySource};
