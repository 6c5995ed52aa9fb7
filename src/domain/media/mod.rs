mod file;
mod policy;
mod slot;

pub use file::*;
pub use policy::*;
pub use slot::*;
