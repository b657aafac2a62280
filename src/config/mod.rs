mod loader;
mod options;
mod schema;

pub use loader::*;
pub use options::*;
pub use schema::*;
