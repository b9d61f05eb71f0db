mod api;
mod model;

pub use api::*;
pub use model::*;
