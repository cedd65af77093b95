mod builder;
mod types;

pub use builder::{TemplateRequestBuilder, build};
pub use types::*;
