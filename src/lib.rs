pub mod config;
pub mod director;
pub mod genai;
pub mod layout;
pub mod model;
pub mod schema;
pub mod store;
pub mod translate;
