mod database_id;
mod geo_point;
mod path_builder;
mod resource_path;
mod timestamp;

pub use database_id::DatabaseId;
pub use geo_point::GeoPoint;
pub use path_builder::PathBuilder;
pub use resource_path::ResourcePath;
pub use timestamp::Timestamp;
