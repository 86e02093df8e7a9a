pub use super::error::ContainerErrors;
pub use super::group_map::GroupMap;
