pub mod paths;
pub mod status;
