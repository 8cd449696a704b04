//! CFG construction and export

pub mod builder;
pub mod render;

pub use builder::CfgBuilder;
