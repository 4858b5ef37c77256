pub mod catalog;
pub mod constants;
pub mod models;
pub mod modules;
pub mod raster;
