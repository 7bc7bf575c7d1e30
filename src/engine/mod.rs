pub mod errors;
pub mod gate;
pub mod integrity;
pub mod lifecycle;
pub mod scoring;
pub mod sheet;
pub mod timer;
