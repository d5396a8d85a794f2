pub mod color;
pub mod options;
pub mod variant;
