pub mod gpu;
pub mod mesh;
pub mod renderer;
pub mod track;
