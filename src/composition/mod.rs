pub mod assemble;
pub mod events;
pub mod model;
