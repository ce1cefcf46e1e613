pub mod dialogue;
pub mod media;
pub mod speech;
