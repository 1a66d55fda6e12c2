pub mod local;
pub mod plan;
pub mod split;
