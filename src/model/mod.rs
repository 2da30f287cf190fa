pub mod collapse;
pub mod data_core;
pub mod position;
pub mod shadow_tree;
pub mod store;
