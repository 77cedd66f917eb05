pub mod complete;
pub mod tree;
pub mod validate;
