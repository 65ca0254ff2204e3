//! Generation engine components, leaf-first.

pub mod config;
pub mod corpus;
pub mod generator;
pub mod model;
pub mod ngram;
pub mod reshape;
pub mod sampler;
pub mod vocab;
pub mod window;
