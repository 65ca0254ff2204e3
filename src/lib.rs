//! Char Style Engine: character-level text generation with temperature sampling.
//!
//! Given a vocabulary, a next-character model and a seed string, the engine
//! produces text one character at a time: each sampled character is pushed
//! back into a fixed-length context window that feeds the next prediction.
//! The model sits behind the [`core::model::CharModel`] trait, so a neural
//! network, the bundled n-gram model, or a test double all plug in the same way.

pub mod core;
