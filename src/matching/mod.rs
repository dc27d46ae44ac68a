// src/matching/mod.rs
pub mod normalize;
pub mod phonetic;
pub mod scoring;
pub mod trigram;
