// Copyright (c) 2024-2025 The PicoPot Developers

//! PicoPot device engine.
//!
//! Everything the cold-side device runs: the from-scratch [crypto]
//! primitives (SHA-512, Ed25519, XOR seed encryption), the password-gated
//! [store], and the [engine] that maps request lines onto store and key
//! operations. The crate is transport-agnostic; a platform wires a line
//! channel and a [engine::Driver] around [engine::Engine] and calls
//! [engine::Engine::serve].
//!
//! Request lines and response words live in [picopot_proto], re-exported
//! as [proto] for convenience.

pub mod crypto;
pub mod engine;
pub mod store;

pub use picopot_proto as proto;
