//! VOB embedded-object compiler
//!
//! Turns an in-memory scene-object description (LODs, draw batches,
//! animation tree, named lights) into a single relocatable `.vob` blob
//! for the fixed-function mobile player. The library is synchronous and
//! pure except for the final file write; callers batch-compile by
//! invoking it from their own thread pool.
//!
//! # Modules
//!
//! - [`object`] - Source-side object model and command list
//! - [`compiler`] - Two-pass command-stream compiler
//! - [`quantize`] - Scale derivation and vertex packing
//! - [`bounds`] - Culling-sphere accumulation
//! - [`lights`] - Named-light catalog
//! - [`layers`] - Draw-order layer bands
//! - [`strings`] - Interned string table
//! - [`writer`] - Blob layout and atomic file write
//! - [`error`] - Compile-error taxonomy

pub mod bounds;
pub mod compiler;
pub mod error;
pub mod layers;
pub mod lights;
pub mod object;
pub mod quantize;
pub mod strings;
pub mod writer;

pub use compiler::{compile_object, CompiledObject};
pub use error::CompileError;
pub use object::{AnimData, Command, Keyframe, LodLevel, ObjectModel};
pub use writer::{compile_embedded_object, serialize_blob};
