//! nativebind-codegen - Schema resolution and native binding emission
//!
//! This crate turns a [`SchemaIndex`](nativebind_core::SchemaIndex) into C-ABI
//! headers, JSON wire-container headers and C++ implementation units:
//! - [`NativeMapper`] maps schemas to native types and their accessors
//! - [`WireMapper`] maps schemas to wire container types
//! - [`SymbolTable`] keeps the generated names of distinct schemas apart
//! - [`MethodEmitter`] emits method, property and event functions
//! - [`Assembler`] renders one module's fragments into files
//! - [`generate`] drives a whole run across modules in parallel

pub mod accessors;
pub mod assembler;
pub mod enums;
pub mod fragments;
pub mod generator;
pub mod merge;
pub mod methods;
pub mod naming;
pub mod native;
pub mod resolver;
pub mod symbols;
pub mod wire;

pub use assembler::{Assembler, GeneratedFile, ModuleArtifacts, OutputUnit};
pub use fragments::Fragments;
pub use generator::{AllModules, GeneratedModule, GenerationOutput, ModuleFilter, generate, generate_module};
pub use methods::{MethodClass, MethodEmitter};
pub use native::{NativeKind, NativeMapper, NativeType, TypeRequest, ValueShape};
pub use symbols::{SharedSymbols, SymbolKind, SymbolTable};
pub use wire::{WireMapper, WireNames, WireType};
