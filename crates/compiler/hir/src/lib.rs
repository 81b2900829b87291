//! # Bolt High-Level IR
//!
//! The HIR sits between the syntax tree and MIR lowering: names are
//! checked for uniqueness, attributes are validated against their
//! context, and every type annotation is parsed into a structured
//! [`TypeReference`] with a deterministic normalised rendering.
//!
//! The crate also owns the two name-resolution collaborators that feed
//! MIR lowering: the filesystem-backed [`ModuleLocator`] and the
//! [`ImportResolver`] that classifies a module's imports against it.

pub mod binder;
pub mod import_resolver;
pub mod module;
pub mod module_locator;
pub mod type_ref;

pub use binder::{bind_unit, BindOutput, Binder};
pub use import_resolver::{
    ImportResolution, ImportResolutionOutput, ImportResolver, ImportStatus,
};
pub use module::{Attribute, Blueprint, BlueprintField, Function, Import, Module, Parameter};
pub use module_locator::{
    ModuleLocator, ModuleLocatorDiscoveryResult, ModuleLocatorDuplicate, ModuleLocatorIssue,
    ModuleLocatorResult,
};
pub use type_ref::{QualifiedName, TypeKind, TypeReference};
