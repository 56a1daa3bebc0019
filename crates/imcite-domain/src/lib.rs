//! Domain types shared across the imcite citation-resolution pipeline
//!
//! This crate provides the canonical models the resolver operates on:
//! - BibliographyEntry: one work from the canonical bibliography source
//! - Author: personal or organizational creator
//! - Identifiers: DOI, arXiv ID, ISBN, canonical URL
//! - Citation: one in-text reference extracted upstream
//! - MatchResult: the outcome of resolving a citation
//! - Issue: a validation finding with severity

pub mod author;
pub mod citation;
pub mod entry;
pub mod identifiers;
pub mod validation;

pub use author::*;
pub use citation::*;
pub use entry::*;
pub use identifiers::*;
pub use validation::*;
