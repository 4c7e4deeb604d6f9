#![allow(clippy::single_component_path_imports)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! `blood-rs` is an asset pipeline for the file formats of the Blood map
//! editor: RFF resource archives, ART tile atlases, MAP levels, and SEQ
//! animation sequences, all built on a declarative byte-exact record
//! codec.
//!
pub use blood_types::*;
