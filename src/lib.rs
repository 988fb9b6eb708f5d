//! Interactive node-graph view of a training pipeline's execution state.
//!
//! This crate loads a layout of pipeline stages, overlays runtime and live job
//! statuses on it, routes connections between stage cards and handles
//! pan/zoom/drag input. Run snapshots can be compared against each other.
//!
//! Rendering is backend-agnostic: [`scene::build_scene`] produces draw calls
//! that [`svg::SvgRenderer`] (and, with the `egui` feature, the native
//! viewer) consume. The binary `runboard` summarizes, renders and compares
//! runs from the command line.

pub mod canvas;
pub mod compare;
pub mod config;
pub mod error;
pub mod fetch;
pub mod geometry;
pub mod history;
pub mod interaction;
pub mod layout;
pub mod model;
pub mod node_types;
pub mod overlay;
pub mod poll;
pub mod router;
pub mod scene;
pub mod session;
pub mod source;
pub mod status;
pub mod svg;
pub mod viewport;

// Optional native viewer behind the `egui` feature flag. The `view`
// subcommand of the binary opens it.
#[cfg(feature = "egui")]
pub mod egui_app;
