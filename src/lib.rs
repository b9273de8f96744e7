//! # scd-multicast - Multicast address allocation for substation documents
//!
//! This library assigns collision-free multicast MAC addresses, APPIDs, VLAN
//! ids, VLAN priorities and GOOSE retransmission timers to the GOOSE and
//! Sampled Value publishers of a substation configuration document.
//!
//! ## Overview
//!
//! Every publisher belongs to protection group 1 or 2, derived from its
//! device name, and to a service family (GOOSE or SMV). MAC and APPID values
//! come from disjoint ranges per family and group and are allocated per
//! publisher. VLAN ids are shared: publishers are classified into buckets by
//! naming convention and every publisher of a bucket receives the ids of the
//! bucket's allocation record, which is persisted inside the document.
//!
//! ## Architecture
//!
//! - `ranges`: range table for MAC, APPID and VLAN values
//! - `address`: value formatting, used-value scanning and the sequential allocator
//! - `protection`: protection group resolution from device names
//! - `classify`: VLAN bucket classification and per-publisher field policy
//! - `vlan`: VLAN allocation records, their store and id allocators
//! - `document`: host document trait, the YAML document model and publisher selection
//! - `orchestrator`: one allocation batch from scan to emitted edits
//! - `config` / `config_loader`: YAML configuration with production defaults
//! - `utils`: format validation and timestamps
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use scd_multicast::document::{load_document, save_document, select_publishers, PublisherFilter};
//! use scd_multicast::orchestrator::AllocationEngine;
//! use std::path::Path;
//!
//! let mut doc = load_document(Path::new("station.yaml"))?;
//! let engine = AllocationEngine::default();
//! let selected = select_publishers(&doc, &PublisherFilter::default(), engine.resolver());
//! let report = engine.run(&mut doc, &selected)?;
//! println!("{} publishers updated", report.assignments.len());
//! save_document(&doc, Path::new("station.yaml"))?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Error Handling
//!
//! Library errors are `thiserror` enums. Per-publisher problems such as an
//! exhausted range or a missing address record are not errors: they are
//! reported in the [`orchestrator::BatchReport`] and the batch continues.

pub mod address;
pub mod classify;
pub mod config;
pub mod config_loader;
pub mod document;
pub mod orchestrator;
pub mod protection;
pub mod ranges;
pub mod utils;
pub mod vlan;
