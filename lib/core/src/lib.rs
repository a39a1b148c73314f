//! # bagdist Core
//!
//! Core library for bagdist, a tunable distance between collections of bags.
//!
//! This crate provides the fundamental data structures and algorithms:
//!
//! - [`Bag`] - A finite multiset of hashable items (`&str`, `String`, `Vec<T>`)
//! - [`VectorSpace`] - Item and bag indices plus the sparse item × bag occurrence matrix
//! - [`Metric`] - Weighted vectorization of bag collections and cosine distance
//! - [`ComputationContext`] - Per-call intermediates reused by gradient steps
//! - [`divergence`] - Entropy and Jensen–Shannon distance with variance
//!
//! ## Example
//!
//! ```rust
//! use bagdist_core::Metric;
//!
//! // TF-IDF item weights and 1/|bag| bag weights by default
//! let metric = Metric::new(["abb", "aa", "baa", "bbb"].iter()).unwrap();
//!
//! let same = metric.distance(["abb", "aa"].iter(), ["aa", "abb"].iter()).unwrap();
//! assert!(same.abs() < 1e-12);
//!
//! let disjoint = metric.distance(["aa"].iter(), ["bbb"].iter()).unwrap();
//! assert!((disjoint - 1.0).abs() < 1e-12);
//! ```

pub mod bag;
pub mod config;
pub mod context;
pub mod divergence;
pub mod error;
pub mod metric;
pub mod space;
pub mod vector;
pub mod weights;

pub use bag::Bag;
pub use config::{MetricConfig, UnknownKeyPolicy};
pub use context::{ArgumentSlot, ComputationContext};
pub use divergence::{Distribution, JensenShannon};
pub use error::{Error, Result};
pub use metric::{Metric, MetricBuilder};
pub use space::VectorSpace;
pub use vector::Vector;
