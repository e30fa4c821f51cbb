//! URL handling module for Netr
//!
//! This module provides URL normalization, link resolution and origin
//! derivation. Normalized URLs are the identity used by the frontier's
//! visited set.

mod normalize;
mod origin;

pub use normalize::{normalize_parsed, normalize_url, resolve_link};
pub use origin::{origin_of, robots_url};
