// SPDX-License-Identifier: MIT OR Apache-2.0

pub mod graph;
pub mod oce;

pub use graph::{CausalGraph, ParentRef, SelectedParents};
pub use oce::{OceConfig, OceObserver, SilentObserver, discover, discover_with_observer};
