//! Pure Daevanion board optimization logic.
//!
//! This crate contains the optimizer that sits behind the character
//! dashboard. It is independent of any network client, renderer, or
//! storage: functions take plain board data and return results, making
//! them unit-testable and usable from a web backend, a WASM front end, or
//! the headless harness alike.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`aggregate`] | Per-character totals across eligible boards |
//! | [`boards`] | Class archetypes, board id → name, class → board ids |
//! | [`config`] | Grade cost table, eligible boards, search limits, validation |
//! | [`constants`] | Grid size, board names, default limits |
//! | [`node`] | Grid node model, grades, adjacency |
//! | [`optimizer`] | Budget-constrained greedy activation search for one board |
//! | [`recommend`] | Add/remove rows and per-grade summaries for display |
//! | [`snapshot`] | Board-detail payloads and character snapshots |

pub mod aggregate;
pub mod boards;
pub mod config;
pub mod constants;
pub mod node;
pub mod optimizer;
pub mod recommend;
pub mod snapshot;
