#![warn(clippy::all, missing_docs)]

//! Core domain logic for the GameVault launcher.
//!
//! This crate hosts the data models, the shared launcher store, the staged
//! game editor, library filtering/sorting, the simulated launch sequencer,
//! and configuration handling used by the terminal UI and any future
//! frontends.

pub mod catalog;
pub mod config;
pub mod demo;
pub mod editor;
pub mod launch;
pub mod models;
pub mod store;

pub use catalog::{filter_and_sort, SortKey};
pub use config::AppConfig;
pub use editor::{parse_fps, GameEditor};
pub use launch::{LaunchSequence, LaunchStage, SwapJob};
pub use models::{ConfigEntry, EntryKind, FpsMethod, Game, MonitorIcon, MonitorProfile};
pub use store::{LauncherStore, StoreError};
