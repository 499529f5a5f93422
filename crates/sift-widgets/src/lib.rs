//! The searchable dropdown for **sift**, and the pieces it is built from.
//!
//! [`dropdown::Dropdown`] implements [`sift_core::Component`], so it embeds in
//! any [`sift_core::Model`]. [`dropdown::DropdownGroup`] attaches one dropdown
//! to every matching field of a host [`form::Form`].
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`dropdown`] | The component, its configuration, data provider and renderer |
//! | [`form`] | Host form model: fields, selectors, hidden value mirrors |
//! | [`key`] | Key bindings |
//! | [`selection`] | Non-wrapping list cursor with a scroll window |
//! | [`text_edit`] | Single-line editing state for the search box |
//! | [`runeutil`] | Unicode-aware width and truncation |

pub mod dropdown;
pub mod form;
pub mod key;
pub mod runeutil;
pub mod selection;
pub mod text_edit;

pub use dropdown::{Dropdown, DropdownConfig, DropdownGroup, Item};
pub use form::{Field, Form};
