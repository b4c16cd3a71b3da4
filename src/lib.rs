//! Client-side rendering runtime for server-driven templates.
//!
//! The server sends a template tree and the application state as [`Value`]s.
//! [`Runtime`] expands the template into renderable primitives ([`vtree`]),
//! reconciles them with the live DOM ([`reconcile`], [`diff`]) and routes bound events
//! to pattern-matched action clauses ([`dispatch`], [`pattern`]) before rendering again.
//!
//! The DOM itself is reached only through [`host::DomPatcher`] and [`host::Document`]:
//! [`web`] implements them for the browser, [`memory`] anywhere else.

#![doc(html_root_url = "https://docs.rs/relay-dom/0.0.1")]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

pub mod config;
pub mod diff;
pub mod dispatch;
mod error;
pub mod host;
#[cfg(target_arch = "wasm32")]
pub mod load;
pub mod memory;
pub mod module;
pub mod pattern;
pub mod reconcile;
pub mod runtime;
pub mod template;
pub mod value;
pub mod vnode;
pub mod vtree;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use config::Options;
pub use error::{Error, Result};
pub use module::{Action, Clause, Module, Registry};
pub use runtime::Runtime;
pub use template::TemplateNode;
pub use value::Value;
