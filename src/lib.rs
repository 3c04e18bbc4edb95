//! sitetree: a terminal admin console for a site's section tree.
//!
//! The backend owns persistence; this client fetches the flat section list,
//! organises it into a forest in memory, and lets the operator rearrange it
//! interactively before pushing the result back.

pub mod app_state;
pub mod blocks;
pub mod client;
pub mod config;
pub mod drag;
pub mod forest;
pub mod section;
pub mod sitemap;
pub mod ui;
pub mod wizard;
