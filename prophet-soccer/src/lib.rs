pub mod domain;
pub mod evidence;
pub mod league;
pub mod predict;
pub mod print;
pub mod schema;
pub mod store;

#[doc = include_str!("../README.md")]
#[cfg(doc)]
fn readme() {}
