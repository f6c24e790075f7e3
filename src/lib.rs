//! Team rating systems for scored sports leagues: least-squares margin ratings with home-field
//! advantage (FISB), maximum-likelihood win ratings, the Simple Rating System, strength of schedule
//! and the Pythagorean expectation family.

pub mod config;
pub mod csv;
pub mod data;
pub mod error;
pub mod file;
pub mod fisb;
pub mod fixed_point;
pub mod linear;
pub mod metrics;
pub mod ml;
pub mod opponents;
pub mod opt;
pub mod print;
pub mod pythag;
pub mod rating;
pub mod sos;
pub mod srs;

#[cfg(test)]
pub(crate) mod testing;

#[doc = include_str!("../README.md")]
#[cfg(doc)]
fn readme() {}
