//! Support for linear algebra.

pub mod pinv;
