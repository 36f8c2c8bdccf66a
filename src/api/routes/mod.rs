//! API Routes
//!
//! Route handlers organized by dashboard widget.

pub mod clusters;
pub mod controls;
pub mod density;
pub mod health;
pub mod nationality;
pub mod reload;
