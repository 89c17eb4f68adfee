//! Concrete platform implementations

pub mod linux;
