//! Schema definitions for RON catalogs

pub mod achievement;
