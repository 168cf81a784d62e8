//! Request/response middleware applied to the whole router.

pub mod cors;
