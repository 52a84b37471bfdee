//! Exact Euclidean distance transforms and signed distance fields.

mod edt;
mod sdf;

pub use edt::{edt1d, edt1d_weighted, edt2d, edt2d_scaled, EDT_INF};
pub use sdf::signed_distance_field;
