//! The `wrapc` pipeline: leader detection, the in-band control protocol,
//! and the framer that drives a child `wrap` process (spec §4.4).

pub mod pipeline;
pub mod protocol;
