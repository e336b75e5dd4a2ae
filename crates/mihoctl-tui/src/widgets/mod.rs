pub mod bytes_fmt;
pub mod chart;
