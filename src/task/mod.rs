//! Background tasks.

pub mod window_sweeper;
