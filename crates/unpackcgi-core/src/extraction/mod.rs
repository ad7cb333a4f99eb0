//! Entry writing helpers shared by container formats.

pub(crate) mod writer;
