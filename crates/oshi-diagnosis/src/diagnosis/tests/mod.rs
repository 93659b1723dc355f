pub(crate) mod common;

mod ranking;
mod state;
