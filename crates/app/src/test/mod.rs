//! Shared test fixtures.

pub(crate) mod helpers;
pub(crate) mod http;

pub(crate) use context::TestContext;
