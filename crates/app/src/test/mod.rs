//! Test support shared by service and session tests.

pub(crate) mod helpers;

pub(crate) use context::TestContext;
