//! Minimal terminal runtime: an application trait and a render-on-dirty loop.

pub(crate) use self::{app::App, runtime::Runtime};

mod app;
mod event_loop;
mod runtime;
