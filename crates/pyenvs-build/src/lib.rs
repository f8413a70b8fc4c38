//! Source generation, concurrent task running, and image builds.
//!
//! # Build pipeline
//!
//! ```text
//! pyenvs build
//!   1. Sources ── TemplateRenderer::render() per image → <build>/src/<id>/
//!   2. Build   ── one task per image: buildx build --tag=... --label=...
//!   3. Push    ── one task per (repo, image, tag): push <repo>/<tag>
//! ```
//!
//! # Task runner
//!
//! [`concurrent::run_tasks`] runs tasks with a bounded number in flight and
//! yields `(success, userdata)` pairs in completion order. With fast-fail,
//! the first failure cancels every task that has not started yet. All
//! errors are handed back together by [`concurrent::TaskRun::finish`].

pub mod builder;
pub mod concurrent;
pub mod render;

pub use builder::{BuildLayout, Builder};
pub use concurrent::{Task, TaskErrors, TaskRun, TaskRunner, run_tasks};
pub use render::{RenderError, TemplateRenderer};
