// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

pub mod approvals;
pub mod events;
pub mod executor;
pub mod pipeline;
pub mod planner;
pub mod quote;

pub use pipeline::{Invocation, Stage, SwapPipeline};
