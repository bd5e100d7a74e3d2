//! The outer loop: drain window messages, render, repeat.

pub mod headless;
#[cfg(windows)]
pub mod win32;

use tracing::error;
use tracing::info;

use crate::app_error::AppResult;
use crate::backend::Backend;
use crate::context::Context;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PumpStatus {
    Continue,
    Exit,
}

/// Source of window-system messages. `pump` must never block waiting for
/// new messages.
pub trait MessagePump {
    fn pump(&mut self) -> AppResult<PumpStatus>;
}

/// Pumps messages and renders until the pump asks to exit or `frame_limit`
/// frames have been rendered. A failed frame ends the loop with its error.
pub fn run_loop<P, B>(
    pump: &mut P,
    context: &mut Context<B>,
    frame_limit: Option<u64>,
) -> AppResult<u64>
where
    P: MessagePump,
    B: Backend,
{
    let mut frames = 0u64;
    loop {
        if frame_limit.is_some_and(|limit| frames >= limit) {
            info!(frames, "Frame limit reached");
            break;
        }
        if pump.pump()? == PumpStatus::Exit {
            info!(frames, "Exit requested");
            break;
        }
        if let Err(e) = context.render() {
            error!(frame = frames, "Render failed: {e}");
            return Err(e.wrap("rendering a frame"));
        }
        frames += 1;
    }
    Ok(frames)
}
