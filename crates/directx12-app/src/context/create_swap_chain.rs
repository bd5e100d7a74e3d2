use tracing::info;

use super::FRAME_COUNT;
use crate::app_error::AppResult;
use crate::backend::Backend;
use crate::backend::ClientSize;
use crate::backend::PixelFormat;
use crate::backend::SwapChainDesc;

// The buffer count is fixed here for the lifetime of the context; resizing the
// window does not touch the swap chain.
pub(super) fn create_swap_chain<B: Backend>(
    backend: &mut B,
    command_queue: &B::CommandQueue,
    window: B::Window,
    windowed: bool,
) -> AppResult<(B::SwapChain, ClientSize)> {
    let client_size = backend.client_size(window)?;

    let desc = SwapChainDesc {
        buffer_count: FRAME_COUNT,
        format: PixelFormat::Rgba8Unorm,
        width: client_size.width,
        height: client_size.height,
        windowed,
    };
    let swap_chain = backend.create_swap_chain(command_queue, window, &desc)?;

    info!(
        width = client_size.width,
        height = client_size.height,
        buffers = FRAME_COUNT,
        windowed,
        "Created swap chain"
    );
    Ok((swap_chain, client_size))
}
