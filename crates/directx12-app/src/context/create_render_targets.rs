use tracing::debug;

use super::FRAME_COUNT;
use crate::app_error::AppReport;
use crate::app_error::AppResult;
use crate::backend::Backend;
use crate::backend::DescriptorHandle;

pub(super) struct RenderTargets<B: Backend> {
    pub heap: B::DescriptorHeap,
    pub heap_start: DescriptorHandle,
    pub descriptor_size: u32,
    pub targets: [B::Resource; FRAME_COUNT as usize],
}

/// One RTV heap slot per swap-chain buffer; slot `i` views buffer `i`.
pub(super) fn create_render_targets<B: Backend>(
    backend: &mut B,
    device: &B::Device,
    swap_chain: &B::SwapChain,
) -> AppResult<RenderTargets<B>> {
    let heap = backend.create_rtv_heap(device, FRAME_COUNT)?;
    let descriptor_size = backend.rtv_increment_size(device);
    let heap_start = backend.heap_start(&heap);

    let targets = array_init::try_array_init(|index| -> Result<B::Resource, AppReport> {
        let index = index as u32;
        let resource = backend.swap_chain_buffer(swap_chain, index)?;
        let handle = heap_start.offset(index, descriptor_size);
        backend.create_render_target_view(device, &resource, handle);
        debug!(index, ptr = handle.ptr, "Created render target view");
        Ok(resource)
    })?;

    Ok(RenderTargets {
        heap,
        heap_start,
        descriptor_size,
        targets,
    })
}
