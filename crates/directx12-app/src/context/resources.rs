use super::FRAME_COUNT;
use crate::backend::Backend;
use crate::backend::ClientSize;
use crate::backend::DescriptorHandle;
use crate::backend::ScissorRect;
use crate::backend::VertexBufferView;
use crate::backend::Viewport;

/// Everything the context owns on the GPU side. Dropped together.
pub struct Resources<B: Backend> {
    pub device: B::Device,
    pub command_queue: B::CommandQueue,
    pub swap_chain: B::SwapChain,
    pub rtv_heap: B::DescriptorHeap,
    pub rtv_heap_start: DescriptorHandle,
    pub rtv_descriptor_size: u32,
    pub render_targets: [B::Resource; FRAME_COUNT as usize],
    pub root_signature: B::RootSignature,
    pub pipeline_state: B::PipelineState,
    pub command_allocator: B::CommandAllocator,
    pub command_list: B::CommandList,
    pub vertex_buffer: B::Resource,
    pub vertex_buffer_view: VertexBufferView,
    pub client_size: ClientSize,
    pub viewport: Viewport,
    pub scissor_rect: ScissorRect,
}

impl<B: Backend> Resources<B> {
    pub fn rtv_handle(&self, frame_index: u32) -> DescriptorHandle {
        self.rtv_heap_start
            .offset(frame_index, self.rtv_descriptor_size)
    }
}
