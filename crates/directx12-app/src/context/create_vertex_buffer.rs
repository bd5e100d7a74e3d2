use tracing::debug;

use crate::app_error::AppResult;
use crate::backend::Backend;
use crate::backend::VertexBufferView;
use crate::vertex::VERTEX_STRIDE;
use crate::vertex::triangle_bytes;

// Written once into an upload-heap buffer, never touched again.
pub(super) fn create_vertex_buffer<B: Backend>(
    backend: &mut B,
    device: &B::Device,
) -> AppResult<(B::Resource, VertexBufferView)> {
    let bytes = triangle_bytes();
    let vertex_buffer = backend.create_upload_buffer(device, bytes)?;

    let view = VertexBufferView {
        buffer_location: backend.gpu_virtual_address(&vertex_buffer),
        size_in_bytes: bytes.len() as u32,
        stride_in_bytes: VERTEX_STRIDE,
    };
    debug!(
        size = view.size_in_bytes,
        stride = view.stride_in_bytes,
        "Uploaded vertex buffer"
    );
    Ok((vertex_buffer, view))
}
