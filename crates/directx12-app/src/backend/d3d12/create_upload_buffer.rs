use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::Graphics::Dxgi::Common::*;
use windows::core::*;

use crate::app_error::AppResult;
use crate::app_error::GraphicsError;

/// Creates a committed buffer on the upload heap and copies `bytes` into it.
/// The buffer stays in `GENERIC_READ` for its whole life.
pub fn create_upload_buffer(device: &ID3D12Device, bytes: &[u8]) -> AppResult<ID3D12Resource> {
    let heap_props = D3D12_HEAP_PROPERTIES {
        Type: D3D12_HEAP_TYPE_UPLOAD,
        ..Default::default()
    };
    let resource_desc = D3D12_RESOURCE_DESC {
        Dimension: D3D12_RESOURCE_DIMENSION_BUFFER,
        Alignment: 0,
        Width: bytes.len() as u64,
        Height: 1,
        DepthOrArraySize: 1,
        MipLevels: 1,
        Format: DXGI_FORMAT_UNKNOWN,
        SampleDesc: DXGI_SAMPLE_DESC {
            Count: 1,
            Quality: 0,
        },
        Layout: D3D12_TEXTURE_LAYOUT_ROW_MAJOR,
        Flags: D3D12_RESOURCE_FLAG_NONE,
    };

    let mut buffer: Option<ID3D12Resource> = None;
    unsafe {
        device.CreateCommittedResource(
            &heap_props,
            D3D12_HEAP_FLAG_NONE,
            &resource_desc,
            D3D12_RESOURCE_STATE_GENERIC_READ,
            None,
            &mut buffer,
        )?
    };
    let buffer = buffer.ok_or_else(|| GraphicsError::Api {
        call: "CreateCommittedResource",
        reason: "succeeded without returning a resource".to_string(),
    })?;
    unsafe { buffer.SetName(w!("VertexBuffer")) }.ok();

    unsafe {
        let mut data = std::ptr::null_mut();
        // Empty read range: the CPU never reads this buffer.
        let read_range = D3D12_RANGE { Begin: 0, End: 0 };
        buffer.Map(0, Some(&read_range), Some(&mut data))?;
        std::ptr::copy_nonoverlapping(bytes.as_ptr(), data as *mut u8, bytes.len());
        buffer.Unmap(0, None);
    }

    Ok(buffer)
}
