use windows::Win32::Graphics::Direct3D::*;
use windows::Win32::Graphics::Direct3D12::*;

use crate::app_error::AppResult;
use crate::app_error::GraphicsError;

fn blob_bytes(blob: &ID3DBlob) -> &[u8] {
    unsafe { std::slice::from_raw_parts(blob.GetBufferPointer() as *const u8, blob.GetBufferSize()) }
}

/// No parameters, just permission to use the input assembler.
pub fn create_root_signature(device: &ID3D12Device) -> AppResult<ID3D12RootSignature> {
    let desc = D3D12_ROOT_SIGNATURE_DESC {
        Flags: D3D12_ROOT_SIGNATURE_FLAG_ALLOW_INPUT_ASSEMBLER_INPUT_LAYOUT,
        ..Default::default()
    };

    let mut signature_blob = None;
    let mut error_blob = None;
    let serialized = unsafe {
        D3D12SerializeRootSignature(
            &desc,
            D3D_ROOT_SIGNATURE_VERSION_1,
            &mut signature_blob,
            Some(&mut error_blob),
        )
    };

    let signature_blob = match (serialized, signature_blob) {
        (Ok(()), Some(blob)) => blob,
        (result, _) => {
            let reason = match (error_blob, result) {
                (Some(error), _) => String::from_utf8_lossy(blob_bytes(&error)).trim().to_string(),
                (None, Err(e)) => e.message().to_string(),
                (None, Ok(())) => "serializer returned no blob".to_string(),
            };
            return Err(GraphicsError::Api {
                call: "D3D12SerializeRootSignature",
                reason,
            }
            .into());
        }
    };

    let signature = unsafe { device.CreateRootSignature(0, blob_bytes(&signature_blob)) }?;
    Ok(signature)
}
