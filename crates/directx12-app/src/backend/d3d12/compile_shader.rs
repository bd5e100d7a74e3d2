use std::ffi::CString;

use windows::Win32::Graphics::Direct3D::Fxc::*;
use windows::Win32::Graphics::Direct3D::*;
use windows::core::*;

use crate::app_error::AppResult;
use crate::app_error::GraphicsError;
use crate::backend::CompiledShader;
use crate::backend::ShaderSource;

fn blob_text(blob: &ID3DBlob) -> String {
    let bytes = unsafe {
        std::slice::from_raw_parts(blob.GetBufferPointer() as *const u8, blob.GetBufferSize())
    };
    String::from_utf8_lossy(bytes)
        .trim_end_matches('\0')
        .trim()
        .to_string()
}

/// Compiles one HLSL file with FXC. Compiler output on success comes back as
/// warnings; on failure it becomes the error's log.
pub fn compile_shader(source: &ShaderSource) -> AppResult<CompiledShader<ID3DBlob>> {
    let flags = if cfg!(debug_assertions) {
        D3DCOMPILE_DEBUG | D3DCOMPILE_SKIP_OPTIMIZATION
    } else {
        0
    };

    let path = HSTRING::from(source.path.as_os_str());
    let entry_point = CString::new(source.entry_point).map_err(|e| eyre::eyre!(e))?;
    let target = CString::new(source.stage.target()).map_err(|e| eyre::eyre!(e))?;

    let mut shader_blob = None;
    let mut error_blob = None;
    let result = unsafe {
        D3DCompileFromFile(
            &path,
            None,
            None,
            PCSTR(entry_point.as_ptr() as *const u8),
            PCSTR(target.as_ptr() as *const u8),
            flags,
            0,
            &mut shader_blob,
            Some(&mut error_blob),
        )
    };
    let log = error_blob.as_ref().map(blob_text).filter(|log| !log.is_empty());

    match (result, shader_blob) {
        (Ok(()), Some(blob)) => Ok(CompiledShader {
            blob,
            warnings: log,
        }),
        (result, _) => Err(GraphicsError::ShaderCompilation {
            path: source.path.clone(),
            log: log.unwrap_or_else(|| match result {
                Err(e) => e.message().to_string(),
                Ok(()) => "compiler returned no bytecode".to_string(),
            }),
        }
        .into()),
    }
}
