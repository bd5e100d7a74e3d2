use tracing::debug;
use tracing::warn;

use crate::app_error::AppResult;
use crate::app_error::WrapStep;
use crate::backend::Backend;
use crate::backend::BlendState;
use crate::backend::InputElement;
use crate::backend::PipelineDesc;
use crate::backend::PixelFormat;
use crate::backend::RasterizerState;
use crate::backend::ShaderSource;
use crate::shader_paths::ShaderPaths;

const INPUT_LAYOUT: [InputElement; 1] = [InputElement {
    semantic_name: "POSITION",
    format: PixelFormat::Rgb32Float,
    aligned_byte_offset: 0,
}];

pub(super) fn create_pipeline_state<B: Backend>(
    backend: &mut B,
    device: &B::Device,
    shaders: &ShaderPaths,
) -> AppResult<(B::RootSignature, B::PipelineState)> {
    let [vertex_source, pixel_source] = shaders.sources();
    let vertex_shader = compile_shader(backend, &vertex_source).step("compiling the vertex shader")?;
    let pixel_shader = compile_shader(backend, &pixel_source).step("compiling the pixel shader")?;

    let root_signature = backend
        .create_empty_root_signature(device)
        .step("creating the root signature")?;

    let desc = PipelineDesc::<B> {
        root_signature: &root_signature,
        vertex_shader: &vertex_shader,
        pixel_shader: &pixel_shader,
        input_layout: &INPUT_LAYOUT,
        rasterizer: RasterizerState::default(),
        blend: BlendState::default(),
        render_target_format: PixelFormat::Rgba8Unorm,
    };
    let pipeline_state = backend.create_pipeline_state(device, &desc)?;
    debug!("Created pipeline state");

    Ok((root_signature, pipeline_state))
}

// Compiler warnings are logged, only a failed compile is an error.
fn compile_shader<B: Backend>(backend: &mut B, source: &ShaderSource) -> AppResult<B::ShaderBlob> {
    let compiled = backend.compile_shader(source)?;
    if let Some(warnings) = compiled.warnings {
        warn!(
            path = %source.path.display(),
            "Shader compiler output:\n{}",
            warnings.trim_end()
        );
    }
    Ok(compiled.blob)
}
