use std::ffi::CString;

use windows::Win32::Foundation::*;
use windows::Win32::Graphics::Direct3D::*;
use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::Graphics::Dxgi::Common::*;
use windows::core::*;

use super::D3d12Backend;
use super::dxgi_format;
use crate::app_error::AppResult;
use crate::backend::CullMode;
use crate::backend::FillMode;
use crate::backend::PipelineDesc;

fn shader_bytecode(blob: &ID3DBlob) -> D3D12_SHADER_BYTECODE {
    D3D12_SHADER_BYTECODE {
        pShaderBytecode: unsafe { blob.GetBufferPointer() },
        BytecodeLength: unsafe { blob.GetBufferSize() },
    }
}

pub fn create_pipeline_state(
    device: &ID3D12Device,
    desc: &PipelineDesc<'_, D3d12Backend>,
) -> AppResult<ID3D12PipelineState> {
    // Semantic names must outlive the CreateGraphicsPipelineState call.
    let semantic_names = desc
        .input_layout
        .iter()
        .map(|element| CString::new(element.semantic_name))
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| eyre::eyre!(e))?;
    let input_element_descs: Vec<D3D12_INPUT_ELEMENT_DESC> = desc
        .input_layout
        .iter()
        .zip(&semantic_names)
        .map(|(element, name)| D3D12_INPUT_ELEMENT_DESC {
            SemanticName: PCSTR(name.as_ptr() as *const u8),
            Format: dxgi_format(element.format),
            AlignedByteOffset: element.aligned_byte_offset,
            InputSlotClass: D3D12_INPUT_CLASSIFICATION_PER_VERTEX_DATA,
            ..Default::default()
        })
        .collect();

    let rasterizer = desc.rasterizer;
    let mut rtv_formats = [DXGI_FORMAT_UNKNOWN; 8];
    rtv_formats[0] = dxgi_format(desc.render_target_format);

    let pso_desc = D3D12_GRAPHICS_PIPELINE_STATE_DESC {
        pRootSignature: unsafe { std::mem::transmute_copy(desc.root_signature) },
        VS: shader_bytecode(desc.vertex_shader),
        PS: shader_bytecode(desc.pixel_shader),
        InputLayout: D3D12_INPUT_LAYOUT_DESC {
            pInputElementDescs: input_element_descs.as_ptr(),
            NumElements: input_element_descs.len() as u32,
        },
        RasterizerState: D3D12_RASTERIZER_DESC {
            FillMode: match rasterizer.fill_mode {
                FillMode::Solid => D3D12_FILL_MODE_SOLID,
            },
            CullMode: match rasterizer.cull_mode {
                CullMode::None => D3D12_CULL_MODE_NONE,
            },
            FrontCounterClockwise: rasterizer.front_counter_clockwise.into(),
            DepthBias: 0,
            DepthBiasClamp: 0.0,
            SlopeScaledDepthBias: 0.0,
            DepthClipEnable: rasterizer.depth_clip_enable.into(),
            MultisampleEnable: rasterizer.multisample_enable.into(),
            AntialiasedLineEnable: rasterizer.antialiased_line_enable.into(),
            ForcedSampleCount: 0,
            ConservativeRaster: D3D12_CONSERVATIVE_RASTERIZATION_MODE_OFF,
        },
        BlendState: D3D12_BLEND_DESC {
            AlphaToCoverageEnable: desc.blend.alpha_to_coverage_enable.into(),
            IndependentBlendEnable: FALSE,
            RenderTarget: [D3D12_RENDER_TARGET_BLEND_DESC {
                BlendEnable: desc.blend.blend_enable.into(),
                LogicOpEnable: FALSE,
                SrcBlend: D3D12_BLEND_ONE,
                DestBlend: D3D12_BLEND_ZERO,
                BlendOp: D3D12_BLEND_OP_ADD,
                SrcBlendAlpha: D3D12_BLEND_ONE,
                DestBlendAlpha: D3D12_BLEND_ZERO,
                BlendOpAlpha: D3D12_BLEND_OP_ADD,
                LogicOp: D3D12_LOGIC_OP_NOOP,
                RenderTargetWriteMask: D3D12_COLOR_WRITE_ENABLE_ALL.0 as u8,
            }; 8],
        },
        DepthStencilState: D3D12_DEPTH_STENCIL_DESC {
            DepthEnable: FALSE,
            StencilEnable: FALSE,
            ..Default::default()
        },
        SampleMask: u32::MAX,
        PrimitiveTopologyType: D3D12_PRIMITIVE_TOPOLOGY_TYPE_TRIANGLE,
        NumRenderTargets: 1,
        RTVFormats: rtv_formats,
        SampleDesc: DXGI_SAMPLE_DESC {
            Count: 1,
            Quality: 0,
        },
        ..Default::default()
    };

    let pipeline_state = unsafe { device.CreateGraphicsPipelineState(&pso_desc) }?;
    Ok(pipeline_state)
}
