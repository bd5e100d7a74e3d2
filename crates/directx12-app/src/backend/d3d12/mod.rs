//! Direct3D 12 and DXGI behind the [`Backend`] trait.

mod compile_shader;
mod create_pipeline_state;
mod create_root_signature;
mod create_upload_buffer;
mod debug_messages;
mod transition_barrier;

use windows::Win32::Foundation::*;
use windows::Win32::Graphics::Direct3D::*;
use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::Graphics::Dxgi::Common::*;
use windows::Win32::Graphics::Dxgi::*;
use windows::Win32::UI::WindowsAndMessaging::GetClientRect;
use windows::core::*;

use super::Backend;
use super::ClientSize;
use super::Command;
use super::CompiledShader;
use super::DebugLayer;
use super::DescriptorHandle;
use super::FeatureLevel;
use super::PipelineDesc;
use super::PixelFormat;
use super::PrimitiveTopology;
use super::ResourceState;
use super::ShaderSource;
use super::SwapChainDesc;
use crate::app_error::AppResult;
use crate::app_error::GraphicsError;

/// The DXGI factory is created on first use so that the debug flag picked up
/// by `enable_debug_layer` is applied to it.
#[derive(Default)]
pub struct D3d12Backend {
    factory_flags: DXGI_CREATE_FACTORY_FLAGS,
    factory: Option<IDXGIFactory4>,
    info_queue: Option<IDXGIInfoQueue>,
}

impl D3d12Backend {
    pub fn new() -> Self {
        Self::default()
    }

    fn factory(&mut self) -> AppResult<IDXGIFactory4> {
        if let Some(factory) = &self.factory {
            return Ok(factory.clone());
        }
        let factory: IDXGIFactory4 = unsafe { CreateDXGIFactory2(self.factory_flags) }?;
        self.factory = Some(factory.clone());
        Ok(factory)
    }
}

pub(crate) fn d3d_feature_level(level: FeatureLevel) -> D3D_FEATURE_LEVEL {
    match level {
        FeatureLevel::Level11_0 => D3D_FEATURE_LEVEL_11_0,
        FeatureLevel::Level11_1 => D3D_FEATURE_LEVEL_11_1,
        FeatureLevel::Level12_0 => D3D_FEATURE_LEVEL_12_0,
        FeatureLevel::Level12_1 => D3D_FEATURE_LEVEL_12_1,
    }
}

pub(crate) fn dxgi_format(format: PixelFormat) -> DXGI_FORMAT {
    match format {
        PixelFormat::Rgba8Unorm => DXGI_FORMAT_R8G8B8A8_UNORM,
        PixelFormat::Rgb32Float => DXGI_FORMAT_R32G32B32_FLOAT,
    }
}

fn resource_state(state: ResourceState) -> D3D12_RESOURCE_STATES {
    match state {
        ResourceState::Present => D3D12_RESOURCE_STATE_PRESENT,
        ResourceState::RenderTarget => D3D12_RESOURCE_STATE_RENDER_TARGET,
    }
}

fn cpu_handle(handle: DescriptorHandle) -> D3D12_CPU_DESCRIPTOR_HANDLE {
    D3D12_CPU_DESCRIPTOR_HANDLE { ptr: handle.ptr }
}

impl Backend for D3d12Backend {
    type Window = HWND;
    type Adapter = IDXGIAdapter1;
    type Device = ID3D12Device;
    type CommandQueue = ID3D12CommandQueue;
    type SwapChain = IDXGISwapChain3;
    type DescriptorHeap = ID3D12DescriptorHeap;
    type Resource = ID3D12Resource;
    type ShaderBlob = ID3DBlob;
    type RootSignature = ID3D12RootSignature;
    type PipelineState = ID3D12PipelineState;
    type CommandAllocator = ID3D12CommandAllocator;
    type CommandList = ID3D12GraphicsCommandList;

    fn name(&self) -> &'static str {
        "d3d12"
    }

    fn enable_debug_layer(&mut self) -> AppResult<DebugLayer> {
        let mut debug: Option<ID3D12Debug> = None;
        match unsafe { D3D12GetDebugInterface(&mut debug) } {
            Ok(()) => {
                let Some(debug) = debug else {
                    return Ok(DebugLayer::Unavailable);
                };
                unsafe { debug.EnableDebugLayer() };
                self.factory_flags |= DXGI_CREATE_FACTORY_DEBUG;
                self.info_queue = unsafe { DXGIGetDebugInterface1::<IDXGIInfoQueue>(0) }.ok();
                Ok(DebugLayer::Enabled)
            }
            Err(e)
                if e.code() == DXGI_ERROR_SDK_COMPONENT_MISSING || e.code() == E_NOINTERFACE =>
            {
                Ok(DebugLayer::Unavailable)
            }
            Err(e) => Err(GraphicsError::DebugLayer(e.message().to_string()).into()),
        }
    }

    fn enum_adapter(&mut self, index: u32) -> AppResult<Option<IDXGIAdapter1>> {
        let factory = self.factory()?;
        match unsafe { factory.EnumAdapters1(index) } {
            Ok(adapter) => Ok(Some(adapter)),
            Err(e) if e.code() == DXGI_ERROR_NOT_FOUND => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn warp_adapter(&mut self) -> AppResult<IDXGIAdapter1> {
        let factory = self.factory()?;
        Ok(unsafe { factory.EnumWarpAdapter() }?)
    }

    fn adapter_name(&self, adapter: &IDXGIAdapter1) -> AppResult<String> {
        let desc = unsafe { adapter.GetDesc1()? };
        Ok(String::from_utf16_lossy(&desc.Description)
            .trim_end_matches('\0')
            .to_string())
    }

    fn supports_feature_level(&mut self, adapter: &IDXGIAdapter1, level: FeatureLevel) -> bool {
        unsafe {
            D3D12CreateDevice(
                adapter,
                d3d_feature_level(level),
                std::ptr::null_mut::<Option<ID3D12Device>>(),
            )
        }
        .is_ok()
    }

    fn create_device(&mut self, adapter: &IDXGIAdapter1, level: FeatureLevel) -> AppResult<ID3D12Device> {
        let mut device: Option<ID3D12Device> = None;
        unsafe { D3D12CreateDevice(adapter, d3d_feature_level(level), &mut device) }?;
        device.ok_or_else(|| {
            GraphicsError::Api {
                call: "D3D12CreateDevice",
                reason: "succeeded without returning a device".to_string(),
            }
            .into()
        })
    }

    fn create_command_queue(&mut self, device: &ID3D12Device) -> AppResult<ID3D12CommandQueue> {
        let queue = unsafe {
            device.CreateCommandQueue(&D3D12_COMMAND_QUEUE_DESC {
                Type: D3D12_COMMAND_LIST_TYPE_DIRECT,
                Priority: D3D12_COMMAND_QUEUE_PRIORITY_NORMAL.0,
                Flags: D3D12_COMMAND_QUEUE_FLAG_NONE,
                NodeMask: 0,
            })?
        };
        Ok(queue)
    }

    fn client_size(&self, window: HWND) -> AppResult<ClientSize> {
        let mut rect = RECT::default();
        unsafe { GetClientRect(window, &mut rect)? };
        Ok(ClientSize {
            width: (rect.right - rect.left) as u32,
            height: (rect.bottom - rect.top) as u32,
        })
    }

    fn create_swap_chain(
        &mut self,
        queue: &ID3D12CommandQueue,
        window: HWND,
        desc: &SwapChainDesc,
    ) -> AppResult<IDXGISwapChain3> {
        let factory = self.factory()?;
        let swap_chain_desc = DXGI_SWAP_CHAIN_DESC1 {
            BufferCount: desc.buffer_count,
            Width: desc.width,
            Height: desc.height,
            Format: dxgi_format(desc.format),
            BufferUsage: DXGI_USAGE_RENDER_TARGET_OUTPUT,
            SwapEffect: DXGI_SWAP_EFFECT_FLIP_DISCARD,
            SampleDesc: DXGI_SAMPLE_DESC {
                Count: 1,
                Quality: 0,
            },
            ..Default::default()
        };

        let swap_chain: IDXGISwapChain1 =
            unsafe { factory.CreateSwapChainForHwnd(queue, window, &swap_chain_desc, None, None)? };
        let swap_chain: IDXGISwapChain3 = swap_chain.cast()?;

        if !desc.windowed {
            unsafe { swap_chain.SetFullscreenState(true, None)? };
        }
        Ok(swap_chain)
    }

    fn create_rtv_heap(
        &mut self,
        device: &ID3D12Device,
        descriptor_count: u32,
    ) -> AppResult<ID3D12DescriptorHeap> {
        let heap = unsafe {
            device.CreateDescriptorHeap(&D3D12_DESCRIPTOR_HEAP_DESC {
                Type: D3D12_DESCRIPTOR_HEAP_TYPE_RTV,
                NumDescriptors: descriptor_count,
                Flags: D3D12_DESCRIPTOR_HEAP_FLAG_NONE,
                NodeMask: 0,
            })
        }?;
        Ok(heap)
    }

    fn rtv_increment_size(&self, device: &ID3D12Device) -> u32 {
        unsafe { device.GetDescriptorHandleIncrementSize(D3D12_DESCRIPTOR_HEAP_TYPE_RTV) }
    }

    fn heap_start(&self, heap: &ID3D12DescriptorHeap) -> DescriptorHandle {
        DescriptorHandle {
            ptr: unsafe { heap.GetCPUDescriptorHandleForHeapStart() }.ptr,
        }
    }

    fn swap_chain_buffer(
        &mut self,
        swap_chain: &IDXGISwapChain3,
        index: u32,
    ) -> AppResult<ID3D12Resource> {
        Ok(unsafe { swap_chain.GetBuffer(index) }?)
    }

    fn create_render_target_view(
        &mut self,
        device: &ID3D12Device,
        resource: &ID3D12Resource,
        handle: DescriptorHandle,
    ) {
        unsafe { device.CreateRenderTargetView(resource, None, cpu_handle(handle)) };
    }

    fn compile_shader(&mut self, source: &ShaderSource) -> AppResult<CompiledShader<ID3DBlob>> {
        compile_shader::compile_shader(source)
    }

    fn create_empty_root_signature(
        &mut self,
        device: &ID3D12Device,
    ) -> AppResult<ID3D12RootSignature> {
        create_root_signature::create_root_signature(device)
    }

    fn create_pipeline_state(
        &mut self,
        device: &ID3D12Device,
        desc: &PipelineDesc<'_, Self>,
    ) -> AppResult<ID3D12PipelineState> {
        create_pipeline_state::create_pipeline_state(device, desc)
    }

    fn create_command_allocator(&mut self, device: &ID3D12Device) -> AppResult<ID3D12CommandAllocator> {
        Ok(unsafe { device.CreateCommandAllocator(D3D12_COMMAND_LIST_TYPE_DIRECT) }?)
    }

    fn create_command_list(
        &mut self,
        device: &ID3D12Device,
        allocator: &ID3D12CommandAllocator,
        initial_state: &ID3D12PipelineState,
    ) -> AppResult<ID3D12GraphicsCommandList> {
        Ok(unsafe {
            device.CreateCommandList(0, D3D12_COMMAND_LIST_TYPE_DIRECT, allocator, initial_state)
        }?)
    }

    fn create_upload_buffer(&mut self, device: &ID3D12Device, bytes: &[u8]) -> AppResult<ID3D12Resource> {
        create_upload_buffer::create_upload_buffer(device, bytes)
    }

    fn gpu_virtual_address(&self, resource: &ID3D12Resource) -> u64 {
        unsafe { resource.GetGPUVirtualAddress() }
    }

    fn reset_command_allocator(&mut self, allocator: &ID3D12CommandAllocator) -> AppResult<()> {
        Ok(unsafe { allocator.Reset() }?)
    }

    fn reset_command_list(
        &mut self,
        list: &ID3D12GraphicsCommandList,
        allocator: &ID3D12CommandAllocator,
        initial_state: &ID3D12PipelineState,
    ) -> AppResult<()> {
        Ok(unsafe { list.Reset(allocator, initial_state) }?)
    }

    fn current_back_buffer_index(&self, swap_chain: &IDXGISwapChain3) -> u32 {
        unsafe { swap_chain.GetCurrentBackBufferIndex() }
    }

    fn record(&mut self, list: &ID3D12GraphicsCommandList, command: Command<'_, Self>) {
        unsafe {
            match command {
                Command::ResourceBarrier {
                    resource,
                    before,
                    after,
                } => list.ResourceBarrier(&[transition_barrier::transition_barrier(
                    resource,
                    resource_state(before),
                    resource_state(after),
                )]),
                Command::SetRenderTarget(handle) => {
                    list.OMSetRenderTargets(1, Some(&cpu_handle(handle)), false, None)
                }
                Command::SetViewport(viewport) => list.RSSetViewports(&[D3D12_VIEWPORT {
                    TopLeftX: viewport.top_left_x,
                    TopLeftY: viewport.top_left_y,
                    Width: viewport.width,
                    Height: viewport.height,
                    MinDepth: viewport.min_depth,
                    MaxDepth: viewport.max_depth,
                }]),
                Command::SetScissorRect(rect) => list.RSSetScissorRects(&[RECT {
                    left: rect.left,
                    top: rect.top,
                    right: rect.right,
                    bottom: rect.bottom,
                }]),
                Command::ClearRenderTarget { target, color } => {
                    list.ClearRenderTargetView(cpu_handle(target), &color, None)
                }
                Command::SetPipelineState(pso) => list.SetPipelineState(pso),
                Command::SetGraphicsRootSignature(signature) => {
                    list.SetGraphicsRootSignature(signature)
                }
                Command::SetVertexBuffer(view) => list.IASetVertexBuffers(
                    0,
                    Some(&[D3D12_VERTEX_BUFFER_VIEW {
                        BufferLocation: view.buffer_location,
                        SizeInBytes: view.size_in_bytes,
                        StrideInBytes: view.stride_in_bytes,
                    }]),
                ),
                Command::SetPrimitiveTopology(PrimitiveTopology::TriangleList) => {
                    list.IASetPrimitiveTopology(D3D_PRIMITIVE_TOPOLOGY_TRIANGLELIST)
                }
                Command::DrawInstanced {
                    vertex_count,
                    instance_count,
                    start_vertex,
                    start_instance,
                } => list.DrawInstanced(vertex_count, instance_count, start_vertex, start_instance),
            }
        }
    }

    fn close_command_list(&mut self, list: &ID3D12GraphicsCommandList) -> AppResult<()> {
        Ok(unsafe { list.Close() }?)
    }

    fn execute_command_lists(
        &mut self,
        queue: &ID3D12CommandQueue,
        lists: &[&ID3D12GraphicsCommandList],
    ) -> AppResult<()> {
        let lists = lists
            .iter()
            .map(|list| list.cast::<ID3D12CommandList>().map(Some))
            .collect::<Result<Vec<_>>>()?;
        unsafe { queue.ExecuteCommandLists(&lists) };
        Ok(())
    }

    fn present(&mut self, swap_chain: &IDXGISwapChain3, sync_interval: u32) -> AppResult<()> {
        unsafe { swap_chain.Present(sync_interval, DXGI_PRESENT(0)) }.ok()?;
        Ok(())
    }

    fn leave_fullscreen(&mut self, swap_chain: &IDXGISwapChain3) -> AppResult<()> {
        unsafe { swap_chain.SetFullscreenState(false, None)? };
        Ok(())
    }

    fn flush_debug_messages(&mut self) {
        debug_messages::flush_debug_messages(self.info_queue.as_ref());
    }
}
