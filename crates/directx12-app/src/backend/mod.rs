//! The seam between the graphics context and a concrete GPU API.
//!
//! Every method maps to one call of the underlying API. The context decides
//! the order; a backend only performs the call and reports failure.

#[cfg(windows)]
pub mod d3d12;
pub mod headless;

use std::path::Path;
use std::path::PathBuf;

use crate::app_error::AppResult;

/// Minimum capability level a device must be created at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FeatureLevel {
    Level11_0,
    Level11_1,
    Level12_0,
    Level12_1,
}

/// Outcome of asking the platform for its validation layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DebugLayer {
    Enabled,
    Unavailable,
    Disabled,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelFormat {
    Rgba8Unorm,
    Rgb32Float,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SwapChainDesc {
    pub buffer_count: u32,
    pub format: PixelFormat,
    pub width: u32,
    pub height: u32,
    pub windowed: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClientSize {
    pub width: u32,
    pub height: u32,
}

/// CPU address of a descriptor slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DescriptorHandle {
    pub ptr: usize,
}

impl DescriptorHandle {
    /// Slot `index` of a heap whose slots are `increment_size` bytes apart.
    pub fn offset(self, index: u32, increment_size: u32) -> Self {
        Self {
            ptr: self.ptr + (index as usize) * (increment_size as usize),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VertexBufferView {
    pub buffer_location: u64,
    pub size_in_bytes: u32,
    pub stride_in_bytes: u32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub top_left_x: f32,
    pub top_left_y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Viewport {
    pub fn covering(size: ClientSize) -> Self {
        Self {
            top_left_x: 0.0,
            top_left_y: 0.0,
            width: size.width as f32,
            height: size.height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScissorRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl ScissorRect {
    pub fn covering(size: ClientSize) -> Self {
        Self {
            left: 0,
            top: 0,
            right: size.width as i32,
            bottom: size.height as i32,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrimitiveTopology {
    TriangleList,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResourceState {
    Present,
    RenderTarget,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Pixel,
}

impl ShaderStage {
    pub fn target(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vs_5_0",
            ShaderStage::Pixel => "ps_5_0",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShaderSource {
    pub path: PathBuf,
    pub entry_point: &'static str,
    pub stage: ShaderStage,
}

impl ShaderSource {
    pub fn new(path: impl AsRef<Path>, stage: ShaderStage) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            entry_point: "main",
            stage,
        }
    }
}

/// A compiled shader plus whatever the compiler printed while succeeding.
pub struct CompiledShader<Blob> {
    pub blob: Blob,
    pub warnings: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InputElement {
    pub semantic_name: &'static str,
    pub format: PixelFormat,
    pub aligned_byte_offset: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FillMode {
    Solid,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CullMode {
    None,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RasterizerState {
    pub fill_mode: FillMode,
    pub cull_mode: CullMode,
    pub front_counter_clockwise: bool,
    pub depth_clip_enable: bool,
    pub multisample_enable: bool,
    pub antialiased_line_enable: bool,
}

impl Default for RasterizerState {
    fn default() -> Self {
        Self {
            fill_mode: FillMode::Solid,
            cull_mode: CullMode::None,
            front_counter_clockwise: false,
            depth_clip_enable: true,
            multisample_enable: false,
            antialiased_line_enable: false,
        }
    }
}

/// Blending off, every channel written.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct BlendState {
    pub alpha_to_coverage_enable: bool,
    pub blend_enable: bool,
}

pub struct PipelineDesc<'a, B: Backend + ?Sized> {
    pub root_signature: &'a B::RootSignature,
    pub vertex_shader: &'a B::ShaderBlob,
    pub pixel_shader: &'a B::ShaderBlob,
    pub input_layout: &'a [InputElement],
    pub rasterizer: RasterizerState,
    pub blend: BlendState,
    pub render_target_format: PixelFormat,
}

/// One entry of a command list recording.
pub enum Command<'a, B: Backend + ?Sized> {
    ResourceBarrier {
        resource: &'a B::Resource,
        before: ResourceState,
        after: ResourceState,
    },
    SetRenderTarget(DescriptorHandle),
    SetViewport(Viewport),
    SetScissorRect(ScissorRect),
    ClearRenderTarget {
        target: DescriptorHandle,
        color: [f32; 4],
    },
    SetPipelineState(&'a B::PipelineState),
    SetGraphicsRootSignature(&'a B::RootSignature),
    SetVertexBuffer(VertexBufferView),
    SetPrimitiveTopology(PrimitiveTopology),
    DrawInstanced {
        vertex_count: u32,
        instance_count: u32,
        start_vertex: u32,
        start_instance: u32,
    },
}

pub trait Backend {
    /// Native window the swap chain presents into.
    type Window: Copy;
    type Adapter;
    type Device;
    type CommandQueue;
    type SwapChain;
    type DescriptorHeap;
    type Resource;
    type ShaderBlob;
    type RootSignature;
    type PipelineState;
    type CommandAllocator;
    type CommandList;

    fn name(&self) -> &'static str;

    fn enable_debug_layer(&mut self) -> AppResult<DebugLayer>;

    /// Adapter `index` in enumeration order, `None` past the last one.
    fn enum_adapter(&mut self, index: u32) -> AppResult<Option<Self::Adapter>>;
    fn warp_adapter(&mut self) -> AppResult<Self::Adapter>;
    fn adapter_name(&self, adapter: &Self::Adapter) -> AppResult<String>;
    fn supports_feature_level(&mut self, adapter: &Self::Adapter, level: FeatureLevel) -> bool;
    fn create_device(
        &mut self,
        adapter: &Self::Adapter,
        level: FeatureLevel,
    ) -> AppResult<Self::Device>;

    fn create_command_queue(&mut self, device: &Self::Device) -> AppResult<Self::CommandQueue>;
    fn client_size(&self, window: Self::Window) -> AppResult<ClientSize>;
    fn create_swap_chain(
        &mut self,
        queue: &Self::CommandQueue,
        window: Self::Window,
        desc: &SwapChainDesc,
    ) -> AppResult<Self::SwapChain>;

    fn create_rtv_heap(
        &mut self,
        device: &Self::Device,
        descriptor_count: u32,
    ) -> AppResult<Self::DescriptorHeap>;
    fn rtv_increment_size(&self, device: &Self::Device) -> u32;
    fn heap_start(&self, heap: &Self::DescriptorHeap) -> DescriptorHandle;
    fn swap_chain_buffer(
        &mut self,
        swap_chain: &Self::SwapChain,
        index: u32,
    ) -> AppResult<Self::Resource>;
    fn create_render_target_view(
        &mut self,
        device: &Self::Device,
        resource: &Self::Resource,
        handle: DescriptorHandle,
    );

    fn compile_shader(
        &mut self,
        source: &ShaderSource,
    ) -> AppResult<CompiledShader<Self::ShaderBlob>>;
    /// Root signature with no parameters that still admits input-assembler input.
    fn create_empty_root_signature(
        &mut self,
        device: &Self::Device,
    ) -> AppResult<Self::RootSignature>;
    fn create_pipeline_state(
        &mut self,
        device: &Self::Device,
        desc: &PipelineDesc<'_, Self>,
    ) -> AppResult<Self::PipelineState>;

    fn create_command_allocator(
        &mut self,
        device: &Self::Device,
    ) -> AppResult<Self::CommandAllocator>;
    /// The returned list is recording.
    fn create_command_list(
        &mut self,
        device: &Self::Device,
        allocator: &Self::CommandAllocator,
        initial_state: &Self::PipelineState,
    ) -> AppResult<Self::CommandList>;

    /// Creates a CPU-writable, GPU-readable buffer holding `bytes`.
    fn create_upload_buffer(
        &mut self,
        device: &Self::Device,
        bytes: &[u8],
    ) -> AppResult<Self::Resource>;
    fn gpu_virtual_address(&self, resource: &Self::Resource) -> u64;

    fn reset_command_allocator(&mut self, allocator: &Self::CommandAllocator) -> AppResult<()>;
    fn reset_command_list(
        &mut self,
        list: &Self::CommandList,
        allocator: &Self::CommandAllocator,
        initial_state: &Self::PipelineState,
    ) -> AppResult<()>;
    fn current_back_buffer_index(&self, swap_chain: &Self::SwapChain) -> u32;
    fn record(&mut self, list: &Self::CommandList, command: Command<'_, Self>);
    fn close_command_list(&mut self, list: &Self::CommandList) -> AppResult<()>;
    fn execute_command_lists(
        &mut self,
        queue: &Self::CommandQueue,
        lists: &[&Self::CommandList],
    ) -> AppResult<()>;
    fn present(&mut self, swap_chain: &Self::SwapChain, sync_interval: u32) -> AppResult<()>;

    /// A fullscreen swap chain must be switched back to windowed before it is
    /// released.
    fn leave_fullscreen(&mut self, swap_chain: &Self::SwapChain) -> AppResult<()>;

    /// Forwards whatever the validation layer queued up to the log.
    fn flush_debug_messages(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_offset_scales_by_increment() {
        let start = DescriptorHandle { ptr: 0x4000 };
        assert_eq!(start.offset(0, 32), start);
        assert_eq!(start.offset(1, 32).ptr, 0x4020);
        assert_eq!(start.offset(3, 64).ptr, 0x4000 + 192);
    }

    #[test]
    fn viewport_and_scissor_cover_the_client_area() {
        let size = ClientSize {
            width: 800,
            height: 600,
        };
        let viewport = Viewport::covering(size);
        assert_eq!((viewport.width, viewport.height), (800.0, 600.0));
        assert_eq!((viewport.min_depth, viewport.max_depth), (0.0, 1.0));
        assert_eq!(
            ScissorRect::covering(size),
            ScissorRect {
                left: 0,
                top: 0,
                right: 800,
                bottom: 600
            }
        );
    }

    #[test]
    fn feature_levels_are_ordered() {
        assert!(FeatureLevel::Level12_1 > FeatureLevel::Level12_0);
        assert!(FeatureLevel::Level11_1 < FeatureLevel::Level12_0);
    }
}
