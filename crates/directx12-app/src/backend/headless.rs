//! A backend with no GPU behind it.
//!
//! Objects are plain ids, uploaded buffers are kept in memory and every call
//! lands in a trace that can be inspected afterwards. Command lists track
//! whether they are recording so that misuse shows up the same way a
//! validation layer would report it.

use std::collections::HashMap;
use std::collections::HashSet;
use std::path::PathBuf;

use tracing::debug;

use super::Backend;
use super::ClientSize;
use super::Command;
use super::CompiledShader;
use super::DebugLayer;
use super::DescriptorHandle;
use super::FeatureLevel;
use super::PipelineDesc;
use super::PrimitiveTopology;
use super::ResourceState;
use super::ScissorRect;
use super::ShaderSource;
use super::ShaderStage;
use super::SwapChainDesc;
use super::VertexBufferView;
use super::Viewport;
use crate::app_error::AppResult;
use crate::app_error::GraphicsError;

const HEAP_STRIDE: usize = 0x1_0000;
const GPU_ADDRESS_BASE: u64 = 0x1_0000_0000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u64);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeadlessAdapter {
    pub index: u32,
    pub name: String,
    pub max_feature_level: FeatureLevel,
}

impl HeadlessAdapter {
    pub fn new(name: impl Into<String>, max_feature_level: FeatureLevel) -> Self {
        Self {
            index: 0,
            name: name.into(),
            max_feature_level,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeadlessWindow {
    pub width: u32,
    pub height: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DebugLayerSupport {
    Available,
    Unavailable,
    Broken,
}

/// Names of the calls a test can make fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HeadlessCall {
    EnumAdapter,
    CreateDevice,
    CreateCommandQueue,
    CreateSwapChain,
    CreateRtvHeap,
    SwapChainBuffer,
    CompileShader,
    CreateRootSignature,
    CreatePipelineState,
    CreateCommandAllocator,
    CreateCommandList,
    CreateUploadBuffer,
    ResetCommandAllocator,
    ResetCommandList,
    CloseCommandList,
    ExecuteCommandLists,
    Present,
    SetFullscreenState,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectKind {
    Device,
    CommandQueue,
    SwapChain,
    DescriptorHeap,
    Resource,
    RootSignature,
    PipelineState,
    CommandAllocator,
    CommandList,
}

#[derive(Clone, Debug, PartialEq)]
pub enum RecordedCommand {
    ResourceBarrier {
        resource: ObjectId,
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
    SetPipelineState(ObjectId),
    SetGraphicsRootSignature(ObjectId),
    SetVertexBuffer(VertexBufferView),
    SetPrimitiveTopology(PrimitiveTopology),
    DrawInstanced {
        vertex_count: u32,
        instance_count: u32,
        start_vertex: u32,
        start_instance: u32,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub enum TraceEvent {
    DebugLayer(DebugLayer),
    AdapterChecked { index: u32, supported: bool },
    Created { kind: ObjectKind, id: ObjectId },
    RenderTargetView { resource: ObjectId, handle: DescriptorHandle },
    ShaderCompiled { stage: ShaderStage, path: PathBuf },
    ResetCommandAllocator(ObjectId),
    ResetCommandList(ObjectId),
    Record { list: ObjectId, command: RecordedCommand },
    CloseCommandList(ObjectId),
    Execute { queue: ObjectId, lists: Vec<ObjectId> },
    Present {
        swap_chain: ObjectId,
        sync_interval: u32,
        back_buffer_index: u32,
    },
    LeftFullscreen(ObjectId),
}

struct SwapChainState {
    buffers: Vec<ObjectId>,
    back_buffer_index: u32,
    fullscreen: bool,
}

pub struct HeadlessBackend {
    adapters: Vec<HeadlessAdapter>,
    debug_layer: DebugLayerSupport,
    rtv_increment_size: u32,
    initial_back_buffer_index: u32,
    warp_feature_level: FeatureLevel,
    failing: HashSet<HeadlessCall>,
    next_id: u64,
    trace: Vec<TraceEvent>,
    buffers: HashMap<ObjectId, Vec<u8>>,
    swap_chains: HashMap<ObjectId, SwapChainState>,
    recording: HashMap<ObjectId, bool>,
    violations: Vec<String>,
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessBackend {
    /// One reference adapter at feature level 12_1 and a working debug layer.
    pub fn new() -> Self {
        Self::with_adapters(vec![HeadlessAdapter::new(
            "Headless Reference Adapter",
            FeatureLevel::Level12_1,
        )])
    }

    pub fn with_adapters(adapters: Vec<HeadlessAdapter>) -> Self {
        let adapters = adapters
            .into_iter()
            .enumerate()
            .map(|(index, adapter)| HeadlessAdapter {
                index: index as u32,
                ..adapter
            })
            .collect();
        Self {
            adapters,
            debug_layer: DebugLayerSupport::Available,
            rtv_increment_size: 32,
            initial_back_buffer_index: 0,
            warp_feature_level: FeatureLevel::Level12_1,
            failing: HashSet::new(),
            next_id: 1,
            trace: Vec::new(),
            buffers: HashMap::new(),
            swap_chains: HashMap::new(),
            recording: HashMap::new(),
            violations: Vec::new(),
        }
    }

    pub fn debug_layer(mut self, support: DebugLayerSupport) -> Self {
        self.debug_layer = support;
        self
    }

    pub fn rtv_increment(mut self, increment_size: u32) -> Self {
        self.rtv_increment_size = increment_size;
        self
    }

    /// Back buffer a newly created swap chain reports as current.
    pub fn initial_back_buffer_index(mut self, index: u32) -> Self {
        self.initial_back_buffer_index = index;
        self
    }

    pub fn warp_feature_level(mut self, level: FeatureLevel) -> Self {
        self.warp_feature_level = level;
        self
    }

    pub fn failing_on(mut self, call: HeadlessCall) -> Self {
        self.failing.insert(call);
        self
    }

    pub fn is_fullscreen(&self, swap_chain: ObjectId) -> bool {
        self.swap_chains
            .get(&swap_chain)
            .is_some_and(|state| state.fullscreen)
    }

    pub fn trace(&self) -> &[TraceEvent] {
        &self.trace
    }

    pub fn violations(&self) -> &[String] {
        &self.violations
    }

    pub fn buffer_contents(&self, resource: ObjectId) -> Option<&[u8]> {
        self.buffers.get(&resource).map(Vec::as_slice)
    }

    pub fn created(&self, kind: ObjectKind) -> usize {
        self.trace
            .iter()
            .filter(|event| matches!(event, TraceEvent::Created { kind: k, .. } if *k == kind))
            .count()
    }

    pub fn recorded_commands(&self) -> impl Iterator<Item = &RecordedCommand> {
        self.trace.iter().filter_map(|event| match event {
            TraceEvent::Record { command, .. } => Some(command),
            _ => None,
        })
    }

    pub fn draw_calls(&self) -> Vec<(u32, u32)> {
        self.recorded_commands()
            .filter_map(|command| match command {
                RecordedCommand::DrawInstanced {
                    vertex_count,
                    instance_count,
                    ..
                } => Some((*vertex_count, *instance_count)),
                _ => None,
            })
            .collect()
    }

    pub fn submissions(&self) -> Vec<&[ObjectId]> {
        self.trace
            .iter()
            .filter_map(|event| match event {
                TraceEvent::Execute { lists, .. } => Some(lists.as_slice()),
                _ => None,
            })
            .collect()
    }

    /// Sync intervals of every present, in order.
    pub fn presents(&self) -> Vec<u32> {
        self.trace
            .iter()
            .filter_map(|event| match event {
                TraceEvent::Present { sync_interval, .. } => Some(*sync_interval),
                _ => None,
            })
            .collect()
    }

    fn check(&self, call: HeadlessCall) -> AppResult<()> {
        if self.failing.contains(&call) {
            return Err(GraphicsError::Api {
                call: call_name(call),
                reason: "injected failure".to_string(),
            }
            .into());
        }
        Ok(())
    }

    fn create(&mut self, kind: ObjectKind) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        self.trace.push(TraceEvent::Created { kind, id });
        id
    }

    fn is_recording(&self, list: ObjectId) -> bool {
        self.recording.get(&list).copied().unwrap_or(false)
    }
}

fn call_name(call: HeadlessCall) -> &'static str {
    match call {
        HeadlessCall::EnumAdapter => "EnumAdapters1",
        HeadlessCall::CreateDevice => "D3D12CreateDevice",
        HeadlessCall::CreateCommandQueue => "CreateCommandQueue",
        HeadlessCall::CreateSwapChain => "CreateSwapChainForHwnd",
        HeadlessCall::CreateRtvHeap => "CreateDescriptorHeap",
        HeadlessCall::SwapChainBuffer => "GetBuffer",
        HeadlessCall::CompileShader => "D3DCompileFromFile",
        HeadlessCall::CreateRootSignature => "CreateRootSignature",
        HeadlessCall::CreatePipelineState => "CreateGraphicsPipelineState",
        HeadlessCall::CreateCommandAllocator => "CreateCommandAllocator",
        HeadlessCall::CreateCommandList => "CreateCommandList",
        HeadlessCall::CreateUploadBuffer => "CreateCommittedResource",
        HeadlessCall::ResetCommandAllocator => "ID3D12CommandAllocator::Reset",
        HeadlessCall::ResetCommandList => "ID3D12GraphicsCommandList::Reset",
        HeadlessCall::CloseCommandList => "Close",
        HeadlessCall::ExecuteCommandLists => "ExecuteCommandLists",
        HeadlessCall::Present => "Present",
        HeadlessCall::SetFullscreenState => "SetFullscreenState",
    }
}

// Stands in for FXC, which reports `#pragma message` text through the error
// blob of a successful compile.
fn pragma_messages(text: &str) -> Option<String> {
    let messages: Vec<&str> = text
        .lines()
        .filter_map(|line| {
            line.trim()
                .strip_prefix("#pragma message")?
                .trim()
                .strip_prefix("(\"")?
                .strip_suffix("\")")
        })
        .collect();
    (!messages.is_empty()).then(|| messages.join("\n"))
}

fn api_error(call: &'static str, reason: impl Into<String>) -> GraphicsError {
    GraphicsError::Api {
        call,
        reason: reason.into(),
    }
}

impl Backend for HeadlessBackend {
    type Window = HeadlessWindow;
    type Adapter = HeadlessAdapter;
    type Device = ObjectId;
    type CommandQueue = ObjectId;
    type SwapChain = ObjectId;
    type DescriptorHeap = ObjectId;
    type Resource = ObjectId;
    type ShaderBlob = Vec<u8>;
    type RootSignature = ObjectId;
    type PipelineState = ObjectId;
    type CommandAllocator = ObjectId;
    type CommandList = ObjectId;

    fn name(&self) -> &'static str {
        "headless"
    }

    fn enable_debug_layer(&mut self) -> AppResult<DebugLayer> {
        let layer = match self.debug_layer {
            DebugLayerSupport::Available => DebugLayer::Enabled,
            DebugLayerSupport::Unavailable => DebugLayer::Unavailable,
            DebugLayerSupport::Broken => {
                return Err(GraphicsError::DebugLayer(
                    "the debug interface exists but refused to enable".to_string(),
                )
                .into());
            }
        };
        self.trace.push(TraceEvent::DebugLayer(layer));
        Ok(layer)
    }

    fn enum_adapter(&mut self, index: u32) -> AppResult<Option<HeadlessAdapter>> {
        self.check(HeadlessCall::EnumAdapter)?;
        Ok(self.adapters.get(index as usize).cloned())
    }

    fn warp_adapter(&mut self) -> AppResult<HeadlessAdapter> {
        Ok(HeadlessAdapter {
            index: u32::MAX,
            name: "Headless WARP Adapter".to_string(),
            max_feature_level: self.warp_feature_level,
        })
    }

    fn adapter_name(&self, adapter: &HeadlessAdapter) -> AppResult<String> {
        Ok(adapter.name.clone())
    }

    fn supports_feature_level(&mut self, adapter: &HeadlessAdapter, level: FeatureLevel) -> bool {
        let supported = adapter.max_feature_level >= level;
        self.trace.push(TraceEvent::AdapterChecked {
            index: adapter.index,
            supported,
        });
        supported
    }

    fn create_device(&mut self, adapter: &HeadlessAdapter, level: FeatureLevel) -> AppResult<ObjectId> {
        self.check(HeadlessCall::CreateDevice)?;
        if adapter.max_feature_level < level {
            return Err(api_error(
                "D3D12CreateDevice",
                format!("{} tops out at {:?}", adapter.name, adapter.max_feature_level),
            )
            .into());
        }
        Ok(self.create(ObjectKind::Device))
    }

    fn create_command_queue(&mut self, _device: &ObjectId) -> AppResult<ObjectId> {
        self.check(HeadlessCall::CreateCommandQueue)?;
        Ok(self.create(ObjectKind::CommandQueue))
    }

    fn client_size(&self, window: HeadlessWindow) -> AppResult<ClientSize> {
        Ok(ClientSize {
            width: window.width,
            height: window.height,
        })
    }

    fn create_swap_chain(
        &mut self,
        _queue: &ObjectId,
        _window: HeadlessWindow,
        desc: &SwapChainDesc,
    ) -> AppResult<ObjectId> {
        self.check(HeadlessCall::CreateSwapChain)?;
        if desc.buffer_count < 2 {
            return Err(api_error(
                "CreateSwapChainForHwnd",
                "flip-model swap chains need at least two buffers",
            )
            .into());
        }
        let id = self.create(ObjectKind::SwapChain);
        let buffers: Vec<ObjectId> = (0..desc.buffer_count)
            .map(|_| self.create(ObjectKind::Resource))
            .collect();
        self.swap_chains.insert(
            id,
            SwapChainState {
                buffers,
                back_buffer_index: self.initial_back_buffer_index % desc.buffer_count,
                fullscreen: !desc.windowed,
            },
        );
        Ok(id)
    }

    fn create_rtv_heap(&mut self, _device: &ObjectId, descriptor_count: u32) -> AppResult<ObjectId> {
        self.check(HeadlessCall::CreateRtvHeap)?;
        if descriptor_count == 0 {
            return Err(api_error("CreateDescriptorHeap", "heap must hold at least one descriptor").into());
        }
        Ok(self.create(ObjectKind::DescriptorHeap))
    }

    fn rtv_increment_size(&self, _device: &ObjectId) -> u32 {
        self.rtv_increment_size
    }

    fn heap_start(&self, heap: &ObjectId) -> DescriptorHandle {
        DescriptorHandle {
            ptr: heap.0 as usize * HEAP_STRIDE,
        }
    }

    fn swap_chain_buffer(&mut self, swap_chain: &ObjectId, index: u32) -> AppResult<ObjectId> {
        self.check(HeadlessCall::SwapChainBuffer)?;
        let state = self
            .swap_chains
            .get(swap_chain)
            .ok_or_else(|| api_error("GetBuffer", "unknown swap chain"))?;
        state
            .buffers
            .get(index as usize)
            .copied()
            .ok_or_else(|| api_error("GetBuffer", format!("no buffer {index}")).into())
    }

    fn create_render_target_view(
        &mut self,
        _device: &ObjectId,
        resource: &ObjectId,
        handle: DescriptorHandle,
    ) {
        self.trace.push(TraceEvent::RenderTargetView {
            resource: *resource,
            handle,
        });
    }

    fn compile_shader(&mut self, source: &ShaderSource) -> AppResult<CompiledShader<Vec<u8>>> {
        self.check(HeadlessCall::CompileShader)?;
        let text = std::fs::read_to_string(&source.path).map_err(|error| {
            GraphicsError::ShaderCompilation {
                path: source.path.clone(),
                log: error.to_string(),
            }
        })?;
        if !text.contains(&format!("{}(", source.entry_point)) {
            return Err(GraphicsError::ShaderCompilation {
                path: source.path.clone(),
                log: format!(
                    "entrypoint '{}' not found for {}",
                    source.entry_point,
                    source.stage.target()
                ),
            }
            .into());
        }
        debug!(
            path = %source.path.display(),
            shader_target = source.stage.target(),
            "Compiled shader"
        );
        self.trace.push(TraceEvent::ShaderCompiled {
            stage: source.stage,
            path: source.path.clone(),
        });
        let warnings = pragma_messages(&text);
        Ok(CompiledShader {
            blob: text.into_bytes(),
            warnings,
        })
    }

    fn create_empty_root_signature(&mut self, _device: &ObjectId) -> AppResult<ObjectId> {
        self.check(HeadlessCall::CreateRootSignature)?;
        Ok(self.create(ObjectKind::RootSignature))
    }

    fn create_pipeline_state(
        &mut self,
        _device: &ObjectId,
        desc: &PipelineDesc<'_, Self>,
    ) -> AppResult<ObjectId> {
        self.check(HeadlessCall::CreatePipelineState)?;
        if desc.vertex_shader.is_empty() || desc.pixel_shader.is_empty() {
            return Err(api_error("CreateGraphicsPipelineState", "empty shader bytecode").into());
        }
        if desc.input_layout.is_empty() {
            return Err(api_error("CreateGraphicsPipelineState", "missing input layout").into());
        }
        Ok(self.create(ObjectKind::PipelineState))
    }

    fn create_command_allocator(&mut self, _device: &ObjectId) -> AppResult<ObjectId> {
        self.check(HeadlessCall::CreateCommandAllocator)?;
        Ok(self.create(ObjectKind::CommandAllocator))
    }

    fn create_command_list(
        &mut self,
        _device: &ObjectId,
        _allocator: &ObjectId,
        _initial_state: &ObjectId,
    ) -> AppResult<ObjectId> {
        self.check(HeadlessCall::CreateCommandList)?;
        let id = self.create(ObjectKind::CommandList);
        self.recording.insert(id, true);
        Ok(id)
    }

    fn create_upload_buffer(&mut self, _device: &ObjectId, bytes: &[u8]) -> AppResult<ObjectId> {
        self.check(HeadlessCall::CreateUploadBuffer)?;
        let id = self.create(ObjectKind::Resource);
        self.buffers.insert(id, bytes.to_vec());
        Ok(id)
    }

    fn gpu_virtual_address(&self, resource: &ObjectId) -> u64 {
        GPU_ADDRESS_BASE + resource.0 * HEAP_STRIDE as u64
    }

    fn reset_command_allocator(&mut self, allocator: &ObjectId) -> AppResult<()> {
        self.check(HeadlessCall::ResetCommandAllocator)?;
        self.trace.push(TraceEvent::ResetCommandAllocator(*allocator));
        Ok(())
    }

    fn reset_command_list(
        &mut self,
        list: &ObjectId,
        _allocator: &ObjectId,
        _initial_state: &ObjectId,
    ) -> AppResult<()> {
        self.check(HeadlessCall::ResetCommandList)?;
        if self.is_recording(*list) {
            return Err(GraphicsError::CommandListState {
                expected: "closed",
                found: "recording",
            }
            .into());
        }
        self.recording.insert(*list, true);
        self.trace.push(TraceEvent::ResetCommandList(*list));
        Ok(())
    }

    fn current_back_buffer_index(&self, swap_chain: &ObjectId) -> u32 {
        self.swap_chains
            .get(swap_chain)
            .map(|state| state.back_buffer_index)
            .unwrap_or(0)
    }

    fn record(&mut self, list: &ObjectId, command: Command<'_, Self>) {
        if !self.is_recording(*list) {
            self.violations
                .push(format!("command recorded into closed list {:?}", list));
        }
        let command = match command {
            Command::ResourceBarrier {
                resource,
                before,
                after,
            } => RecordedCommand::ResourceBarrier {
                resource: *resource,
                before,
                after,
            },
            Command::SetRenderTarget(handle) => RecordedCommand::SetRenderTarget(handle),
            Command::SetViewport(viewport) => RecordedCommand::SetViewport(viewport),
            Command::SetScissorRect(rect) => RecordedCommand::SetScissorRect(rect),
            Command::ClearRenderTarget { target, color } => {
                RecordedCommand::ClearRenderTarget { target, color }
            }
            Command::SetPipelineState(pso) => RecordedCommand::SetPipelineState(*pso),
            Command::SetGraphicsRootSignature(signature) => {
                RecordedCommand::SetGraphicsRootSignature(*signature)
            }
            Command::SetVertexBuffer(view) => RecordedCommand::SetVertexBuffer(view),
            Command::SetPrimitiveTopology(topology) => {
                RecordedCommand::SetPrimitiveTopology(topology)
            }
            Command::DrawInstanced {
                vertex_count,
                instance_count,
                start_vertex,
                start_instance,
            } => RecordedCommand::DrawInstanced {
                vertex_count,
                instance_count,
                start_vertex,
                start_instance,
            },
        };
        self.trace.push(TraceEvent::Record {
            list: *list,
            command,
        });
    }

    fn close_command_list(&mut self, list: &ObjectId) -> AppResult<()> {
        self.check(HeadlessCall::CloseCommandList)?;
        if !self.is_recording(*list) {
            return Err(GraphicsError::CommandListState {
                expected: "recording",
                found: "closed",
            }
            .into());
        }
        self.recording.insert(*list, false);
        self.trace.push(TraceEvent::CloseCommandList(*list));
        Ok(())
    }

    fn execute_command_lists(&mut self, queue: &ObjectId, lists: &[&ObjectId]) -> AppResult<()> {
        self.check(HeadlessCall::ExecuteCommandLists)?;
        if let Some(open) = lists.iter().find(|list| self.is_recording(***list)) {
            self.violations
                .push(format!("list {:?} submitted while still recording", open));
        }
        self.trace.push(TraceEvent::Execute {
            queue: *queue,
            lists: lists.iter().map(|list| **list).collect(),
        });
        Ok(())
    }

    fn present(&mut self, swap_chain: &ObjectId, sync_interval: u32) -> AppResult<()> {
        self.check(HeadlessCall::Present)?;
        let state = self
            .swap_chains
            .get_mut(swap_chain)
            .ok_or_else(|| api_error("Present", "unknown swap chain"))?;
        let back_buffer_index = state.back_buffer_index;
        state.back_buffer_index = (back_buffer_index + 1) % state.buffers.len() as u32;
        self.trace.push(TraceEvent::Present {
            swap_chain: *swap_chain,
            sync_interval,
            back_buffer_index,
        });
        Ok(())
    }

    fn leave_fullscreen(&mut self, swap_chain: &ObjectId) -> AppResult<()> {
        self.check(HeadlessCall::SetFullscreenState)?;
        let state = self
            .swap_chains
            .get_mut(swap_chain)
            .ok_or_else(|| api_error("SetFullscreenState", "unknown swap chain"))?;
        if state.fullscreen {
            state.fullscreen = false;
            self.trace.push(TraceEvent::LeftFullscreen(*swap_chain));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::PixelFormat;

    #[test]
    fn adapters_are_numbered_in_enumeration_order() {
        let mut backend = HeadlessBackend::with_adapters(vec![
            HeadlessAdapter::new("first", FeatureLevel::Level11_0),
            HeadlessAdapter::new("second", FeatureLevel::Level12_0),
        ]);
        let second = backend.enum_adapter(1).unwrap().unwrap();
        assert_eq!(second.index, 1);
        assert_eq!(second.name, "second");
        assert!(backend.enum_adapter(2).unwrap().is_none());
    }

    #[test]
    fn present_cycles_back_buffers() {
        let mut backend = HeadlessBackend::new().initial_back_buffer_index(1);
        let queue = ObjectId(0);
        let desc = SwapChainDesc {
            buffer_count: 2,
            format: PixelFormat::Rgba8Unorm,
            width: 4,
            height: 4,
            windowed: true,
        };
        let window = HeadlessWindow {
            width: 4,
            height: 4,
        };
        let swap_chain = backend.create_swap_chain(&queue, window, &desc).unwrap();

        assert_eq!(backend.current_back_buffer_index(&swap_chain), 1);
        backend.present(&swap_chain, 1).unwrap();
        assert_eq!(backend.current_back_buffer_index(&swap_chain), 0);
        backend.present(&swap_chain, 1).unwrap();
        assert_eq!(backend.current_back_buffer_index(&swap_chain), 1);
    }

    #[test]
    fn resetting_a_recording_list_is_rejected() {
        let mut backend = HeadlessBackend::new();
        let device = ObjectId(0);
        let allocator = backend.create_command_allocator(&device).unwrap();
        let pso = ObjectId(99);
        let list = backend
            .create_command_list(&device, &allocator, &pso)
            .unwrap();

        let error = backend
            .reset_command_list(&list, &allocator, &pso)
            .unwrap_err();
        assert!(matches!(
            error.downcast_ref::<GraphicsError>(),
            Some(GraphicsError::CommandListState { .. })
        ));

        backend.close_command_list(&list).unwrap();
        backend.reset_command_list(&list, &allocator, &pso).unwrap();
    }

    #[test]
    fn injected_failures_name_the_api_call() {
        let mut backend = HeadlessBackend::new().failing_on(HeadlessCall::CreateCommandQueue);
        let error = backend.create_command_queue(&ObjectId(1)).unwrap_err();
        assert_eq!(error.to_string(), "CreateCommandQueue failed: injected failure");
    }

    #[test]
    fn pragma_messages_come_back_as_warnings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("warns.hlsl");
        std::fs::write(
            &path,
            "#pragma message(\"first\")\n  #pragma message (\"second\")\nfloat4 main() : SV_TARGET { return 1; }\n",
        )
        .unwrap();

        let mut backend = HeadlessBackend::new();
        let compiled = backend
            .compile_shader(&ShaderSource::new(&path, ShaderStage::Pixel))
            .unwrap();
        assert_eq!(compiled.warnings.as_deref(), Some("first\nsecond"));

        let clean = dir.path().join("clean.hlsl");
        std::fs::write(&clean, "float4 main() : SV_TARGET { return 1; }\n").unwrap();
        let compiled = backend
            .compile_shader(&ShaderSource::new(&clean, ShaderStage::Pixel))
            .unwrap();
        assert_eq!(compiled.warnings, None);
    }
}
