//! The graphics context: every GPU object the triangle needs, created once in
//! a fixed order and driven by [`Context::render`] once per loop iteration.
//!
//! There is no fence. `render` resets the allocator and list it submitted on
//! the previous call without waiting for the GPU to finish with them.

mod create_command_list;
mod create_device;
mod create_pipeline_state;
mod create_render_targets;
mod create_swap_chain;
mod create_vertex_buffer;
mod render;
mod resources;

use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::app_error::AppResult;
use crate::app_error::GraphicsError;
use crate::app_error::WrapStep;
use crate::backend::Backend;
use crate::backend::ClientSize;
use crate::backend::DebugLayer;
use crate::backend::DescriptorHandle;
use crate::backend::FeatureLevel;
use crate::backend::ScissorRect;
use crate::backend::VertexBufferView;
use crate::backend::Viewport;
use crate::shader_paths::ShaderPaths;

pub use resources::Resources;

pub const FRAME_COUNT: u32 = 2;
pub const CLEAR_COLOR: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
pub const SYNC_INTERVAL: u32 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdapterPreference {
    /// First enumerated adapter that supports the minimum feature level.
    Hardware,
    Warp,
}

#[derive(Clone, Debug)]
pub struct ContextDesc {
    pub windowed: bool,
    pub adapter: AdapterPreference,
    pub min_feature_level: FeatureLevel,
    pub enable_debug_layer: bool,
    pub shaders: ShaderPaths,
}

impl Default for ContextDesc {
    fn default() -> Self {
        Self {
            windowed: true,
            adapter: AdapterPreference::Hardware,
            min_feature_level: FeatureLevel::Level12_0,
            enable_debug_layer: cfg!(debug_assertions),
            shaders: ShaderPaths::locate(),
        }
    }
}

/// Recording state of the single command list. Only `render` moves it to
/// `Recording`, and it is `Closed` again before `render` returns successfully.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandListState {
    Closed,
    Recording,
}

impl CommandListState {
    fn name(self) -> &'static str {
        match self {
            CommandListState::Closed => "closed",
            CommandListState::Recording => "recording",
        }
    }
}

pub struct Context<B: Backend> {
    resources: Resources<B>,
    command_list_state: CommandListState,
    debug_layer: DebugLayer,
    frames_rendered: u64,
    last_back_buffer_index: Option<u32>,
    fullscreen: bool,
    backend: B,
}

impl<B: Backend> Context<B> {
    /// Builds every GPU object bound to `window`. Anything created before a
    /// failing step is released when the error propagates.
    pub fn new(mut backend: B, window: B::Window, desc: &ContextDesc) -> AppResult<Self> {
        info!(backend = backend.name(), "Creating graphics context");
        match initialize(&mut backend, window, desc) {
            Ok((resources, debug_layer)) => {
                info!(
                    width = resources.client_size.width,
                    height = resources.client_size.height,
                    ?debug_layer,
                    "Graphics context ready"
                );
                Ok(Self {
                    resources,
                    command_list_state: CommandListState::Closed,
                    debug_layer,
                    frames_rendered: 0,
                    last_back_buffer_index: None,
                    fullscreen: !desc.windowed,
                    backend,
                })
            }
            Err(error) => {
                backend.flush_debug_messages();
                Err(error)
            }
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn resources(&self) -> &Resources<B> {
        &self.resources
    }

    pub fn client_size(&self) -> ClientSize {
        self.resources.client_size
    }

    pub fn debug_layer(&self) -> DebugLayer {
        self.debug_layer
    }

    pub fn command_list_state(&self) -> CommandListState {
        self.command_list_state
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// Back buffer the most recent successful `render` drew into.
    pub fn last_back_buffer_index(&self) -> Option<u32> {
        self.last_back_buffer_index
    }

    pub fn rtv_descriptor_size(&self) -> u32 {
        self.resources.rtv_descriptor_size
    }

    /// Descriptor slot of every render-target view, indexed by back buffer.
    pub fn render_target_views(&self) -> [DescriptorHandle; FRAME_COUNT as usize] {
        std::array::from_fn(|index| self.resources.rtv_handle(index as u32))
    }

    pub fn vertex_buffer(&self) -> &B::Resource {
        &self.resources.vertex_buffer
    }

    pub fn vertex_buffer_view(&self) -> VertexBufferView {
        self.resources.vertex_buffer_view
    }

    pub fn pipeline_state(&self) -> &B::PipelineState {
        &self.resources.pipeline_state
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    /// Switches a fullscreen swap chain back to windowed. Runs on drop as well,
    /// since a swap chain cannot be released while fullscreen.
    pub fn leave_fullscreen(&mut self) -> AppResult<()> {
        if self.fullscreen {
            self.backend
                .leave_fullscreen(&self.resources.swap_chain)
                .step("leaving fullscreen")?;
            self.fullscreen = false;
        }
        Ok(())
    }

    fn expect_state(&self, expected: CommandListState) -> AppResult<()> {
        if self.command_list_state != expected {
            return Err(GraphicsError::CommandListState {
                expected: expected.name(),
                found: self.command_list_state.name(),
            }
            .into());
        }
        Ok(())
    }
}

impl<B: Backend> Drop for Context<B> {
    fn drop(&mut self) {
        if let Err(e) = self.leave_fullscreen() {
            warn!("Releasing a fullscreen swap chain: {e}");
        }
        debug!(
            frames_rendered = self.frames_rendered,
            "Releasing graphics context"
        );
    }
}

fn initialize<B: Backend>(
    backend: &mut B,
    window: B::Window,
    desc: &ContextDesc,
) -> AppResult<(Resources<B>, DebugLayer)> {
    let (device, debug_layer) = create_device::create_device(backend, desc)?;

    let command_queue = backend
        .create_command_queue(&device)
        .step("creating the command queue")?;
    debug!("Created command queue");

    let (swap_chain, client_size) =
        create_swap_chain::create_swap_chain(backend, &command_queue, window, desc.windowed)
            .step("creating the swap chain")?;

    let render_targets = create_render_targets::create_render_targets(backend, &device, &swap_chain)
        .step("creating the render targets")?;

    let (root_signature, pipeline_state) =
        create_pipeline_state::create_pipeline_state(backend, &device, &desc.shaders)
            .step("creating the pipeline state")?;

    let (command_allocator, command_list) =
        create_command_list::create_command_list(backend, &device, &pipeline_state)
            .step("creating the command list")?;

    let (vertex_buffer, vertex_buffer_view) =
        create_vertex_buffer::create_vertex_buffer(backend, &device)
            .step("uploading the vertex buffer")?;

    let resources = Resources {
        device,
        command_queue,
        swap_chain,
        rtv_heap: render_targets.heap,
        rtv_heap_start: render_targets.heap_start,
        rtv_descriptor_size: render_targets.descriptor_size,
        render_targets: render_targets.targets,
        root_signature,
        pipeline_state,
        command_allocator,
        command_list,
        vertex_buffer,
        vertex_buffer_view,
        client_size,
        viewport: Viewport::covering(client_size),
        scissor_rect: ScissorRect::covering(client_size),
    };
    Ok((resources, debug_layer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::headless::HeadlessAdapter;
    use crate::backend::headless::HeadlessBackend;
    use crate::backend::headless::HeadlessCall;
    use crate::backend::headless::HeadlessWindow;
    use crate::backend::headless::ObjectKind;

    fn desc() -> ContextDesc {
        ContextDesc {
            shaders: ShaderPaths::in_dir(concat!(env!("CARGO_MANIFEST_DIR"), "/shaders")),
            ..Default::default()
        }
    }

    const WINDOW: HeadlessWindow = HeadlessWindow {
        width: 800,
        height: 600,
    };

    #[test]
    fn no_capable_adapter_creates_nothing_device_dependent() {
        let mut backend = HeadlessBackend::with_adapters(vec![HeadlessAdapter::new(
            "old",
            FeatureLevel::Level11_0,
        )]);
        let error = initialize(&mut backend, WINDOW, &desc()).err().unwrap();

        assert!(matches!(
            error.downcast_ref::<GraphicsError>(),
            Some(GraphicsError::NoSuitableAdapter)
        ));
        for kind in [
            ObjectKind::Device,
            ObjectKind::CommandQueue,
            ObjectKind::SwapChain,
            ObjectKind::DescriptorHeap,
            ObjectKind::Resource,
            ObjectKind::PipelineState,
        ] {
            assert_eq!(backend.created(kind), 0, "{kind:?}");
        }
    }

    #[test]
    fn failed_queue_stops_before_the_swap_chain() {
        let mut backend = HeadlessBackend::new().failing_on(HeadlessCall::CreateCommandQueue);
        assert!(initialize(&mut backend, WINDOW, &desc()).is_err());
        assert_eq!(backend.created(ObjectKind::Device), 1);
        assert_eq!(backend.created(ObjectKind::SwapChain), 0);
    }
}
