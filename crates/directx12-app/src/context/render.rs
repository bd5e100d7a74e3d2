use tracing::trace;

use super::CLEAR_COLOR;
use super::CommandListState;
use super::Context;
use super::Resources;
use super::SYNC_INTERVAL;
use crate::app_error::AppResult;
use crate::app_error::GraphicsError;
use crate::backend::Backend;
use crate::backend::Command;
use crate::backend::PrimitiveTopology;
use crate::backend::ResourceState;

impl<B: Backend> Context<B> {
    /// Records, submits and presents one frame.
    ///
    /// The command list is `Closed` on entry and, when this returns `Ok`, on
    /// exit. The back buffer is whichever one the swap chain reports as
    /// current when the call starts.
    pub fn render(&mut self) -> AppResult<()> {
        let result = self.render_frame();
        if result.is_err() {
            self.backend.flush_debug_messages();
        }
        result
    }

    fn render_frame(&mut self) -> AppResult<()> {
        self.expect_state(CommandListState::Closed)?;

        let Context {
            resources,
            command_list_state,
            frames_rendered,
            last_back_buffer_index,
            backend,
            ..
        } = self;

        backend.reset_command_allocator(&resources.command_allocator)?;
        backend.reset_command_list(
            &resources.command_list,
            &resources.command_allocator,
            &resources.pipeline_state,
        )?;
        *command_list_state = CommandListState::Recording;

        let frame_index = backend.current_back_buffer_index(&resources.swap_chain);
        populate_command_list(backend, resources, frame_index)?;

        backend.close_command_list(&resources.command_list)?;
        *command_list_state = CommandListState::Closed;

        backend.execute_command_lists(&resources.command_queue, &[&resources.command_list])?;
        backend.present(&resources.swap_chain, SYNC_INTERVAL)?;

        *frames_rendered += 1;
        *last_back_buffer_index = Some(frame_index);
        trace!(frame = *frames_rendered, frame_index, "Presented frame");
        Ok(())
    }
}

fn populate_command_list<B: Backend>(
    backend: &mut B,
    resources: &Resources<B>,
    frame_index: u32,
) -> AppResult<()> {
    let render_target = resources
        .render_targets
        .get(frame_index as usize)
        .ok_or_else(|| GraphicsError::Api {
            call: "GetCurrentBackBufferIndex",
            reason: format!("back buffer {frame_index} is out of range"),
        })?;
    let rtv_handle = resources.rtv_handle(frame_index);
    let list = &resources.command_list;

    backend.record(
        list,
        Command::ResourceBarrier {
            resource: render_target,
            before: ResourceState::Present,
            after: ResourceState::RenderTarget,
        },
    );
    backend.record(list, Command::SetRenderTarget(rtv_handle));
    backend.record(list, Command::SetViewport(resources.viewport));
    backend.record(list, Command::SetScissorRect(resources.scissor_rect));
    backend.record(
        list,
        Command::ClearRenderTarget {
            target: rtv_handle,
            color: CLEAR_COLOR,
        },
    );

    backend.record(list, Command::SetPipelineState(&resources.pipeline_state));
    backend.record(
        list,
        Command::SetGraphicsRootSignature(&resources.root_signature),
    );
    backend.record(list, Command::SetVertexBuffer(resources.vertex_buffer_view));
    backend.record(
        list,
        Command::SetPrimitiveTopology(PrimitiveTopology::TriangleList),
    );
    backend.record(
        list,
        Command::DrawInstanced {
            vertex_count: 3,
            instance_count: 1,
            start_vertex: 0,
            start_instance: 0,
        },
    );

    backend.record(
        list,
        Command::ResourceBarrier {
            resource: render_target,
            before: ResourceState::RenderTarget,
            after: ResourceState::Present,
        },
    );
    Ok(())
}
