use crate::app_error::AppResult;
use crate::backend::Backend;

/// Command lists are created recording; this one is closed straight away so
/// the first `render` finds it in the same state every later call does.
pub(super) fn create_command_list<B: Backend>(
    backend: &mut B,
    device: &B::Device,
    pipeline_state: &B::PipelineState,
) -> AppResult<(B::CommandAllocator, B::CommandList)> {
    let command_allocator = backend.create_command_allocator(device)?;
    let command_list = backend.create_command_list(device, &command_allocator, pipeline_state)?;
    backend.close_command_list(&command_list)?;
    Ok((command_allocator, command_list))
}
