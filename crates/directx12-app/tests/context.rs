use directx12_app::app_error::GraphicsError;
use directx12_app::backend::DebugLayer;
use directx12_app::backend::FeatureLevel;
use directx12_app::backend::PrimitiveTopology;
use directx12_app::backend::ResourceState;
use directx12_app::backend::headless::DebugLayerSupport;
use directx12_app::backend::headless::HeadlessAdapter;
use directx12_app::backend::headless::HeadlessBackend;
use directx12_app::backend::headless::HeadlessCall;
use directx12_app::backend::headless::HeadlessWindow;
use directx12_app::backend::headless::RecordedCommand;
use directx12_app::backend::headless::TraceEvent;
use directx12_app::context::CLEAR_COLOR;
use directx12_app::context::CommandListState;
use directx12_app::context::Context;
use directx12_app::context::ContextDesc;
use directx12_app::shader_paths::ShaderPaths;
use directx12_app::vertex::VERTEX_STRIDE;
use directx12_app::vertex::triangle_bytes;

const WINDOW: HeadlessWindow = HeadlessWindow {
    width: 800,
    height: 600,
};

fn desc() -> ContextDesc {
    ContextDesc {
        shaders: ShaderPaths::in_dir(concat!(env!("CARGO_MANIFEST_DIR"), "/shaders")),
        enable_debug_layer: true,
        ..Default::default()
    }
}

fn context_with(backend: HeadlessBackend) -> Context<HeadlessBackend> {
    Context::new(backend, WINDOW, &desc()).unwrap()
}

fn frame_commands(backend: &HeadlessBackend) -> Vec<RecordedCommand> {
    backend.recorded_commands().cloned().collect()
}

fn render_target_bindings(backend: &HeadlessBackend) -> Vec<usize> {
    backend
        .recorded_commands()
        .filter_map(|command| match command {
            RecordedCommand::SetRenderTarget(handle) => Some(handle.ptr),
            _ => None,
        })
        .collect()
}

#[test]
fn construction_creates_one_view_per_swap_chain_buffer() {
    let context = context_with(HeadlessBackend::new().rtv_increment(64));
    let views = context.render_target_views();

    assert_eq!(context.rtv_descriptor_size(), 64);
    assert_eq!(views[1].ptr - views[0].ptr, 64);
    assert_eq!(views[0], context.resources().rtv_heap_start);

    let rtv_events: Vec<_> = context
        .backend()
        .trace()
        .iter()
        .filter_map(|event| match event {
            TraceEvent::RenderTargetView { resource, handle } => Some((*resource, *handle)),
            _ => None,
        })
        .collect();
    assert_eq!(rtv_events.len(), 2);
    assert_eq!(rtv_events[0], (context.resources().render_targets[0], views[0]));
    assert_eq!(rtv_events[1], (context.resources().render_targets[1], views[1]));
}

#[test]
fn construction_records_the_client_area() {
    let context = context_with(HeadlessBackend::new());
    assert_eq!(context.client_size().width, 800);
    assert_eq!(context.client_size().height, 600);
    assert_eq!(context.resources().viewport.width, 800.0);
    assert_eq!(context.resources().scissor_rect.bottom, 600);
    assert_eq!(context.command_list_state(), CommandListState::Closed);
    assert_eq!(context.debug_layer(), DebugLayer::Enabled);
}

#[test]
fn one_frame_submits_one_list_with_one_draw_and_presents_once() {
    let mut context = context_with(HeadlessBackend::new());
    context.render().unwrap();

    let backend = context.backend();
    let submissions = backend.submissions();
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0], &[context.resources().command_list][..]);
    assert_eq!(backend.draw_calls(), vec![(3, 1)]);
    assert_eq!(backend.presents(), vec![1]);
    assert!(backend.violations().is_empty(), "{:?}", backend.violations());
    assert_eq!(context.command_list_state(), CommandListState::Closed);
    assert_eq!(context.frames_rendered(), 1);
}

#[test]
fn a_frame_records_commands_in_order() {
    let mut context = context_with(HeadlessBackend::new());
    context.render().unwrap();

    let resources = context.resources();
    let target = resources.render_targets[0];
    let rtv = context.render_target_views()[0];
    assert_eq!(
        frame_commands(context.backend()),
        vec![
            RecordedCommand::ResourceBarrier {
                resource: target,
                before: ResourceState::Present,
                after: ResourceState::RenderTarget,
            },
            RecordedCommand::SetRenderTarget(rtv),
            RecordedCommand::SetViewport(resources.viewport),
            RecordedCommand::SetScissorRect(resources.scissor_rect),
            RecordedCommand::ClearRenderTarget {
                target: rtv,
                color: CLEAR_COLOR,
            },
            RecordedCommand::SetPipelineState(resources.pipeline_state),
            RecordedCommand::SetGraphicsRootSignature(resources.root_signature),
            RecordedCommand::SetVertexBuffer(resources.vertex_buffer_view),
            RecordedCommand::SetPrimitiveTopology(PrimitiveTopology::TriangleList),
            RecordedCommand::DrawInstanced {
                vertex_count: 3,
                instance_count: 1,
                start_vertex: 0,
                start_instance: 0,
            },
            RecordedCommand::ResourceBarrier {
                resource: target,
                before: ResourceState::RenderTarget,
                after: ResourceState::Present,
            },
        ]
    );
}

#[test]
fn back_buffer_is_queried_every_frame() {
    let mut context = context_with(HeadlessBackend::new().initial_back_buffer_index(1));
    let views = context.render_target_views();

    for _ in 0..4 {
        context.render().unwrap();
    }

    assert_eq!(
        render_target_bindings(context.backend()),
        vec![views[1].ptr, views[0].ptr, views[1].ptr, views[0].ptr]
    );
    assert_eq!(context.last_back_buffer_index(), Some(0));
}

#[test]
fn repeated_frames_leave_the_vertex_buffer_and_pipeline_alone() {
    let mut context = context_with(HeadlessBackend::new());
    let pipeline_state = *context.pipeline_state();
    let view = context.vertex_buffer_view();

    for _ in 0..10 {
        context.render().unwrap();
    }

    let contents = context
        .backend()
        .buffer_contents(*context.vertex_buffer())
        .unwrap();
    assert_eq!(contents, triangle_bytes());
    assert_eq!(contents.len(), 36);
    assert_eq!(view.size_in_bytes, 36);
    assert_eq!(view.stride_in_bytes, VERTEX_STRIDE);
    assert_eq!(*context.pipeline_state(), pipeline_state);
    assert_eq!(context.vertex_buffer_view(), view);
    assert_eq!(context.frames_rendered(), 10);
}

#[test]
fn no_capable_adapter_fails_construction() {
    let backend = HeadlessBackend::with_adapters(vec![
        HeadlessAdapter::new("Old", FeatureLevel::Level11_0),
        HeadlessAdapter::new("Older", FeatureLevel::Level11_1),
    ]);
    let error = Context::new(backend, WINDOW, &desc()).err().unwrap();
    assert!(matches!(
        error.downcast_ref::<GraphicsError>(),
        Some(GraphicsError::NoSuitableAdapter)
    ));

    let error = Context::new(HeadlessBackend::with_adapters(vec![]), WINDOW, &desc())
        .err()
        .unwrap();
    assert!(matches!(
        error.downcast_ref::<GraphicsError>(),
        Some(GraphicsError::NoSuitableAdapter)
    ));
}

#[test]
fn first_capable_adapter_wins() {
    let backend = HeadlessBackend::with_adapters(vec![
        HeadlessAdapter::new("Old", FeatureLevel::Level11_0),
        HeadlessAdapter::new("Capable", FeatureLevel::Level12_0),
        HeadlessAdapter::new("Better", FeatureLevel::Level12_1),
    ]);
    let context = context_with(backend);
    let checks: Vec<_> = context
        .backend()
        .trace()
        .iter()
        .filter_map(|event| match event {
            TraceEvent::AdapterChecked { index, supported } => Some((*index, *supported)),
            _ => None,
        })
        .collect();
    assert_eq!(checks, vec![(0, false), (1, true)]);
}

#[test]
fn unavailable_debug_layer_is_tolerated() {
    let context = context_with(HeadlessBackend::new().debug_layer(DebugLayerSupport::Unavailable));
    assert_eq!(context.debug_layer(), DebugLayer::Unavailable);
}

#[test]
fn broken_debug_layer_is_fatal() {
    let backend = HeadlessBackend::new().debug_layer(DebugLayerSupport::Broken);
    let error = Context::new(backend, WINDOW, &desc()).err().unwrap();
    assert!(matches!(
        error.downcast_ref::<GraphicsError>(),
        Some(GraphicsError::DebugLayer(_))
    ));
}

#[test]
fn missing_shader_source_fails_construction() {
    let dir = tempfile::tempdir().unwrap();
    let desc = ContextDesc {
        shaders: ShaderPaths::in_dir(dir.path()),
        ..desc()
    };
    let error = Context::new(HeadlessBackend::new(), WINDOW, &desc)
        .err()
        .unwrap();
    match error.downcast_ref::<GraphicsError>() {
        Some(GraphicsError::ShaderCompilation { path, .. }) => {
            assert!(path.starts_with(dir.path()));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn failed_construction_step_is_named() {
    let backend = HeadlessBackend::new().failing_on(HeadlessCall::CreateCommandQueue);
    let error = Context::new(backend, WINDOW, &desc()).err().unwrap();
    assert_eq!(error.to_string(), "creating the command queue");
    assert!(matches!(
        error.downcast_ref::<GraphicsError>(),
        Some(GraphicsError::Api {
            call: "CreateCommandQueue",
            ..
        })
    ));
}

#[test]
fn failed_present_leaves_the_list_closed() {
    let mut context = context_with(HeadlessBackend::new().failing_on(HeadlessCall::Present));
    let error = context.render().unwrap_err();
    assert!(matches!(
        error.downcast_ref::<GraphicsError>(),
        Some(GraphicsError::Api { call: "Present", .. })
    ));
    assert_eq!(context.command_list_state(), CommandListState::Closed);
    assert_eq!(context.frames_rendered(), 0);
    assert_eq!(context.backend().submissions().len(), 1);
}

#[test]
fn shader_warnings_do_not_fail_construction() {
    let dir = tempfile::tempdir().unwrap();
    let shaders = ShaderPaths::in_dir(dir.path());
    std::fs::write(
        &shaders.vertex,
        "#pragma message(\"implicit truncation of vector type\")\n\
         float4 main(float3 position : POSITION) : SV_POSITION { return float4(position, 1); }\n",
    )
    .unwrap();
    std::fs::write(
        &shaders.pixel,
        "float4 main() : SV_TARGET { return float4(1, 1, 1, 1); }\n",
    )
    .unwrap();

    let desc = ContextDesc { shaders, ..desc() };
    let mut context = Context::new(HeadlessBackend::new(), WINDOW, &desc).unwrap();
    context.render().unwrap();
    assert_eq!(context.backend().draw_calls(), vec![(3, 1)]);
}

#[test]
fn fullscreen_swap_chain_is_switched_back_before_release() {
    let desc = ContextDesc {
        windowed: false,
        ..desc()
    };
    let mut context = Context::new(HeadlessBackend::new(), WINDOW, &desc).unwrap();
    let swap_chain = context.resources().swap_chain;
    assert!(context.is_fullscreen());
    assert!(context.backend().is_fullscreen(swap_chain));

    context.leave_fullscreen().unwrap();
    context.leave_fullscreen().unwrap();

    assert!(!context.is_fullscreen());
    assert!(!context.backend().is_fullscreen(swap_chain));
    let left: Vec<_> = context
        .backend()
        .trace()
        .iter()
        .filter(|event| matches!(event, TraceEvent::LeftFullscreen(_)))
        .collect();
    assert_eq!(left.len(), 1);
}

#[test]
fn windowed_swap_chain_is_never_switched() {
    let mut context = context_with(HeadlessBackend::new().failing_on(HeadlessCall::SetFullscreenState));
    assert!(!context.is_fullscreen());
    context.leave_fullscreen().unwrap();
}
