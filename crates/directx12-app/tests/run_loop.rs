use directx12_app::backend::headless::HeadlessBackend;
use directx12_app::backend::headless::HeadlessCall;
use directx12_app::backend::headless::HeadlessWindow;
use directx12_app::context::Context;
use directx12_app::context::ContextDesc;
use directx12_app::shader_paths::ShaderPaths;
use directx12_app::shell::headless::FramePump;
use directx12_app::shell::run_loop;

fn context(backend: HeadlessBackend) -> Context<HeadlessBackend> {
    let desc = ContextDesc {
        shaders: ShaderPaths::in_dir(concat!(env!("CARGO_MANIFEST_DIR"), "/shaders")),
        ..Default::default()
    };
    Context::new(
        backend,
        HeadlessWindow {
            width: 800,
            height: 600,
        },
        &desc,
    )
    .unwrap()
}

#[test]
fn renders_until_the_pump_exits() {
    let mut context = context(HeadlessBackend::new());
    let mut pump = FramePump::new(5);
    let frames = run_loop(&mut pump, &mut context, None).unwrap();

    assert_eq!(frames, 5);
    assert_eq!(pump.pumped(), 6);
    assert_eq!(context.frames_rendered(), 5);
    assert_eq!(context.backend().presents(), vec![1; 5]);
}

#[test]
fn frame_limit_stops_before_pumping_again() {
    let mut context = context(HeadlessBackend::new());
    let mut pump = FramePump::new(100);
    let frames = run_loop(&mut pump, &mut context, Some(3)).unwrap();

    assert_eq!(frames, 3);
    assert_eq!(pump.pumped(), 3);
}

#[test]
fn render_failure_ends_the_loop() {
    let mut context = context(HeadlessBackend::new().failing_on(HeadlessCall::ExecuteCommandLists));
    let mut pump = FramePump::new(5);
    let error = run_loop(&mut pump, &mut context, None).unwrap_err();

    assert_eq!(error.to_string(), "rendering a frame");
    assert_eq!(pump.pumped(), 1);
    assert_eq!(context.frames_rendered(), 0);
}
