use directx12_app::app_error::AppResult;
use directx12_app::backend::Backend;
use directx12_app::backend::headless::HeadlessBackend;
use directx12_app::backend::headless::HeadlessWindow;
use directx12_app::command_line::AppCommandLine;
use directx12_app::command_line::build_command_line;
use directx12_app::context::AdapterPreference;
use directx12_app::context::Context;
use directx12_app::context::ContextDesc;
use directx12_app::logging::init_tracing;
use directx12_app::shader_paths::ShaderPaths;
use directx12_app::shell::headless::FramePump;
use directx12_app::shell::run_loop;
use tracing::info;

fn context_desc(command_line: &AppCommandLine) -> ContextDesc {
    ContextDesc {
        windowed: command_line.windowed,
        adapter: if command_line.use_warp_device {
            AdapterPreference::Warp
        } else {
            AdapterPreference::Hardware
        },
        enable_debug_layer: command_line.debug_layer,
        shaders: ShaderPaths::locate(),
        ..Default::default()
    }
}

fn log_summary<B: Backend>(context: &Context<B>, frames: u64) {
    info!(
        backend = context.backend().name(),
        frames,
        last_back_buffer = ?context.last_back_buffer_index(),
        "Render loop finished"
    );
}

fn run_headless(command_line: &AppCommandLine) -> AppResult<()> {
    let window = HeadlessWindow {
        width: 800,
        height: 600,
    };
    let mut context = Context::new(HeadlessBackend::new(), window, &context_desc(command_line))?;
    let frame_limit = command_line.frame_limit();
    let mut pump = FramePump::new(frame_limit.unwrap_or(u64::MAX));
    let frames = run_loop(&mut pump, &mut context, frame_limit)?;
    log_summary(&context, frames);
    Ok(())
}

#[cfg(windows)]
fn run_windowed(command_line: &AppCommandLine) -> AppResult<()> {
    use directx12_app::backend::d3d12::D3d12Backend;
    use directx12_app::shell::win32::Win32Pump;
    use directx12_app::shell::win32::create_window;

    let hwnd = create_window()?;
    let mut context = Context::new(D3d12Backend::new(), hwnd, &context_desc(command_line))?;
    let mut pump = Win32Pump::new(hwnd);
    let frames = run_loop(&mut pump, &mut context, command_line.frame_limit())?;
    log_summary(&context, frames);
    Ok(())
}

#[cfg(not(windows))]
fn run_windowed(_command_line: &AppCommandLine) -> AppResult<()> {
    Err(eyre::eyre!("Direct3D 12 needs Windows; pass -headless to run without a GPU").into())
}

pub fn main() -> AppResult<()> {
    color_eyre::install()?;
    init_tracing();

    let command_line = build_command_line()?;
    info!(?command_line, "Starting");

    if command_line.headless {
        run_headless(&command_line)
    } else {
        run_windowed(&command_line)
    }
}
