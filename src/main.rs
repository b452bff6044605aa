mod app;
mod config;
mod input;
mod render;

use anyhow::Result;
use log::*;
use winit::dpi::LogicalSize;
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

use app::App;
use config::Config;
use input::KeyTracker;

/// trace for debug builds, info for release builds; RUST_LOG overrides it
fn default_log_level() -> LevelFilter {
    if cfg!(debug_assertions) {
        LevelFilter::Trace
    } else {
        LevelFilter::Info
    }
}

fn init_logger() {
    let mut builder = pretty_env_logger::formatted_builder();
    builder.filter_level(default_log_level());
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.init();
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_logger();

    let config = Config::from_env()?;

    // Create window
    let event_loop = EventLoop::new();
    let window = WindowBuilder::new()
        .with_title("Renderer")
        // using the logical size will be dpi-scaled
        .with_inner_size(LogicalSize::new(config.window_width, config.window_height))
        .build(&event_loop)?;

    // main prints the error chain, if the renderer can't be initialized
    let mut app = unsafe { App::create(&window, &config) }?;

    let mut keys = KeyTracker::default();
    let mut destroying = false;

    event_loop.run(move |event, _, control_flow| {
        // nothing is drawn, so only wake up for new events
        *control_flow = ControlFlow::Wait;

        let close = match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => true,
                WindowEvent::KeyboardInput { input, .. } => keys.handle_keyboard(&input),
                WindowEvent::Focused(false) => {
                    keys.clear();
                    false
                }
                WindowEvent::MouseInput { state, button, .. } => {
                    input::handle_mouse_button(button, state);
                    false
                }
                _ => false,
            },
            _ => false,
        };

        if close && !destroying {
            destroying = true;
            *control_flow = ControlFlow::Exit;
            unsafe { app.destroy() };
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_level_follows_build_profile() {
        if cfg!(debug_assertions) {
            assert_eq!(default_log_level(), LevelFilter::Trace);
        } else {
            assert_eq!(default_log_level(), LevelFilter::Info);
        }
        assert!(default_log_level() >= LevelFilter::Info);
    }
}
