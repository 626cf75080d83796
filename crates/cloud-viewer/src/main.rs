//! Entry point for the point cloud viewer.

use anyhow::Result;
use clap::Parser;
use cloud_viewer::{app::App, config::Config, SourceFetcher};
use std::sync::Arc;
use winit::{
    event::{Event, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::WindowBuilder,
};

fn main() -> Result<()> {
    // Initialize logging; default to "info" if RUST_LOG is unset.
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    ).init();

    let cfg = Config::parse();
    let initial = cfg.source_ref()?;
    let fetcher = Arc::new(SourceFetcher::new()?);

    let event_loop = EventLoop::new()?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(cloud_viewer::app::WINDOW_TITLE)
            .with_inner_size(winit::dpi::LogicalSize::new(cfg.width, cfg.height))
            .build(&event_loop)?,
    );

    // Initialise the application (async → sync).
    let mut app = match pollster::block_on(App::new(window.clone(), cfg.viewer_config(), fetcher)) {
        Ok(app) => app,
        Err(err) => {
            log::error!("{}", err);
            return Err(err.into());
        }
    };

    if let Some(src) = initial {
        app.display(src.as_str());
    }

    event_loop.run(move |event, elwt| {
        elwt.set_control_flow(ControlFlow::Poll);

        match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => {
                if !app.handle_event(&window, &event) {
                    match event {
                        WindowEvent::CloseRequested => elwt.exit(),
                        WindowEvent::KeyboardInput { event, .. } => {
                            if event.physical_key == PhysicalKey::Code(KeyCode::Escape) {
                                elwt.exit();
                            }
                        }
                        WindowEvent::RedrawRequested => {
                            match app.render(&window) {
                                Ok(_) => {}
                                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                                    log::warn!("Surface lost or outdated, reconfiguring");
                                    app.renderer.gfx.reconfigure();
                                }
                                Err(wgpu::SurfaceError::OutOfMemory) => {
                                    log::error!("WGPU out of memory – exiting.");
                                    elwt.exit();
                                }
                                Err(e) => log::error!("Render error: {:?}", e),
                            }
                        }
                        _ => {}
                    }
                }
            }
            Event::AboutToWait => {
                app.update(&window);
                window.request_redraw();
            }
            _ => {}
        }
    })?;

    Ok(())
}
