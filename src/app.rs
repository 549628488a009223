//! Window, GL context and the render loop.
//!
//! Built on winit's [`ApplicationHandler`]: the window and GL context are
//! created on the first `resumed` event, a frame is rendered on every
//! `RedrawRequested`, and a redraw is requested whenever the loop goes idle.
//! Only `CloseRequested` is acted on; every other window event is dropped.

use std::num::NonZeroU32;
use std::process::ExitCode;

use glutin::config::{Config, ConfigTemplateBuilder, GlConfig};
use glutin::context::{
    ContextApi, ContextAttributesBuilder, NotCurrentGlContext, PossiblyCurrentContext, Version,
};
use glutin::display::{GetGlDisplay, GlDisplay};
use glutin::surface::{GlSurface, Surface, SwapInterval, WindowSurface};
use glutin_winit::{DisplayBuilder, GlWindow};
use raw_window_handle::HasWindowHandle;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::backend::GlowBackend;
use crate::config::DemoConfig;
use crate::context::Context;
use crate::scene::Scene;

/// Exit status when the GL context or function loader can't be set up (-1).
pub const EXIT_GL_INIT_FAILURE: u8 = 255;

/// Requested OpenGL version; the shaders target GLSL 1.40.
const GL_VERSION: Version = Version::new(3, 3);

/// Why a demo run stopped early.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// winit couldn't create or run the event loop.
    #[error("event loop failed")]
    EventLoop(#[from] winit::error::EventLoopError),

    /// Window, GL display, context or surface creation failed.
    #[error("failed to initialise OpenGL: {0}")]
    GlInit(String),

    /// A shader, mesh or texture couldn't be created or used.
    #[error(transparent)]
    Scene(#[from] crate::Error),

    /// Presenting a frame failed.
    #[error("failed to swap buffers")]
    Swap(#[source] glutin::error::Error),
}

impl AppError {
    /// Process exit status for this error.
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::GlInit(_) => ExitCode::from(EXIT_GL_INIT_FAILURE),
            _ => ExitCode::FAILURE,
        }
    }
}

fn gl_init(err: impl std::fmt::Display) -> AppError {
    AppError::GlInit(err.to_string())
}

/// Run the demo until the window is closed.
///
/// # Errors
///
/// Any [`AppError`]; the window and GL objects are released first.
pub fn run(config: DemoConfig) -> Result<(), AppError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = DemoApp {
        config,
        state: None,
        error: None,
    };
    event_loop.run_app(&mut app)?;

    match app.error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// [`run`], logging the outcome and mapping it to a process exit status.
pub fn launch(config: DemoConfig) -> ExitCode {
    log::info!(
        "Starting {:?} demo: \"{}\" {}x{}",
        config.variant,
        config.title,
        config.width,
        config.height
    );
    match run(config) {
        Ok(()) => {
            log::info!("Window closed, exiting");
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("{err}");
            let mut source = std::error::Error::source(&err);
            while let Some(cause) = source {
                log::error!("  caused by: {cause}");
                source = cause.source();
            }
            err.exit_code()
        }
    }
}

/// Everything that lives while the window is open.
///
/// Field order is drop order: GL objects go first, while the context is
/// still current, and the window goes last.
struct GlState {
    scene: Scene<GlowBackend>,
    ctx: Context<GlowBackend>,
    surface: Surface<WindowSurface>,
    gl_context: PossiblyCurrentContext,
    window: Window,
}

impl GlState {
    fn new(event_loop: &ActiveEventLoop, config: &DemoConfig) -> Result<Self, AppError> {
        let attributes = Window::default_attributes()
            .with_title(config.title.clone())
            .with_inner_size(LogicalSize::new(config.width, config.height))
            .with_resizable(false);

        let template = ConfigTemplateBuilder::new().with_alpha_size(8);
        let (window, gl_config) = DisplayBuilder::new()
            .with_window_attributes(Some(attributes))
            .build(event_loop, template, pick_config)
            .map_err(gl_init)?;
        let window = window.ok_or_else(|| gl_init("no window was created"))?;

        let raw_window_handle = window.window_handle().map_err(gl_init)?.as_raw();
        let gl_display = gl_config.display();
        let context_attributes = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::OpenGl(Some(GL_VERSION)))
            .build(Some(raw_window_handle));

        let surface_attributes = window
            .build_surface_attributes(Default::default())
            .map_err(gl_init)?;
        // SAFETY: the raw window handle belongs to `window`, which outlives
        // both the context and the surface (see `GlState` field order).
        let (surface, not_current) = unsafe {
            let not_current = gl_display
                .create_context(&gl_config, &context_attributes)
                .map_err(gl_init)?;
            let surface = gl_display
                .create_window_surface(&gl_config, &surface_attributes)
                .map_err(gl_init)?;
            (surface, not_current)
        };
        let gl_context = not_current.make_current(&surface).map_err(gl_init)?;

        if let Err(err) = surface.set_swap_interval(&gl_context, SwapInterval::Wait(NonZeroU32::MIN))
        {
            log::warn!("Failed to enable vsync: {err}");
        }

        // SAFETY: the context was made current above and stays current on
        // this thread until `GlState` is dropped.
        let backend = unsafe {
            let gl = glow::Context::from_loader_function_cstr(|symbol| {
                gl_display.get_proc_address(symbol)
            });
            GlowBackend::new(gl)
        };
        log::info!("OpenGL context ready: {}", backend.version_string());

        let mut ctx = Context::new(backend);
        let size = window.inner_size();
        ctx.set_viewport(size.width, size.height);

        let scene = Scene::new(&mut ctx, config)?;

        Ok(Self {
            scene,
            ctx,
            surface,
            gl_context,
            window,
        })
    }

    fn render_frame(&mut self) -> Result<(), AppError> {
        self.scene.render(&mut self.ctx)?;
        self.surface
            .swap_buffers(&self.gl_context)
            .map_err(AppError::Swap)
    }
}

/// Prefer configs that support transparency, then more MSAA samples.
fn pick_config(configs: Box<dyn Iterator<Item = Config> + '_>) -> Config {
    best_config(configs, |config| {
        (
            config.supports_transparency().unwrap_or(false),
            config.num_samples(),
        )
    })
    .expect("glutin offers at least one config for a window")
}

/// Highest-ranked config; the earliest one wins ties.
fn best_config<C, K: Ord>(configs: impl Iterator<Item = C>, rank: impl Fn(&C) -> K) -> Option<C> {
    configs.reduce(|best, config| if rank(&config) > rank(&best) { config } else { best })
}

struct DemoApp {
    config: DemoConfig,
    state: Option<GlState>,
    error: Option<AppError>,
}

impl DemoApp {
    fn fail(&mut self, event_loop: &ActiveEventLoop, err: AppError) {
        // Release GL objects before the loop tears the window down.
        self.state = None;
        self.error = Some(err);
        event_loop.exit();
    }
}

impl ApplicationHandler for DemoApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() || self.error.is_some() {
            return;
        }
        match GlState::new(event_loop, &self.config) {
            Ok(state) => {
                state.window.request_redraw();
                self.state = Some(state);
            }
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested");
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => {
                if let Some(Err(err)) = self.state.as_mut().map(GlState::render_frame) {
                    self.fail(event_loop, err);
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            state.window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.state = None;
    }
}
