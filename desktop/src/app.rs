use std::time::Instant;

use anyhow::Context;
use ninesweep_core::{CellMapper, FrameInput, Game, GameConfig, MouseButtons, Notification};
use pixels::{Pixels, SurfaceTexture};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tiny_skia::Pixmap;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, KeyboardInput, MouseButton, VirtualKeyCode, WindowEvent};
use winit::event_loop::EventLoop;
use winit::platform::run_return::EventLoopExtRunReturn;
use winit::window::WindowBuilder;

use crate::config::AppConfig;

mod assets;
mod render;
mod theme;

pub use assets::Assets;
use render::Renderer;

/// Game plus everything needed to feed it input and show it, minus the window.
pub struct App {
    game: Game,
    mapper: CellMapper,
    renderer: Renderer,
    assets: Assets,
    input: FrameInput,
    canvas: Pixmap,
    rng: SmallRng,
}

impl App {
    pub fn new(config: &AppConfig, assets: Assets, seed: Option<u64>) -> anyhow::Result<Self> {
        let mut rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        let game_config = GameConfig::classic();
        let game = Game::start(game_config, &mut rng).context("could not start a game")?;

        let (width, height) = config.window_size(game_config.size);
        let canvas = Pixmap::new(width, height).context("window would be empty")?;
        let mapper = CellMapper::new(config.cell_size as f32, game_config.size);
        log::debug!("canvas {}x{}, {} mines", width, height, game_config.mines);

        Ok(Self {
            game,
            mapper,
            renderer: Renderer::new(mapper, config.status_bar_height as f32),
            assets,
            input: FrameInput::default(),
            canvas,
            rng,
        })
    }

    #[cfg(test)]
    pub fn game(&self) -> &Game {
        &self.game
    }

    /// Pointer in buffer pixels, `None` once it leaves the window.
    pub fn pointer_moved(&mut self, pointer: Option<(f32, f32)>) {
        self.input.pointer = pointer;
    }

    pub fn button_pressed(&mut self, button: MouseButtons) {
        self.input.press(button);
    }

    /// Advances the game by one frame and plays what it announced.
    pub fn frame(&mut self) -> Vec<Notification> {
        self.game.tick(&self.input, &self.mapper);
        self.input.end_frame();

        let notifications: Vec<_> = self.game.drain_notifications().collect();
        self.assets.play_all(notifications.iter().copied());
        notifications
    }

    /// Throws the current board away and deals a new one.
    pub fn restart(&mut self) -> anyhow::Result<()> {
        let seed = self.rng.random();
        self.game.restart(seed).context("could not restart")?;
        self.input.end_frame();
        log::info!("new game");
        Ok(())
    }

    pub fn draw(&mut self) -> &Pixmap {
        self.renderer
            .draw(&mut self.canvas, &self.game, &self.assets.sprites);
        &self.canvas
    }
}

/// Opens the window and runs until it is closed. Audio and textures are
/// released before returning.
pub fn run(config: AppConfig, seed: Option<u64>) -> anyhow::Result<()> {
    let mut event_loop = EventLoop::new();
    let (width, height) = config.window_size(GameConfig::classic().size);
    let window = WindowBuilder::new()
        .with_title(&config.title)
        .with_inner_size(PhysicalSize::new(width, height))
        .with_resizable(false)
        .build(&event_loop)
        .context("could not create window")?;

    let inner = window.inner_size();
    let surface = SurfaceTexture::new(inner.width, inner.height, &window);
    let mut pixels = Pixels::new(width, height, surface).context("could not create pixel buffer")?;

    let assets = Assets::load(&config);
    if !assets.has_audio() {
        log::info!("sound is off");
    }
    let mut app = App::new(&config, assets, seed)?;
    let frame_interval = config.frame_interval();
    let mut next_frame = Instant::now();
    let mut failure: Option<anyhow::Error> = None;

    log::info!("window open, {}x{}", width, height);
    event_loop.run_return(|event, _, control_flow| match event {
        Event::WindowEvent { event, .. } => match event {
            WindowEvent::CloseRequested => control_flow.set_exit(),
            WindowEvent::CursorMoved { position, .. } => {
                let pointer = pixels
                    .window_pos_to_pixel((position.x as f32, position.y as f32))
                    .ok()
                    .map(|(x, y)| (x as f32, y as f32));
                app.pointer_moved(pointer);
            }
            WindowEvent::CursorLeft { .. } => app.pointer_moved(None),
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button,
                ..
            } => match button {
                MouseButton::Left => app.button_pressed(MouseButtons::PRIMARY),
                MouseButton::Right => app.button_pressed(MouseButtons::SECONDARY),
                _ => {}
            },
            WindowEvent::KeyboardInput {
                input:
                    KeyboardInput {
                        state: ElementState::Pressed,
                        virtual_keycode: Some(key),
                        ..
                    },
                ..
            } => match key {
                VirtualKeyCode::Escape => control_flow.set_exit(),
                VirtualKeyCode::R => {
                    if let Err(err) = app.restart() {
                        failure = Some(err);
                        control_flow.set_exit();
                    }
                }
                _ => {}
            },
            WindowEvent::Resized(size) if size.width > 0 && size.height > 0 => {
                if let Err(err) = pixels.resize_surface(size.width, size.height) {
                    failure = Some(anyhow::Error::new(err).context("could not resize surface"));
                    control_flow.set_exit();
                }
            }
            _ => {}
        },
        Event::MainEventsCleared => {
            let now = Instant::now();
            if now >= next_frame {
                for notification in app.frame() {
                    log::trace!("{:?}", notification);
                }
                window.request_redraw();
                next_frame = now + frame_interval;
            }
            control_flow.set_wait_until(next_frame);
        }
        Event::RedrawRequested(_) => {
            pixels.frame_mut().copy_from_slice(app.draw().data());
            if let Err(err) = pixels.render() {
                failure = Some(anyhow::Error::new(err).context("could not present frame"));
                control_flow.set_exit();
            }
        }
        _ => {}
    });

    log::info!("shutting down");
    match failure {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
