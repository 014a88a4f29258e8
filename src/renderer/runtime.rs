extern crate glfw;

use glfw::fail_on_errors;
use glfw::{Action, Key};
use log::{error, info};

use crate::renderer::gl_backend::GlBackend;
use crate::renderer::shader_program::compile_and_link_program;
use crate::renderer::shaders::{PHONG_FRAGMENT_SHADER, PHONG_VERTEX_SHADER};
use crate::scene::{SceneDriver, SceneToggles};

use self::glfw::Context;

extern crate gl;

const CLEAR_COLOUR: [f32; 4] = [0.2, 0.2, 0.4, 1.0];

/// Window size and the toggles the first frame starts from.
#[derive(Debug, Clone, Copy)]
pub struct WindowSettings {
    pub width: u32,
    pub height: u32,
    pub toggles: SceneToggles,
}

/// Edge detection for the toggle keys: a toggle fires once per press.
#[derive(Default)]
struct HeldKeys {
    lighting: bool,
    car: bool,
    camera: bool,
}

/// Opens a window and renders `driver` until it is closed. The driver must
/// already be set up.
pub fn run(mut driver: SceneDriver, settings: WindowSettings) -> Result<(), String> {
    let mut glfw =
        glfw::init(fail_on_errors!()).map_err(|e| format!("Failed to initialize GLFW: {}", e))?;
    glfw.window_hint(glfw::WindowHint::ContextVersion(3, 3));
    glfw.window_hint(glfw::WindowHint::OpenGlProfile(
        glfw::OpenGlProfileHint::Core,
    ));
    #[cfg(target_os = "macos")]
    glfw.window_hint(glfw::WindowHint::OpenGlForwardCompat(true));

    let (mut window, events) = glfw
        .create_window(
            settings.width,
            settings.height,
            "Street scene",
            glfw::WindowMode::Windowed,
        )
        .ok_or_else(|| "Failed to create GLFW window".to_string())?;

    window.make_current();
    window.set_framebuffer_size_polling(true);

    gl::load_with(|symbol| {
        glfw.get_proc_address_raw(symbol)
            .map(|ptr| ptr as *const _)
            .unwrap_or(std::ptr::null())
    });

    unsafe {
        gl::Enable(gl::DEPTH_TEST);
        gl::Disable(gl::CULL_FACE);
    }

    let program = compile_and_link_program(PHONG_VERTEX_SHADER, PHONG_FRAGMENT_SHADER)?;
    let mut backend = GlBackend::new();
    let mut toggles = settings.toggles;
    let mut held = HeldKeys::default();
    info!("press L for lighting, M to move the car, C to ride along, Esc to quit");

    while !window.should_close() {
        process_input(&mut window, &mut toggles, &mut held);

        let (framebuffer_width, framebuffer_height) = window.get_framebuffer_size();
        unsafe {
            gl::Viewport(0, 0, framebuffer_width, framebuffer_height);
            gl::ClearColor(
                CLEAR_COLOUR[0],
                CLEAR_COLOUR[1],
                CLEAR_COLOUR[2],
                CLEAR_COLOUR[3],
            );
            gl::Clear(gl::COLOR_BUFFER_BIT | gl::DEPTH_BUFFER_BIT);
        }
        driver.set_aspect_ratio(framebuffer_width.max(1) as f32 / framebuffer_height.max(1) as f32);

        let frame = driver.update(&toggles);
        backend.begin_frame();
        if let Err(draw_error) = driver.draw(&mut backend, program.handle(), &frame, &toggles) {
            error!("{}", draw_error);
            return Err(draw_error.to_string());
        }

        window.swap_buffers();
        glfw.poll_events();
        for _ in glfw::flush_messages(&events) {}
    }

    Ok(())
}

fn process_input(window: &mut glfw::Window, toggles: &mut SceneToggles, held: &mut HeldKeys) {
    if window.get_key(Key::Escape) == Action::Press {
        window.set_should_close(true)
    }

    let lighting_pressed = window.get_key(Key::L) == Action::Press;
    if lighting_pressed && !held.lighting {
        toggles.toggle_lighting();
    }
    held.lighting = lighting_pressed;

    let car_pressed = window.get_key(Key::M) == Action::Press;
    if car_pressed && !held.car {
        toggles.toggle_car_movement();
    }
    held.car = car_pressed;

    let camera_pressed = window.get_key(Key::C) == Action::Press;
    if camera_pressed && !held.camera {
        toggles.toggle_camera();
    }
    held.camera = camera_pressed;
}
