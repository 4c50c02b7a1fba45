//! Demo viewer: a plane, a field of cubes and a swarm of orbiting point
//! lights, shaded by the clustered-deferred pipeline.

use anyhow::Result;
use glam::{Mat4, Vec3};
use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{Key, NamedKey};
use winit::window::WindowId;

use shamash_render::camera::{Camera, CameraBinding};
use shamash_render::core::{App, AppControl, FrameCtx};
use shamash_render::device::GpuInit;
use shamash_render::lights::{ClusterGrid, LightCulling, LightSet, PointLight};
use shamash_render::logging::{init_logging, LoggingConfig};
use shamash_render::render::DeferredRenderer;
use shamash_render::scene::{Material, MeshData, Node, Scene, SceneLayouts};
use shamash_render::window::{Runtime, RuntimeConfig};

const LIGHT_COUNT: usize = 48;
const LIGHT_CAPACITY: u32 = 256;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    Runtime::run(
        RuntimeConfig {
            title: "shamash viewer".to_string(),
            ..Default::default()
        },
        GpuInit::default(),
        Viewer::default(),
    )
}

#[derive(Default)]
struct Viewer {
    state: Option<SceneState>,
    elapsed: f32,
}

/// Everything that needs a device to exist; built on the first frame.
struct SceneState {
    renderer: DeferredRenderer,
    scene: Scene,
    camera: Camera,
    camera_binding: CameraBinding,
    lights: LightSet,
    orbits: Vec<OrbitLight>,
}

impl SceneState {
    fn new(ctx: &FrameCtx<'_, '_>) -> Result<Self> {
        let device = ctx.gpu.device();

        let camera_binding = CameraBinding::new(device);
        let lights = LightSet::new(device, LIGHT_CAPACITY, ClusterGrid::default())?;
        let culling = LightCulling::new(device, &camera_binding, &lights)?;

        let renderer = DeferredRenderer::new(
            device,
            ctx.gpu.surface_format(),
            ctx.gpu.size(),
            &camera_binding,
            &lights,
            Box::new(culling),
        )?;

        let scene = build_scene(device, renderer.scene_layouts());
        let camera = Camera::new(Vec3::new(10.0, 8.0, 10.0), Vec3::new(0.0, 0.5, 0.0));

        log::info!(
            "viewer ready: {} lights over a {:?} cluster grid",
            LIGHT_COUNT,
            lights.grid()
        );

        Ok(Self {
            renderer,
            scene,
            camera,
            camera_binding,
            lights,
            orbits: orbit_lights(LIGHT_COUNT),
        })
    }
}

impl App for Viewer {
    fn on_window_event(&mut self, _window_id: WindowId, event: &WindowEvent) -> AppControl {
        if let WindowEvent::KeyboardInput { event, .. } = event {
            if event.state == ElementState::Pressed
                && event.logical_key == Key::Named(NamedKey::Escape)
            {
                return AppControl::Exit;
            }
        }
        AppControl::Continue
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if self.state.is_none() {
            match SceneState::new(ctx) {
                Ok(state) => self.state = Some(state),
                Err(e) => {
                    log::error!("renderer initialization failed: {e:#}");
                    return AppControl::Exit;
                }
            }
        }
        let Some(state) = self.state.as_mut() else {
            return AppControl::Continue;
        };

        self.elapsed += ctx.time.dt;

        // Per-frame uploads happen before any recording; the GPU sees an
        // immutable snapshot for the whole frame.
        let size = ctx.gpu.size();
        let uniforms = state.camera.uniforms(size.width, size.height);
        state.camera_binding.upload(ctx.gpu.queue(), &uniforms);

        let frame_lights: Vec<PointLight> = state
            .orbits
            .iter()
            .map(|orbit| orbit.sample(self.elapsed))
            .collect();
        state.lights.upload(ctx.gpu.queue(), &frame_lights);

        let SceneState {
            renderer,
            scene,
            camera_binding,
            lights,
            ..
        } = state;

        let mut frame_result = Ok(());
        let control = ctx.render(|rctx, target| {
            frame_result = renderer.render_frame(rctx, target, scene, lights, camera_binding);
        });

        if let Err(e) = frame_result {
            log::error!("frame rendering failed: {e:#}");
            return AppControl::Exit;
        }

        control
    }
}

fn build_scene(device: &wgpu::Device, layouts: &SceneLayouts) -> Scene {
    let mut scene = Scene::new();

    // Ground plane.
    let mut ground = Node::new(device, layouts, Mat4::IDENTITY);
    ground.add(
        Material::new(device, layouts, [0.55, 0.55, 0.58, 1.0]),
        vec![MeshData::plane(12.0).upload(device)],
    );
    scene.add(ground);

    // 5x5 cube field.
    let palette = [
        [0.8, 0.3, 0.25, 1.0],
        [0.3, 0.7, 0.35, 1.0],
        [0.3, 0.4, 0.8, 1.0],
        [0.8, 0.7, 0.3, 1.0],
        [0.6, 0.35, 0.75, 1.0],
    ];

    let cube = MeshData::cube(0.75);
    for ix in 0..5 {
        for iz in 0..5 {
            let offset = Vec3::new(
                (ix as f32 - 2.0) * 2.4,
                0.75,
                (iz as f32 - 2.0) * 2.4,
            );
            let mut node = Node::new(device, layouts, Mat4::from_translation(offset));
            node.add(
                Material::new(device, layouts, palette[(ix * 5 + iz) % palette.len()]),
                vec![cube.upload(device)],
            );
            scene.add(node);
        }
    }

    scene
}

/// A light circling the scene at a fixed radius and height.
struct OrbitLight {
    base_angle: f32,
    speed: f32,
    orbit_radius: f32,
    height: f32,
    color: Vec3,
}

impl OrbitLight {
    fn sample(&self, elapsed: f32) -> PointLight {
        let angle = self.base_angle + self.speed * elapsed;
        let position = Vec3::new(
            self.orbit_radius * angle.cos(),
            self.height,
            self.orbit_radius * angle.sin(),
        );

        let mut light = PointLight::new(position, self.color, 4.0);
        light.intensity = 1.2;
        light
    }
}

fn orbit_lights(count: usize) -> Vec<OrbitLight> {
    const GOLDEN_ANGLE: f32 = 2.399_963;

    let colors = [
        Vec3::new(1.0, 0.85, 0.6),
        Vec3::new(0.6, 0.8, 1.0),
        Vec3::new(1.0, 0.5, 0.5),
        Vec3::new(0.55, 1.0, 0.7),
    ];

    (0..count)
        .map(|i| {
            let t = i as f32 / count as f32;
            OrbitLight {
                base_angle: i as f32 * GOLDEN_ANGLE,
                speed: 0.25 + t * 0.6,
                orbit_radius: 2.0 + t * 9.0,
                height: 1.0 + (i % 4) as f32 * 1.1,
                color: colors[i % colors.len()],
            }
        })
        .collect()
}
