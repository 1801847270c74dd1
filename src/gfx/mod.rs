//! Renderer: wgpu init, scene resources, and the per-frame passes.
//!
//! Frame order: drain asset completions, advance controls/oscillator/mixer,
//! upload uniforms, shadow pass, forward pass, skybox, control panel, present.

pub mod anim;
pub mod camera;
pub mod controls;
pub mod mesh;
pub mod pipeline;
pub mod stats;
pub mod types;
pub mod ui;
pub mod util;

pub use types::Vertex;

use std::time::Instant;

use anyhow::Context;
use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;
use wgpu::{rwh::HasDisplayHandle, rwh::HasWindowHandle, SurfaceError, SurfaceTargetUnsafe};
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::window::Window;

use crate::assets::load::{self, LoadedAsset, ModelKind};
use crate::assets::{self, load_texture_or_fallback, white_fallback, SkinnedMeshCPU, TextureCPU};
use crate::audio::{apply_sound_toggle, NullPlayback, Playback, Soundtrack};
use crate::config::{PlacementCfg, SceneConfig};
use crate::scene::{Bounce, ControlParams, ParamChanges};
use camera::Camera;
use controls::OrbitControls;
use mesh::GpuMesh;
use stats::FrameStats;
use types::{Globals, LightGlobals, Model, VertexSkinned};
use ui::UiLayer;
use util::scale_to_max;

const BOUNCE_START: f32 = 10.0;
const BOUNCE_MIN: f32 = 5.0;
const BOUNCE_MAX: f32 = 20.0;
const BOUNCE_SPEED: f32 = 0.1;

// Flat base colors for models whose materials we do not sample.
const HOUSE_COLOR: [f32; 3] = [0.78, 0.62, 0.44];
const ALIEN_COLOR: [f32; 3] = [0.45, 0.75, 0.45];
const CAT_COLOR: [f32; 3] = [0.55, 0.50, 0.48];

/// One static object ready to draw.
struct DrawItem {
    mesh: GpuMesh,
    model_buf: wgpu::Buffer,
    model_bg: wgpu::BindGroup,
    material_bg: wgpu::BindGroup,
}

/// The skinned model with its joint palette.
struct SkinnedDraw {
    cpu: SkinnedMeshCPU,
    vbuf: wgpu::Buffer,
    ibuf: wgpu::Buffer,
    index_count: u32,
    model_buf: wgpu::Buffer,
    model_bg: wgpu::BindGroup,
    material_bg: wgpu::BindGroup,
    palette_buf: wgpu::Buffer,
    palette_bg: wgpu::BindGroup,
    mixer: anim::AnimationMixer,
}

pub struct Renderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    max_dim: u32,
    depth: wgpu::TextureView,

    layouts: pipeline::Layouts,
    pipelines: pipeline::Pipelines,

    globals_buf: wgpu::Buffer,
    globals_bg: wgpu::BindGroup,
    shadow_view: wgpu::TextureView,
    light_buf: wgpu::Buffer,
    light_bg: wgpu::BindGroup,
    sky_bg: wgpu::BindGroup,
    linear_sampler: wgpu::Sampler,
    white_material_bg: wgpu::BindGroup,

    ground: DrawItem,
    sphere: DrawItem,
    house: Option<DrawItem>,
    alien: Option<DrawItem>,
    cat: Option<DrawItem>,
    skinned: Option<SkinnedDraw>,
    assets_rx: load::Rx,

    cfg: SceneConfig,
    camera: Camera,
    controls: OrbitControls,
    params: ControlParams,
    bounce: Bounce,
    skeleton_group_z: f32,
    audio: Box<dyn Playback>,
    stats: FrameStats,
    ui: UiLayer,

    start: Instant,
    last_time: f32,
}

impl Renderer {
    /// Create a renderer bound to a window surface.
    pub async fn new(window: &Window, cfg: SceneConfig) -> anyhow::Result<Self> {
        // --- Surface ---
        let instance = wgpu::Instance::default();
        // Create a surface without borrowing `window` for its lifetime.
        let raw_display = window.display_handle()?.as_raw();
        let raw_window = window.window_handle()?.as_raw();
        let surface = unsafe {
            instance.create_surface_unsafe(SurfaceTargetUnsafe::RawHandle {
                raw_display_handle: raw_display,
                raw_window_handle: raw_window,
            })
        }
        .context("create wgpu surface (unsafe)")?;

        // --- Adapter / Device ---
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                compatible_surface: Some(&surface),
                power_preference: wgpu::PowerPreference::HighPerformance,
                force_fallback_adapter: false,
            })
            .await
            .context("request adapter")?;
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("wgpu-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::default(),
            })
            .await
            .context("request device")?;

        // --- Surface configuration (with clamping to device limits) ---
        let size = window.inner_size();
        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(caps.formats[0]);
        let present_mode = caps
            .present_modes
            .iter()
            .copied()
            .find(|m| *m == wgpu::PresentMode::Mailbox)
            .unwrap_or(wgpu::PresentMode::Fifo);
        let alpha_mode = caps.alpha_modes[0];
        let max_dim = device.limits().max_texture_dimension_2d.max(1);
        let (w, h) = scale_to_max((size.width, size.height), max_dim);
        if (w, h) != (size.width, size.height) {
            log::warn!(
                "clamping surface from {}x{} to {}x{} (max_dim={})",
                size.width,
                size.height,
                w,
                h,
                max_dim
            );
        }
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: w,
            height: h,
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        let depth = util::create_depth_view(&device, config.width, config.height);

        // --- Pipelines + BGLs ---
        let layouts = pipeline::create_layouts(&device);
        let pipelines = pipeline::create_pipelines(&device, &layouts, config.format);

        // --- Global uniforms, shadow map, samplers ---
        let globals_buf = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("globals"),
            size: std::mem::size_of::<Globals>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let shadow_view = util::create_shadow_map(&device, cfg.light.shadow_map_size);
        let shadow_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("shadow-sampler"),
            compare: Some(wgpu::CompareFunction::LessEqual),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let globals_bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("globals-bg"),
            layout: &layouts.globals,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: globals_buf.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&shadow_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&shadow_sampler),
                },
            ],
        });
        let light_buf = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("light-globals"),
            size: std::mem::size_of::<LightGlobals>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let light_bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("light-bg"),
            layout: &layouts.light,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: light_buf.as_entire_binding(),
            }],
        });
        let linear_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("linear-sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        // --- Skybox (cube layer order: +X, -X, +Y, -Y, +Z, -Z) ---
        let [ft, bk, up, dn, rt, lf] = &cfg.skybox;
        let faces: [TextureCPU; 6] = [rt, lf, up, dn, ft, bk]
            .map(|p| load_texture_or_fallback(&assets::asset_path(p), true));
        let sky_view = util::create_cube_texture(&device, &queue, &faces);
        let sky_bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("sky-bg"),
            layout: &layouts.sky,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&sky_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&linear_sampler),
                },
            ],
        });

        // --- Materials ---
        let white = white_fallback();
        let white_view = util::create_color_texture(&device, &queue, &white, "white");
        let white_material_bg = material_bg(&device, &layouts, &white_view, &linear_sampler, "white");
        let ground_tex =
            load_texture_or_fallback(&assets::asset_path(&cfg.ground.texture), true);
        let ground_view = util::create_color_texture(&device, &queue, &ground_tex, "ground");
        let sphere_tex =
            load_texture_or_fallback(&assets::asset_path(&cfg.sphere.texture), true);
        let sphere_view = util::create_color_texture(&device, &queue, &sphere_tex, "sphere");

        // --- Procedural meshes ---
        let ground = {
            let cpu = mesh::plane(cfg.ground.extent, cfg.ground.uv_repeat);
            let gpu = mesh::upload(&device, &cpu, "ground");
            let model = Model {
                model: Mat4::from_translation(Vec3::from_array(cfg.ground.position))
                    .to_cols_array_2d(),
                color: [1.0, 1.0, 1.0, 1.0],
                flags: [1.0, 0.0, 0.0, 0.0],
            };
            make_item(
                &device,
                &layouts,
                gpu,
                model,
                material_bg(&device, &layouts, &ground_view, &linear_sampler, "ground"),
                "ground",
            )
        };
        let sphere = {
            let cpu = mesh::sphere(1.0, 32, 24);
            let gpu = mesh::upload(&device, &cpu, "sphere");
            let model = Model {
                model: Mat4::from_translation(Vec3::from_array(cfg.sphere.position))
                    .to_cols_array_2d(),
                color: [1.0, 1.0, 1.0, 1.0],
                flags: [1.0, 0.0, 0.0, 0.0],
            };
            make_item(
                &device,
                &layouts,
                gpu,
                model,
                material_bg(&device, &layouts, &sphere_view, &linear_sampler, "sphere"),
                "sphere",
            )
        };

        // --- Background model loads ---
        let (tx, assets_rx) = load::channel();
        let _ = load::spawn_static(&tx, ModelKind::House, assets::asset_path(&cfg.house.path));
        let _ = load::spawn_static(&tx, ModelKind::Alien, assets::asset_path(&cfg.alien.path));
        let _ = load::spawn_static(&tx, ModelKind::Cat, assets::asset_path(&cfg.cat.path));
        let _ = load::spawn_skinned(&tx, assets::asset_path(&cfg.skeleton.path));

        // --- Scene state ---
        let aspect = config.width as f32 / config.height as f32;
        let camera = Camera::new(&cfg.camera, aspect);
        let controls = OrbitControls::from_eye(camera.eye, camera.target);
        let params = ControlParams::default();
        let audio: Box<dyn Playback> = match Soundtrack::new(
            &assets::asset_path(&cfg.sound.path),
            cfg.sound.volume,
        ) {
            Ok(s) => Box::new(s),
            Err(e) => {
                log::warn!("audio unavailable ({e:#}); sound toggle will be a no-op");
                Box::new(NullPlayback)
            }
        };
        let ui = UiLayer::new(&device, window, config.format);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            max_dim,
            depth,
            layouts,
            pipelines,
            globals_buf,
            globals_bg,
            shadow_view,
            light_buf,
            light_bg,
            sky_bg,
            linear_sampler,
            white_material_bg,
            ground,
            sphere,
            house: None,
            alien: None,
            cat: None,
            skinned: None,
            assets_rx,
            cfg,
            camera,
            controls,
            params,
            bounce: Bounce::new(BOUNCE_START, BOUNCE_MIN, BOUNCE_MAX, BOUNCE_SPEED),
            skeleton_group_z: 0.0,
            audio,
            stats: FrameStats::default(),
            ui,
            start: Instant::now(),
            last_time: 0.0,
        })
    }

    /// Feed a window event to the panel first, then the orbit controls.
    pub fn handle_window_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        if self.ui.on_window_event(window, event) {
            return true;
        }
        self.controls.handle_window_event(event)
    }

    /// Resize the swapchain while preserving aspect and device limits.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        let (w, h) = scale_to_max((new_size.width, new_size.height), self.max_dim);
        if (w, h) != (new_size.width, new_size.height) {
            log::warn!(
                "resize {}x{} exceeds max {}, clamped to {}x{}",
                new_size.width,
                new_size.height,
                self.max_dim,
                w,
                h
            );
        }
        self.config.width = w;
        self.config.height = h;
        self.surface.configure(&self.device, &self.config);
        self.depth = util::create_depth_view(&self.device, w, h);
        self.camera.set_aspect(w, h);
    }

    fn poll_assets(&mut self) {
        for asset in self.assets_rx.drain() {
            match asset {
                LoadedAsset::Static { kind, mesh } => {
                    let (cfg, color) = match kind {
                        ModelKind::House => (self.cfg.house.clone(), HOUSE_COLOR),
                        ModelKind::Alien => (self.cfg.alien.clone(), ALIEN_COLOR),
                        ModelKind::Cat => (self.cfg.cat.clone(), CAT_COLOR),
                    };
                    let gpu = mesh::upload(&self.device, &mesh, "model");
                    let item = make_item(
                        &self.device,
                        &self.layouts,
                        gpu,
                        placement_model(&cfg, color),
                        self.white_material_bg.clone(),
                        "model",
                    );
                    match kind {
                        ModelKind::House => self.house = Some(item),
                        ModelKind::Alien => self.alien = Some(item),
                        ModelKind::Cat => self.cat = Some(item),
                    }
                }
                LoadedAsset::Skinned { mesh } => {
                    self.skinned = Some(self.build_skinned(*mesh));
                }
            }
        }
    }

    fn build_skinned(&self, cpu: SkinnedMeshCPU) -> SkinnedDraw {
        let verts: Vec<VertexSkinned> = cpu
            .vertices
            .iter()
            .map(|v| VertexSkinned {
                pos: v.pos,
                nrm: v.nrm,
                joints: v.joints,
                weights: v.weights,
                uv: v.uv,
            })
            .collect();
        let vbuf = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("skinned-vb"),
                contents: bytemuck::cast_slice(&verts),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let ibuf = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("skinned-ib"),
                contents: bytemuck::cast_slice(&cpu.indices),
                usage: wgpu::BufferUsages::INDEX,
            });
        let textured = cpu.base_color_texture.is_some();
        let material_bg = match &cpu.base_color_texture {
            Some(tex) => {
                let view = util::create_color_texture(&self.device, &self.queue, tex, "skinned");
                material_bg(
                    &self.device,
                    &self.layouts,
                    &view,
                    &self.linear_sampler,
                    "skinned",
                )
            }
            None => self.white_material_bg.clone(),
        };
        let model = Model {
            model: self.skeleton_model_matrix().to_cols_array_2d(),
            color: [0.85, 0.85, 0.85, if textured { 1.0 } else { 0.0 }],
            flags: [
                if self.cfg.skeleton.receive_shadow { 1.0 } else { 0.0 },
                0.0,
                0.0,
                0.0,
            ],
        };
        let model_buf = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("skinned-model"),
                contents: bytemuck::bytes_of(&model),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let model_bg = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("skinned-model-bg"),
            layout: &self.layouts.model,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: model_buf.as_entire_binding(),
            }],
        });
        let joints = cpu.joints_nodes.len().max(1);
        let palette_buf = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("palette"),
            size: (joints * std::mem::size_of::<[[f32; 4]; 4]>()) as u64,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let palette_bg = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("palette-bg"),
            layout: &self.layouts.palette,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: palette_buf.as_entire_binding(),
            }],
        });
        let clip_duration = cpu
            .animations
            .first()
            .map(|c| c.duration)
            .unwrap_or(1.0);
        let index_count = cpu.indices.len() as u32;
        SkinnedDraw {
            cpu,
            vbuf,
            ibuf,
            index_count,
            model_buf,
            model_bg,
            material_bg,
            palette_buf,
            palette_bg,
            mixer: anim::AnimationMixer::new(clip_duration, self.params.duration),
        }
    }

    fn skeleton_model_matrix(&self) -> Mat4 {
        let p = Vec3::from_array(self.cfg.skeleton.position)
            + Vec3::new(0.0, 0.0, self.skeleton_group_z);
        Mat4::from_translation(p) * Mat4::from_scale(Vec3::splat(self.cfg.skeleton.scale))
    }

    fn cat_model_matrix(&self) -> Mat4 {
        let p = Vec3::new(
            self.bounce.pos,
            self.cfg.cat.position[1],
            self.cfg.cat.position[2],
        );
        Mat4::from_translation(p) * Mat4::from_scale(Vec3::splat(self.cfg.cat.scale))
    }

    fn apply_param_changes(&mut self, changes: ParamChanges) {
        if let Some(on) = changes.sound {
            apply_sound_toggle(self.audio.as_mut(), on);
        }
        if let Some(d) = changes.duration {
            if let Some(sk) = self.skinned.as_mut() {
                sk.mixer.set_duration(d);
            }
        }
        if let Some(z) = changes.position {
            self.skeleton_group_z = z;
            let m = self.skeleton_model_matrix().to_cols_array_2d();
            if let Some(sk) = self.skinned.as_ref() {
                self.queue
                    .write_buffer(&sk.model_buf, 0, bytemuck::bytes_of(&m));
            }
        }
        // the animation toggle has no side effect; the mixer just stops advancing
    }

    /// Render one frame.
    pub fn render(&mut self, window: &Window) -> Result<(), SurfaceError> {
        self.poll_assets();

        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let t = self.start.elapsed().as_secs_f32();
        let dt = (t - self.last_time).max(0.0);
        self.last_time = t;

        // advance simulation
        self.controls.update(1.0);
        self.camera.eye = self.controls.eye();
        self.bounce.step(1.0);
        if self.params.animation_on {
            if let Some(sk) = self.skinned.as_mut() {
                sk.mixer.update(dt);
            }
        }

        // uniforms
        let view_proj = self.camera.view_proj();
        let light_pos = Vec3::from_array(self.cfg.light.position);
        let l = &self.cfg.light;
        let sun_view_proj = Mat4::orthographic_rh(
            l.shadow_left,
            l.shadow_right,
            l.shadow_bottom,
            l.shadow_top,
            l.shadow_near,
            l.shadow_far,
        ) * Mat4::look_at_rh(light_pos, Vec3::ZERO, Vec3::Y);
        let globals = Globals {
            view_proj: view_proj.to_cols_array_2d(),
            inv_view_proj: view_proj.inverse().to_cols_array_2d(),
            sun_view_proj: sun_view_proj.to_cols_array_2d(),
            camera_pos: self.camera.eye.extend(1.0).to_array(),
            sun_dir: light_pos.normalize().extend(l.intensity).to_array(),
            fog: [
                self.cfg.fog.color[0],
                self.cfg.fog.color[1],
                self.cfg.fog.color[2],
                self.cfg.fog.density,
            ],
            ambient: [l.ambient, 0.0, 0.0, 0.0],
        };
        self.queue
            .write_buffer(&self.globals_buf, 0, bytemuck::bytes_of(&globals));
        let light_globals = LightGlobals {
            view_proj: sun_view_proj.to_cols_array_2d(),
        };
        self.queue
            .write_buffer(&self.light_buf, 0, bytemuck::bytes_of(&light_globals));
        if let Some(cat) = self.cat.as_ref() {
            let m = self.cat_model_matrix().to_cols_array_2d();
            self.queue
                .write_buffer(&cat.model_buf, 0, bytemuck::bytes_of(&m));
        }
        if let Some(sk) = self.skinned.as_ref() {
            if let Some(clip) = sk.cpu.animations.first() {
                let palette = anim::sample_palette(&sk.cpu, clip, sk.mixer.clip_time());
                let mats: Vec<[[f32; 4]; 4]> =
                    palette.iter().map(|m| m.to_cols_array_2d()).collect();
                self.queue
                    .write_buffer(&sk.palette_buf, 0, bytemuck::cast_slice(&mats));
            }
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame-encoder"),
            });

        // shadow pass: everything except the ground casts
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("shadow-pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.shadow_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            rpass.set_pipeline(&self.pipelines.shadow_static);
            rpass.set_bind_group(0, &self.light_bg, &[]);
            for item in [Some(&self.sphere), self.house.as_ref(), self.alien.as_ref(), self.cat.as_ref()]
                .into_iter()
                .flatten()
            {
                rpass.set_bind_group(1, &item.model_bg, &[]);
                rpass.set_vertex_buffer(0, item.mesh.vbuf.slice(..));
                rpass.set_index_buffer(item.mesh.ibuf.slice(..), wgpu::IndexFormat::Uint16);
                rpass.draw_indexed(0..item.mesh.index_count, 0, 0..1);
            }
            if let Some(sk) = self.skinned.as_ref() {
                rpass.set_pipeline(&self.pipelines.shadow_skinned);
                rpass.set_bind_group(0, &self.light_bg, &[]);
                rpass.set_bind_group(1, &sk.model_bg, &[]);
                rpass.set_bind_group(2, &sk.palette_bg, &[]);
                rpass.set_vertex_buffer(0, sk.vbuf.slice(..));
                rpass.set_index_buffer(sk.ibuf.slice(..), wgpu::IndexFormat::Uint16);
                rpass.draw_indexed(0..sk.index_count, 0, 0..1);
            }
        }

        // forward pass: opaque geometry, then the sky at the far plane
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("forward-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 1.0,
                            g: 1.0,
                            b: 1.0,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            rpass.set_pipeline(&self.pipelines.main_static);
            rpass.set_bind_group(0, &self.globals_bg, &[]);
            for item in [
                Some(&self.ground),
                Some(&self.sphere),
                self.house.as_ref(),
                self.alien.as_ref(),
                self.cat.as_ref(),
            ]
            .into_iter()
            .flatten()
            {
                rpass.set_bind_group(1, &item.model_bg, &[]);
                rpass.set_bind_group(2, &item.material_bg, &[]);
                rpass.set_vertex_buffer(0, item.mesh.vbuf.slice(..));
                rpass.set_index_buffer(item.mesh.ibuf.slice(..), wgpu::IndexFormat::Uint16);
                rpass.draw_indexed(0..item.mesh.index_count, 0, 0..1);
            }
            if let Some(sk) = self.skinned.as_ref() {
                rpass.set_pipeline(&self.pipelines.main_skinned);
                rpass.set_bind_group(0, &self.globals_bg, &[]);
                rpass.set_bind_group(1, &sk.model_bg, &[]);
                rpass.set_bind_group(2, &sk.material_bg, &[]);
                rpass.set_bind_group(3, &sk.palette_bg, &[]);
                rpass.set_vertex_buffer(0, sk.vbuf.slice(..));
                rpass.set_index_buffer(sk.ibuf.slice(..), wgpu::IndexFormat::Uint16);
                rpass.draw_indexed(0..sk.index_count, 0, 0..1);
            }
            rpass.set_pipeline(&self.pipelines.sky);
            rpass.set_bind_group(0, &self.globals_bg, &[]);
            rpass.set_bind_group(1, &self.sky_bg, &[]);
            rpass.draw(0..3, 0..1);
        }

        // control panel, then react to whatever the user changed this frame
        let before = self.params;
        self.ui.draw(
            &self.device,
            &self.queue,
            &mut encoder,
            window,
            &view,
            (self.config.width, self.config.height),
            &mut self.params,
            &self.stats,
        );
        let changes = ParamChanges::diff(&before, &self.params);
        if !changes.is_empty() {
            self.apply_param_changes(changes);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        self.stats.on_frame();
        Ok(())
    }
}

fn placement_model(cfg: &PlacementCfg, color: [f32; 3]) -> Model {
    Model {
        model: (Mat4::from_translation(Vec3::from_array(cfg.position))
            * Mat4::from_scale(Vec3::splat(cfg.scale)))
        .to_cols_array_2d(),
        color: [color[0], color[1], color[2], 0.0],
        flags: [
            if cfg.receive_shadow { 1.0 } else { 0.0 },
            0.0,
            0.0,
            0.0,
        ],
    }
}

fn material_bg(
    device: &wgpu::Device,
    layouts: &pipeline::Layouts,
    view: &wgpu::TextureView,
    sampler: &wgpu::Sampler,
    label: &str,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(&format!("{label}-material-bg")),
        layout: &layouts.material,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}

fn make_item(
    device: &wgpu::Device,
    layouts: &pipeline::Layouts,
    mesh: GpuMesh,
    model: Model,
    material_bg: wgpu::BindGroup,
    label: &str,
) -> DrawItem {
    let model_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{label}-model")),
        contents: bytemuck::bytes_of(&model),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    });
    let model_bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(&format!("{label}-model-bg")),
        layout: &layouts.model,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: model_buf.as_entire_binding(),
        }],
    });
    DrawItem {
        mesh,
        model_buf,
        model_bg,
        material_bg,
    }
}
