//! Control panel overlay (egui on top of the 3D frame).

use egui::viewport::ViewportId;
use egui::Context as EguiContext;
use egui_wgpu::{Renderer as EguiRenderer, ScreenDescriptor};
use egui_winit::State as EguiWinitState;
use winit::event::WindowEvent;
use winit::window::Window;

use crate::gfx::stats::FrameStats;
use crate::scene::ControlParams;

pub struct UiLayer {
    ctx: EguiContext,
    state: EguiWinitState,
    renderer: EguiRenderer,
}

impl UiLayer {
    pub fn new(device: &wgpu::Device, window: &Window, format: wgpu::TextureFormat) -> Self {
        let ctx = EguiContext::default();
        let state = EguiWinitState::new(ctx.clone(), ViewportId::ROOT, window, None, None, None);
        let renderer = EguiRenderer::new(device, format, None, 1, false);
        Self {
            ctx,
            state,
            renderer,
        }
    }

    /// Returns true when the event was consumed by the panel.
    pub fn on_window_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        self.state.on_window_event(window, event).consumed
    }

    /// Run the panel for this frame and paint it over `view`.
    #[allow(clippy::too_many_arguments)]
    pub fn draw(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        window: &Window,
        view: &wgpu::TextureView,
        size: (u32, u32),
        params: &mut ControlParams,
        stats: &FrameStats,
    ) {
        let raw_input = self.state.take_egui_input(window);
        let full_output = self.ctx.run(raw_input, |ctx| {
            egui::Window::new("Controls")
                .resizable(false)
                .show(ctx, |ui| {
                    ui.checkbox(&mut params.sound_on, "Sound");
                    ui.checkbox(&mut params.animation_on, "Animation");
                    ui.add(
                        egui::Slider::new(&mut params.duration, ControlParams::DURATION_RANGE)
                            .step_by(ControlParams::DURATION_STEP)
                            .text("Duration"),
                    );
                    ui.add(
                        egui::Slider::new(&mut params.position, ControlParams::POSITION_RANGE)
                            .step_by(ControlParams::POSITION_STEP)
                            .text("Position"),
                    );
                    ui.separator();
                    ui.label(format!(
                        "{:.0} fps / {:.2} ms",
                        stats.fps, stats.frame_ms
                    ));
                });
        });
        self.state
            .handle_platform_output(window, full_output.platform_output);

        let paint_jobs = self
            .ctx
            .tessellate(full_output.shapes, self.ctx.pixels_per_point());
        for (id, delta) in &full_output.textures_delta.set {
            self.renderer.update_texture(device, queue, *id, delta);
        }
        let screen = ScreenDescriptor {
            size_in_pixels: [size.0, size.1],
            pixels_per_point: self.ctx.pixels_per_point(),
        };
        self.renderer
            .update_buffers(device, queue, encoder, &paint_jobs, &screen);
        {
            let rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("ui-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            let mut rpass = rpass.forget_lifetime();
            self.renderer.render(&mut rpass, &paint_jobs, &screen);
        }
        for id in &full_output.textures_delta.free {
            self.renderer.free_texture(id);
        }
    }
}
