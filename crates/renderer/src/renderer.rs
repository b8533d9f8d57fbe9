//! Renderer owning the wgpu state and the scene draw entry points.

use crate::{
    camera::{Camera, CameraUniform},
    mesh::Mesh,
    pipeline::{
        create_camera_bind_group_layout, create_model_bind_group_layout, create_scene_pipeline,
        create_texture_bind_group_layout,
    },
    texture::{DepthTexture, Texture},
    vertex::InstanceRaw,
};
use anyhow::Result;
use bytemuck::{Pod, Zeroable};
use std::sync::Arc;
use wgpu::util::DeviceExt;
use winit::window::Window;

/// Per-draw model uniform (must match scene.wgsl ModelUniform).
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct ModelUniform {
    model: [[f32; 4]; 4],
    /// Nonzero selects the per-instance attribute matrix in the shader.
    use_instance_matrix: u32,
    _pad: [u32; 3],
}

/// One model uniform slot. Each body draws from its own slot so the
/// per-frame `write_buffer` calls cannot clobber each other before the
/// command buffer executes.
struct ModelSlot {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// Main renderer state.
pub struct Renderer {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub size: winit::dpi::PhysicalSize<u32>,
    pub window: Arc<Window>,

    pipeline: wgpu::RenderPipeline,

    camera_bind_group: wgpu::BindGroup,
    camera_buffer: wgpu::Buffer,
    camera_uniform: CameraUniform,

    texture_bind_group_layout: wgpu::BindGroupLayout,
    model_bind_group_layout: wgpu::BindGroupLayout,
    model_slots: Vec<ModelSlot>,

    /// Per-instance transform buffer, fully rewritten every frame.
    instance_buffer: wgpu::Buffer,
    max_instances: u32,
    instance_count: u32,

    depth_texture: DepthTexture,
}

impl Renderer {
    /// Create a new renderer for the given window. `max_instances` is
    /// the instance buffer capacity (the planet count here).
    pub async fn new(window: Arc<Window>, max_instances: u32) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("Failed to find suitable GPU adapter"))?;

        log::info!("Using GPU: {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Main Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let camera_uniform = CameraUniform::new();
        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[camera_uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let camera_bind_group_layout = create_camera_bind_group_layout(&device);
        let model_bind_group_layout = create_model_bind_group_layout(&device);
        let texture_bind_group_layout = create_texture_bind_group_layout(&device);

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Camera Bind Group"),
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let pipeline = create_scene_pipeline(
            &device,
            &config,
            &camera_bind_group_layout,
            &model_bind_group_layout,
            &texture_bind_group_layout,
        );

        let depth_texture = DepthTexture::new(&device, config.width, config.height);

        // Sized for at least one instance so the non-instanced path can
        // keep the buffer bound with the attribute matrix unread.
        let max_instances = max_instances.max(1);
        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Instance Buffer"),
            size: (std::mem::size_of::<InstanceRaw>() * max_instances as usize) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            window,
            pipeline,
            camera_bind_group,
            camera_buffer,
            camera_uniform,
            texture_bind_group_layout,
            model_bind_group_layout,
            model_slots: Vec::new(),
            instance_buffer,
            max_instances,
            instance_count: 0,
            depth_texture,
        })
    }

    /// Layout for sampled textures; `Texture::load` needs it.
    pub fn texture_layout(&self) -> &wgpu::BindGroupLayout {
        &self.texture_bind_group_layout
    }

    /// Handle window resize.
    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.depth_texture = DepthTexture::new(&self.device, self.config.width, self.config.height);
        }
    }

    /// Update the camera uniform. Call before the scene pass; draw calls
    /// never touch view/projection themselves.
    pub fn update_camera(&mut self, camera: &Camera) {
        self.camera_uniform.update(camera);
        self.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[self.camera_uniform]),
        );
    }

    /// Make sure at least `count` model uniform slots exist.
    pub fn ensure_model_slots(&mut self, count: usize) {
        while self.model_slots.len() < count {
            let uniform = ModelUniform {
                model: glam::Mat4::IDENTITY.to_cols_array_2d(),
                use_instance_matrix: 0,
                _pad: [0; 3],
            };
            let buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Model Uniform"),
                contents: bytemuck::cast_slice(&[uniform]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
            let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Model Bind Group"),
                layout: &self.model_bind_group_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                }],
            });
            self.model_slots.push(ModelSlot { buffer, bind_group });
        }
    }

    /// Write a model matrix (and the matrix-source flag) into a slot.
    pub fn set_model(&mut self, slot: usize, model: glam::Mat4, use_instance_matrix: bool) {
        self.ensure_model_slots(slot + 1);
        let uniform = ModelUniform {
            model: model.to_cols_array_2d(),
            use_instance_matrix: use_instance_matrix as u32,
            _pad: [0; 3],
        };
        self.queue
            .write_buffer(&self.model_slots[slot].buffer, 0, bytemuck::cast_slice(&[uniform]));
    }

    /// Re-upload the full per-instance transform buffer. Called once per
    /// frame after the scene update; no partial or double-buffered path.
    pub fn upload_instances(&mut self, instances: &[InstanceRaw]) {
        let count = instances.len().min(self.max_instances as usize);
        if count < instances.len() {
            log::warn!(
                "instance buffer holds {} of {} instances; extra are dropped",
                count,
                instances.len()
            );
        }
        if count > 0 {
            self.queue
                .write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances[..count]));
        }
        self.instance_count = count as u32;
    }

    /// Begin a new frame, returning the surface texture and encoder.
    pub fn begin_frame(&mut self) -> Result<(wgpu::SurfaceTexture, wgpu::CommandEncoder)> {
        let output = self.surface.get_current_texture()?;
        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        Ok((output, encoder))
    }

    /// Run the scene pass: clear color and depth, bind the pipeline,
    /// camera, and instance buffer, then hand the pass to the closure.
    pub fn with_scene_pass(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        f: impl FnOnce(&Self, &mut wgpu::RenderPass),
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: 0.0,
                        g: 0.0,
                        b: 0.2,
                        a: 1.0,
                    }),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_texture.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.camera_bind_group, &[]);
        pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
        f(self, &mut pass);
    }

    /// Draw the mesh once with the model matrix from `slot`.
    pub fn draw_mesh(
        &self,
        pass: &mut wgpu::RenderPass,
        mesh: &Mesh,
        texture: &Texture,
        slot: usize,
    ) {
        if mesh.is_empty() {
            log::error!("draw skipped: mesh has no geometry");
            return;
        }
        let Some(model_slot) = self.model_slots.get(slot) else {
            log::error!("draw skipped: model slot {} not initialized", slot);
            return;
        };
        pass.set_bind_group(1, &model_slot.bind_group, &[]);
        pass.set_bind_group(2, &texture.bind_group, &[]);
        pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        pass.draw(0..mesh.num_vertices, 0..1);
    }

    /// Draw the mesh once per uploaded instance in a single call. All
    /// instances share `texture`; `slot` must carry
    /// `use_instance_matrix = true`.
    pub fn draw_mesh_instanced(
        &self,
        pass: &mut wgpu::RenderPass,
        mesh: &Mesh,
        texture: &Texture,
        slot: usize,
    ) {
        if mesh.is_empty() {
            log::error!("instanced draw skipped: mesh has no geometry");
            return;
        }
        if self.instance_count == 0 {
            log::error!("instanced draw skipped: no instances uploaded");
            return;
        }
        let Some(model_slot) = self.model_slots.get(slot) else {
            log::error!("instanced draw skipped: model slot {} not initialized", slot);
            return;
        };
        pass.set_bind_group(1, &model_slot.bind_group, &[]);
        pass.set_bind_group(2, &texture.bind_group, &[]);
        pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        pass.draw(0..mesh.num_vertices, 0..self.instance_count);
    }

    /// Submit the frame and present.
    pub fn end_frame(&self, output: wgpu::SurfaceTexture, encoder: wgpu::CommandEncoder) {
        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
    }
}
