use crate::core::atmosphere::{AtmosphereUniform, AtmosphereUniforms};
use crate::core::constants::{
    ATMOSPHERE_RADIUS, ATMOSPHERE_SCALE, GLOBE_RADIUS, SPHERE_SEGMENTS, STARFIELD_SEED,
};
use crate::core::geometry::{self, Mesh};
use crate::core::orbit::Camera;
use glam::Mat4;
use web_sys as web;
use wgpu::util::DeviceExt;

mod helpers;
use helpers::{PassStyle, ADDITIVE};

/// Uniform block shared by every pass, laid out like `Scene` in `globe.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct SceneUniforms {
    view_proj: [[f32; 4]; 4],
    group: [[f32; 4]; 4],
    eye: [f32; 4],
    atmosphere: AtmosphereUniforms,
}

/// Per-marker instance data: model matrix columns then RGBA.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MarkerInstance {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
}

impl MarkerInstance {
    pub fn new(model: Mat4, rgb: [f32; 3], opacity: f32) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            color: [rgb[0], rgb[1], rgb[2], opacity],
        }
    }
}

struct MeshBuffers {
    vertices: wgpu::Buffer,
    indices: wgpu::Buffer,
    index_count: u32,
}

impl MeshBuffers {
    fn upload(device: &wgpu::Device, label: &str, mesh: &Mesh) -> Self {
        let vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let indices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertices,
            indices,
            index_count: mesh.indices.len() as u32,
        }
    }
}

struct StarBuffer {
    buffer: wgpu::Buffer,
    count: u32,
}

pub struct GpuState<'a> {
    surface: wgpu::Surface<'a>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    // keeps the depth view's texture alive
    _depth_tex: wgpu::Texture,
    depth_view: wgpu::TextureView,

    uniforms: SceneUniforms,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,

    globe_pipeline: wgpu::RenderPipeline,
    atmosphere_pipeline: wgpu::RenderPipeline,
    marker_pipeline: wgpu::RenderPipeline,
    star_pipeline: wgpu::RenderPipeline,

    globe: MeshBuffers,
    atmosphere: MeshBuffers,
    marker_box: MeshBuffers,
    marker_instances: wgpu::Buffer,
    marker_capacity: u32,
    marker_count: u32,
    stars: [StarBuffer; 2],

    width: u32,
    height: u32,
}

impl<'a> GpuState<'a> {
    pub async fn new(
        canvas: &'a web::HtmlCanvasElement,
        marker_capacity: usize,
    ) -> anyhow::Result<Self> {
        let width = canvas.width().max(1);
        let height = canvas.height().max(1);

        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No WebGPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: None,
                },
                None,
            )
            .await
            .map_err(|e| anyhow::anyhow!("request_device error: {:?}", e))?;
        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| {
                matches!(
                    f,
                    wgpu::TextureFormat::Bgra8UnormSrgb | wgpu::TextureFormat::Rgba8UnormSrgb
                )
            })
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| anyhow::anyhow!("surface reports no formats"))?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        let (depth_tex, depth_view) = helpers::create_depth_texture(&device, width, height);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("globe_shader"),
            source: wgpu::ShaderSource::Wgsl(crate::core::GLOBE_WGSL.into()),
        });
        let uniforms = SceneUniforms {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            group: Mat4::IDENTITY.to_cols_array_2d(),
            eye: [0.0, 0.0, 1.0, 1.0],
            atmosphere: AtmosphereUniforms::default(),
        };
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("scene_uniforms"),
            contents: bytemuck::bytes_of(&uniforms),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("scene_bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("scene_bg"),
            layout: &bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });
        let pl = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene_pl"),
            bind_group_layouts: &[&bgl],
            push_constant_ranges: &[],
        });

        let marker_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MarkerInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &helpers::MARKER_INSTANCE_ATTRIBUTES,
        };
        let star_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<[f32; 3]>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &helpers::STAR_ATTRIBUTES,
        };
        let triangles = wgpu::PrimitiveTopology::TriangleList;

        let globe_pipeline = helpers::make_scene_pipeline(
            &device,
            "globe_pipeline",
            &pl,
            &shader,
            "vs_globe",
            "fs_globe",
            &[helpers::mesh_layout()],
            format,
            PassStyle {
                topology: triangles,
                cull_mode: Some(wgpu::Face::Back),
                depth_write: true,
                blend: None,
            },
        );
        // Inside of the shell only, glowing around the globe's silhouette.
        let atmosphere_pipeline = helpers::make_scene_pipeline(
            &device,
            "atmosphere_pipeline",
            &pl,
            &shader,
            "vs_atmosphere",
            "fs_atmosphere",
            &[helpers::mesh_layout()],
            format,
            PassStyle {
                topology: triangles,
                cull_mode: Some(wgpu::Face::Front),
                depth_write: false,
                blend: Some(ADDITIVE),
            },
        );
        let marker_pipeline = helpers::make_scene_pipeline(
            &device,
            "marker_pipeline",
            &pl,
            &shader,
            "vs_marker",
            "fs_marker",
            &[helpers::mesh_layout(), marker_layout],
            format,
            PassStyle {
                topology: triangles,
                cull_mode: Some(wgpu::Face::Back),
                depth_write: true,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
            },
        );
        let star_pipeline = helpers::make_scene_pipeline(
            &device,
            "star_pipeline",
            &pl,
            &shader,
            "vs_stars",
            "fs_stars",
            &[star_layout],
            format,
            PassStyle {
                topology: wgpu::PrimitiveTopology::PointList,
                cull_mode: None,
                depth_write: false,
                blend: None,
            },
        );

        let globe = MeshBuffers::upload(
            &device,
            "globe_mesh",
            &geometry::uv_sphere(GLOBE_RADIUS, SPHERE_SEGMENTS, SPHERE_SEGMENTS),
        );
        let atmosphere = MeshBuffers::upload(
            &device,
            "atmosphere_mesh",
            &geometry::uv_sphere(
                ATMOSPHERE_RADIUS * ATMOSPHERE_SCALE,
                SPHERE_SEGMENTS,
                SPHERE_SEGMENTS,
            ),
        );
        let marker_box = MeshBuffers::upload(&device, "marker_mesh", &geometry::marker_box());
        let marker_capacity = marker_capacity.max(1) as u32;
        let marker_instances = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("marker_instances"),
            size: marker_capacity as u64 * std::mem::size_of::<MarkerInstance>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let stars = [false, true].map(|mirror| {
            let points = geometry::starfield(STARFIELD_SEED.wrapping_add(mirror as u64), mirror);
            StarBuffer {
                buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("starfield"),
                    contents: bytemuck::cast_slice(&points),
                    usage: wgpu::BufferUsages::VERTEX,
                }),
                count: points.len() as u32,
            }
        });
        log::info!(
            "[render] WebGPU ready {}x{} format={:?} markers={}",
            width,
            height,
            format,
            marker_capacity
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            _depth_tex: depth_tex,
            depth_view,
            uniforms,
            uniform_buffer,
            bind_group,
            globe_pipeline,
            atmosphere_pipeline,
            marker_pipeline,
            star_pipeline,
            globe,
            atmosphere,
            marker_box,
            marker_instances,
            marker_capacity,
            marker_count: 0,
            stars,
            width,
            height,
        })
    }

    pub fn set_camera(&mut self, camera: &Camera) {
        self.uniforms.view_proj = camera.view_proj().to_cols_array_2d();
        self.uniforms.eye = camera.eye.extend(1.0).to_array();
    }

    /// Rotation applied to the globe and the markers.
    pub fn set_group(&mut self, group: Mat4) {
        self.uniforms.group = group.to_cols_array_2d();
    }

    pub fn set_markers(&mut self, instances: &[MarkerInstance]) {
        let n = instances.len().min(self.marker_capacity as usize);
        self.queue.write_buffer(
            &self.marker_instances,
            0,
            bytemuck::cast_slice(&instances[..n]),
        );
        self.marker_count = n as u32;
    }

    pub fn resize_if_needed(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if width != self.width || height != self.height {
            self.width = width;
            self.height = height;
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
            let (depth_tex, depth_view) =
                helpers::create_depth_texture(&self.device, width, height);
            self._depth_tex = depth_tex;
            self.depth_view = depth_view;
        }
    }

    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&self.uniforms));
        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("encoder"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            rpass.set_bind_group(0, &self.bind_group, &[]);

            rpass.set_pipeline(&self.star_pipeline);
            for stars in &self.stars {
                rpass.set_vertex_buffer(0, stars.buffer.slice(..));
                rpass.draw(0..stars.count, 0..1);
            }

            rpass.set_pipeline(&self.globe_pipeline);
            draw_mesh(&mut rpass, &self.globe, 0..1);

            if self.marker_count > 0 {
                rpass.set_pipeline(&self.marker_pipeline);
                rpass.set_vertex_buffer(1, self.marker_instances.slice(..));
                draw_mesh(&mut rpass, &self.marker_box, 0..self.marker_count);
            }

            rpass.set_pipeline(&self.atmosphere_pipeline);
            draw_mesh(&mut rpass, &self.atmosphere, 0..1);
        }
        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}

fn draw_mesh(rpass: &mut wgpu::RenderPass<'_>, mesh: &MeshBuffers, instances: std::ops::Range<u32>) {
    rpass.set_vertex_buffer(0, mesh.vertices.slice(..));
    rpass.set_index_buffer(mesh.indices.slice(..), wgpu::IndexFormat::Uint32);
    rpass.draw_indexed(0..mesh.index_count, 0, instances);
}

impl AtmosphereUniform for GpuState<'_> {
    fn set_mix_ratio(&mut self, value: f32) {
        self.uniforms.atmosphere.set_mix_ratio(value);
    }
}
