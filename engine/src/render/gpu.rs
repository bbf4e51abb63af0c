//! wgpu Render Backend
//!
//! Draws every node instance as a camera-facing sphere impostor in a single
//! instanced draw call. Resources are created in [`RenderBackend::acquire`]
//! and dropped together in [`RenderBackend::release`].

use std::sync::Arc;

use bytemuck::Zeroable;
use wgpu::util::DeviceExt;
use winit::window::Window;

use super::backend::RenderBackend;
use super::view::{FrameView, NodeInstance, SceneUniforms};
use crate::error::{Result, SceneError};

/// Starting capacity of the instance buffer (grows on demand)
const INITIAL_INSTANCE_CAPACITY: usize = 2048;
/// Vertices per impostor quad (two triangles)
const QUAD_VERTICES: u32 = 6;

/// Dark space background
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 0.0,
    b: 0.02,
    a: 1.0,
};

/// Options for GPU resource creation.
#[derive(Debug, Clone)]
pub struct GpuBackendConfig {
    /// Cap frame rate to the display refresh
    pub vsync: bool,
    /// Prefer the discrete GPU
    pub high_performance: bool,
}

impl Default for GpuBackendConfig {
    fn default() -> Self {
        Self {
            vsync: true,
            high_performance: true,
        }
    }
}

/// Everything that exists only between acquire and release.
struct GpuResources {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    instance_buffer: wgpu::Buffer,
    instance_capacity: usize,
}

/// Window-backed wgpu renderer.
pub struct GpuBackend {
    window: Arc<Window>,
    config: GpuBackendConfig,
    resources: Option<GpuResources>,
}

impl GpuBackend {
    pub fn new(window: Arc<Window>, config: GpuBackendConfig) -> Self {
        Self {
            window,
            config,
            resources: None,
        }
    }

    #[inline]
    pub fn is_acquired(&self) -> bool {
        self.resources.is_some()
    }

    fn create_resources(&self, width: u32, height: u32) -> Result<GpuResources> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(Arc::clone(&self.window))
            .map_err(|e| SceneError::SurfaceUnavailable(e.to_string()))?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: if self.config.high_performance {
                wgpu::PowerPreference::HighPerformance
            } else {
                wgpu::PowerPreference::LowPower
            },
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .map_err(|e| SceneError::AdapterUnavailable(e.to_string()))?;

        let info = adapter.get_info();
        log::info!("[GpuBackend] Adapter: {} ({:?})", info.name, info.backend);

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("Planetary Scene Device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            memory_hints: wgpu::MemoryHints::Performance,
            ..Default::default()
        }))
        .map_err(|e| SceneError::DeviceRequest(e.to_string()))?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| SceneError::SurfaceUnavailable("surface reports no formats".into()))?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let present_mode = if self.config.vsync {
            wgpu::PresentMode::AutoVsync
        } else if caps.present_modes.contains(&wgpu::PresentMode::Mailbox) {
            wgpu::PresentMode::Mailbox
        } else {
            wgpu::PresentMode::AutoNoVsync
        };

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let depth_view = create_depth_view(&device, surface_config.width, surface_config.height);

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Scene Uniforms"),
            contents: bytemuck::bytes_of(&SceneUniforms::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Scene Bind Group Layout"),
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
            label: Some("Scene Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Planetary Impostor Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../../../shaders/planetary.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Planetary Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Planetary Impostor Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                buffers: &[instance_buffer_layout()],
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            multiview: None,
            cache: None,
        });

        let instance_buffer = create_instance_buffer(&device, INITIAL_INSTANCE_CAPACITY);

        Ok(GpuResources {
            device,
            queue,
            surface,
            surface_config,
            depth_view,
            pipeline,
            uniform_buffer,
            bind_group,
            instance_buffer,
            instance_capacity: INITIAL_INSTANCE_CAPACITY,
        })
    }
}

impl RenderBackend for GpuBackend {
    fn acquire(&mut self, width: u32, height: u32) -> Result<()> {
        if self.is_acquired() {
            return Ok(());
        }
        // Built into a local first: a failure part way leaves nothing held
        let resources = self.create_resources(width, height)?;
        log::info!(
            "[GpuBackend] Acquired {}x{} surface ({:?})",
            resources.surface_config.width,
            resources.surface_config.height,
            resources.surface_config.format
        );
        self.resources = Some(resources);
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        let Some(res) = self.resources.as_mut() else {
            return;
        };
        if width == 0 || height == 0 {
            return;
        }
        res.surface_config.width = width;
        res.surface_config.height = height;
        res.surface.configure(&res.device, &res.surface_config);
        res.depth_view = create_depth_view(&res.device, width, height);
    }

    fn render(&mut self, view: &FrameView, instances: &[NodeInstance]) -> Result<()> {
        let Some(res) = self.resources.as_mut() else {
            return Err(SceneError::Render("backend not acquired".into()));
        };

        if instances.len() > res.instance_capacity {
            let capacity = instances.len().next_power_of_two();
            log::debug!("[GpuBackend] Growing instance buffer to {capacity}");
            res.instance_buffer = create_instance_buffer(&res.device, capacity);
            res.instance_capacity = capacity;
        }

        res.queue
            .write_buffer(&res.uniform_buffer, 0, bytemuck::bytes_of(&view.uniforms()));
        if !instances.is_empty() {
            res.queue
                .write_buffer(&res.instance_buffer, 0, bytemuck::cast_slice(instances));
        }

        let output = match res.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                // Reconfigure and skip this frame
                res.surface.configure(&res.device, &res.surface_config);
                return Err(SceneError::Render("surface lost, reconfigured".into()));
            }
            Err(e) => return Err(SceneError::Render(e.to_string())),
        };
        let target = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = res
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Planetary Frame Encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Planetary Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &res.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if !instances.is_empty() {
                pass.set_pipeline(&res.pipeline);
                pass.set_bind_group(0, &res.bind_group, &[]);
                pass.set_vertex_buffer(0, res.instance_buffer.slice(..));
                pass.draw(0..QUAD_VERTICES, 0..instances.len() as u32);
            }
        }

        res.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    fn release(&mut self) {
        if self.resources.take().is_some() {
            log::info!("[GpuBackend] Released GPU resources");
        }
    }
}

/// Per-instance vertex layout matching [`NodeInstance`].
fn instance_buffer_layout() -> wgpu::VertexBufferLayout<'static> {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x4,
        1 => Float32x4,
        2 => Float32x4,
    ];
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<NodeInstance>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes: &ATTRIBUTES,
    }
}

fn create_instance_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Node Instance Buffer"),
        size: (capacity * std::mem::size_of::<NodeInstance>()) as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Depth32Float,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}
