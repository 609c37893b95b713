//! GPU resources for one volumetric image.

use std::time::Instant;

use slabview_core::{Image, ViewController, ViewMode, ViewOptions};

use crate::buffer::{create_uniform_buffer, create_vertex_buffer};
use crate::context::GpuContext;
use crate::error::{RenderError, RenderResult};
use crate::geometry::Geometry;
use crate::layer::Layer;
use crate::shader::{create_image_module, FRAGMENT_ENTRY, VERTEX_ENTRY};
use crate::texture::VolumeTexture;
use crate::uniforms::{
    ContrastUniforms, GpuUniformBuffer, LayerUniforms, SceneUniforms, SliceUniforms,
};

/// Depth attachment format used by the 3D view.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24Plus;

/// Depth clear value: the far end of the depth range, so any fragment passes
/// the `Less` test.
pub const DEPTH_CLEAR: f32 = 1.0;

const CUBE_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
const QUAD_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

/// Vertex buffer, volume texture, uniforms, pipeline and bind group of one
/// image. Replacing the image means building a new layer.
pub struct ImageLayer {
    id: String,
    mode: ViewMode,
    image_size: [u32; 3],
    vertex_buffer: wgpu::Buffer,
    vertex_count: u32,
    volume: VolumeTexture,
    uniforms: LayerUniforms,
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
}

impl ImageLayer {
    /// Builds every resource and uploads the initial contents.
    ///
    /// Without an image the layer shows [`Image::placeholder`]. Any GPU error
    /// raised while building is returned instead of reaching the device's
    /// uncaptured error handler.
    pub fn new(
        view_id: &str,
        mode: ViewMode,
        gpu: &GpuContext,
        color_format: wgpu::TextureFormat,
        image: Option<&Image>,
        options: &ViewOptions,
    ) -> RenderResult<Self> {
        let placeholder;
        let image = if let Some(image) = image {
            image
        } else {
            placeholder = Image::placeholder();
            &placeholder
        };
        let id = format!("{view_id}-image");

        gpu.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        gpu.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let built = Self::build(id.clone(), mode, gpu, color_format, image, options);
        let validation = pollster::block_on(gpu.device.pop_error_scope());
        let out_of_memory = pollster::block_on(gpu.device.pop_error_scope());

        let layer = built?;
        if let Some(err) = validation.or(out_of_memory) {
            log::error!("failed to build {id}: {err}");
            return Err(RenderError::ResourceCreationFailed {
                label: id,
                message: err.to_string(),
            });
        }

        log::debug!("created {} ({mode}, {:?})", layer.id, layer.image_size);
        Ok(layer)
    }

    fn build(
        id: String,
        mode: ViewMode,
        gpu: &GpuContext,
        color_format: wgpu::TextureFormat,
        image: &Image,
        options: &ViewOptions,
    ) -> RenderResult<Self> {
        let device = &gpu.device;

        let geometry = Geometry::for_image(mode, image);
        let vertex_buffer =
            create_vertex_buffer(device, &geometry.vertices, Some(&format!("{id} vertices")));

        let volume = VolumeTexture::new(gpu, image, &id)?;

        let scene_buffer =
            create_uniform_buffer::<SceneUniforms>(device, Some(&format!("{id} scene")));
        let contrast_buffer =
            create_uniform_buffer::<ContrastUniforms>(device, Some(&format!("{id} contrast")));
        let slice_buffer =
            create_uniform_buffer::<SliceUniforms>(device, Some(&format!("{id} slice index")));

        let bind_group_layout = create_bind_group_layout(device, mode, &id);

        let mut entries = vec![
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&volume.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&volume.sampler),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: contrast_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 3,
                resource: scene_buffer.as_entire_binding(),
            },
        ];
        if mode == ViewMode::Slice {
            entries.push(wgpu::BindGroupEntry {
                binding: 4,
                resource: slice_buffer.as_entire_binding(),
            });
        }
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{id} bind group")),
            layout: &bind_group_layout,
            entries: &entries,
        });

        let pipeline = create_pipeline(
            device,
            mode,
            &bind_group_layout,
            color_format,
            geometry.stride(),
            &id,
        );

        let queue = &gpu.queue;
        let uniforms = LayerUniforms::new(
            options,
            Box::new(GpuUniformBuffer::new(queue.clone(), scene_buffer)),
            Box::new(GpuUniformBuffer::new(queue.clone(), contrast_buffer)),
            Box::new(GpuUniformBuffer::new(queue.clone(), slice_buffer)),
        );

        Ok(Self {
            id,
            mode,
            image_size: image.size(),
            vertex_buffer,
            vertex_count: geometry.vertex_count,
            volume,
            uniforms,
            pipeline,
            bind_group,
        })
    }

    /// Advances the camera to `now` and uploads the new scene transform.
    pub fn update_scene(&mut self, controller: &mut ViewController, now: Instant) {
        self.uniforms.update_scene(controller, now);
    }

    /// Uploads the scene transform without advancing the camera.
    pub fn upload_scene(&mut self, controller: &ViewController) {
        self.uniforms.upload_scene(controller);
    }

    /// Uploads a new contrast window in raw intensity units.
    pub fn update_contrast(&mut self, min: f32, max: f32) {
        self.uniforms.update_contrast(min, max);
    }

    /// Uploads a new depth slice index (used by the 2D view).
    pub fn update_slice_index(&mut self, index: f32) {
        self.uniforms.update_slice_index(index);
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn uniforms(&self) -> &LayerUniforms {
        &self.uniforms
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    /// `[depth, height, width]` of the uploaded image.
    pub fn image_size(&self) -> [u32; 3] {
        self.image_size
    }

    pub fn texture(&self) -> &wgpu::Texture {
        &self.volume.texture
    }
}

impl Layer for ImageLayer {
    fn id(&self) -> &str {
        &self.id
    }

    fn render(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.draw(0..self.vertex_count, 0..1);
    }
}

fn uniform_entry<T>(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<T>() as u64),
        },
        count: None,
    }
}

fn create_bind_group_layout(
    device: &wgpu::Device,
    mode: ViewMode,
    id: &str,
) -> wgpu::BindGroupLayout {
    let mut entries = vec![
        // volume texture
        wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D3,
                multisampled: false,
            },
            count: None,
        },
        // volume sampler
        wgpu::BindGroupLayoutEntry {
            binding: 1,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        },
        uniform_entry::<ContrastUniforms>(2, wgpu::ShaderStages::FRAGMENT),
        uniform_entry::<SceneUniforms>(3, wgpu::ShaderStages::VERTEX_FRAGMENT),
    ];
    if mode == ViewMode::Slice {
        entries.push(uniform_entry::<SliceUniforms>(4, wgpu::ShaderStages::FRAGMENT));
    }

    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(&format!("{id} bind group layout")),
        entries: &entries,
    })
}

fn create_pipeline(
    device: &wgpu::Device,
    mode: ViewMode,
    bind_group_layout: &wgpu::BindGroupLayout,
    color_format: wgpu::TextureFormat,
    stride: wgpu::BufferAddress,
    id: &str,
) -> wgpu::RenderPipeline {
    let shader = create_image_module(device, mode, id);

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(&format!("{id} pipeline layout")),
        bind_group_layouts: &[bind_group_layout],
        push_constant_ranges: &[],
    });

    let attributes: &[wgpu::VertexAttribute] = match mode {
        ViewMode::Volume => &CUBE_ATTRIBUTES,
        ViewMode::Slice => &QUAD_ATTRIBUTES,
    };

    let depth_stencil = mode.uses_depth().then(|| wgpu::DepthStencilState {
        format: DEPTH_FORMAT,
        depth_write_enabled: true,
        depth_compare: wgpu::CompareFunction::Less,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(&format!("{id} pipeline ({mode})")),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some(VERTEX_ENTRY),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: stride,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes,
            }],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some(FRAGMENT_ENTRY),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None, // camera may sit inside the box
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}
