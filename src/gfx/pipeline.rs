//! Bind group layouts and render pipelines.

use crate::gfx::types::{Vertex, VertexSkinned};

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// All bind group layouts, created once and shared by the pipelines.
pub struct Layouts {
    pub globals: wgpu::BindGroupLayout,
    pub model: wgpu::BindGroupLayout,
    pub material: wgpu::BindGroupLayout,
    pub palette: wgpu::BindGroupLayout,
    pub light: wgpu::BindGroupLayout,
    pub sky: wgpu::BindGroupLayout,
}

pub struct Pipelines {
    pub shadow_static: wgpu::RenderPipeline,
    pub shadow_skinned: wgpu::RenderPipeline,
    pub main_static: wgpu::RenderPipeline,
    pub main_skinned: wgpu::RenderPipeline,
    pub sky: wgpu::RenderPipeline,
}

pub fn create_layouts(device: &wgpu::Device) -> Layouts {
    let globals = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("globals-bgl"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Depth,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                count: None,
            },
        ],
    });
    let model = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("model-bgl"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    });
    let material = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("material-bgl"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    });
    let palette = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("palette-bgl"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage { read_only: true },
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    });
    let light = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("light-bgl"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    });
    let sky = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("sky-bgl"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::Cube,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    });
    Layouts {
        globals,
        model,
        material,
        palette,
        light,
        sky,
    }
}

fn depth_state(write: bool, compare: wgpu::CompareFunction) -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format: DEPTH_FORMAT,
        depth_write_enabled: write,
        depth_compare: compare,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    }
}

pub fn create_pipelines(
    device: &wgpu::Device,
    layouts: &Layouts,
    color_format: wgpu::TextureFormat,
) -> Pipelines {
    let forward = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("forward"),
        source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
    });
    let shadow = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("shadow"),
        source: wgpu::ShaderSource::Wgsl(include_str!("shader_shadow.wgsl").into()),
    });
    let sky = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("sky"),
        source: wgpu::ShaderSource::Wgsl(include_str!("shader_sky.wgsl").into()),
    });

    let color_target = [Some(wgpu::ColorTargetState {
        format: color_format,
        blend: None,
        write_mask: wgpu::ColorWrites::ALL,
    })];

    let main_layout_static = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("main-static-pl"),
        bind_group_layouts: &[&layouts.globals, &layouts.model, &layouts.material],
        push_constant_ranges: &[],
    });
    let main_static = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("main-static"),
        layout: Some(&main_layout_static),
        vertex: wgpu::VertexState {
            module: &forward,
            entry_point: Some("vs_static"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            buffers: &[Vertex::LAYOUT],
        },
        fragment: Some(wgpu::FragmentState {
            module: &forward,
            entry_point: Some("fs_main"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            targets: &color_target,
        }),
        primitive: wgpu::PrimitiveState {
            cull_mode: Some(wgpu::Face::Back),
            ..Default::default()
        },
        depth_stencil: Some(depth_state(true, wgpu::CompareFunction::Less)),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    });

    let main_layout_skinned = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("main-skinned-pl"),
        bind_group_layouts: &[
            &layouts.globals,
            &layouts.model,
            &layouts.material,
            &layouts.palette,
        ],
        push_constant_ranges: &[],
    });
    let main_skinned = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("main-skinned"),
        layout: Some(&main_layout_skinned),
        vertex: wgpu::VertexState {
            module: &forward,
            entry_point: Some("vs_skinned"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            buffers: &[VertexSkinned::LAYOUT],
        },
        fragment: Some(wgpu::FragmentState {
            module: &forward,
            entry_point: Some("fs_main"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            targets: &color_target,
        }),
        primitive: wgpu::PrimitiveState {
            cull_mode: Some(wgpu::Face::Back),
            ..Default::default()
        },
        depth_stencil: Some(depth_state(true, wgpu::CompareFunction::Less)),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    });

    let shadow_layout_static = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("shadow-static-pl"),
        bind_group_layouts: &[&layouts.light, &layouts.model],
        push_constant_ranges: &[],
    });
    let shadow_static = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("shadow-static"),
        layout: Some(&shadow_layout_static),
        vertex: wgpu::VertexState {
            module: &shadow,
            entry_point: Some("vs_static"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            buffers: &[Vertex::LAYOUT],
        },
        fragment: None,
        primitive: wgpu::PrimitiveState {
            cull_mode: Some(wgpu::Face::Back),
            ..Default::default()
        },
        depth_stencil: Some(depth_state(true, wgpu::CompareFunction::Less)),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    });

    let shadow_layout_skinned = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("shadow-skinned-pl"),
        bind_group_layouts: &[&layouts.light, &layouts.model, &layouts.palette],
        push_constant_ranges: &[],
    });
    let shadow_skinned = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("shadow-skinned"),
        layout: Some(&shadow_layout_skinned),
        vertex: wgpu::VertexState {
            module: &shadow,
            entry_point: Some("vs_skinned"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            buffers: &[VertexSkinned::LAYOUT],
        },
        fragment: None,
        primitive: wgpu::PrimitiveState {
            cull_mode: Some(wgpu::Face::Back),
            ..Default::default()
        },
        depth_stencil: Some(depth_state(true, wgpu::CompareFunction::Less)),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    });

    let sky_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("sky-pl"),
        bind_group_layouts: &[&layouts.globals, &layouts.sky],
        push_constant_ranges: &[],
    });
    let sky = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("sky"),
        layout: Some(&sky_layout),
        vertex: wgpu::VertexState {
            module: &sky,
            entry_point: Some("vs_sky"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            buffers: &[],
        },
        fragment: Some(wgpu::FragmentState {
            module: &sky,
            entry_point: Some("fs_sky"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            targets: &color_target,
        }),
        primitive: wgpu::PrimitiveState::default(),
        // drawn at the far plane after opaque geometry
        depth_stencil: Some(depth_state(false, wgpu::CompareFunction::LessEqual)),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    });

    Pipelines {
        shadow_static,
        shadow_skinned,
        main_static,
        main_skinned,
        sky,
    }
}
