use anyhow::Result;

use crate::camera::CameraBinding;

use super::{ClusterParamsUniform, LightSet};

/// Per-frame cluster population, recorded into the frame's command encoder.
///
/// The orchestrator invokes this exactly once per frame, after clearing the
/// cluster buffer and before the geometry/resolve passes. Implementations
/// must only write the cluster buffer; correct ordering comes from command
/// order on the queue's serial timeline, not from explicit synchronization.
pub trait ClusterStage {
    fn record(&self, encoder: &mut wgpu::CommandEncoder);
}

const WORKGROUP_SIZE: [u32; 3] = [4, 4, 4];

/// Compute-shader light culling.
///
/// One invocation per cluster: builds the cluster's view-space AABB from its
/// tile corners and depth-slice bounds, then tests every light's influence
/// sphere against it, writing up to the configured capacity of indices.
pub struct LightCulling {
    pipeline: wgpu::ComputePipeline,
    bind_group: wgpu::BindGroup,
    workgroups: [u32; 3],
}

impl LightCulling {
    pub fn new(
        device: &wgpu::Device,
        camera: &CameraBinding,
        lights: &LightSet,
    ) -> Result<Self> {
        let grid = lights.grid();
        grid.validate()?;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("shamash cluster shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/cluster.wgsl").into()),
        });

        let bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("shamash cluster bgl"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::COMPUTE,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: Some(CameraBinding::min_binding_size()),
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::COMPUTE,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: Some(ClusterParamsUniform::min_binding_size()),
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 2,
                        visibility: wgpu::ShaderStages::COMPUTE,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Storage { read_only: true },
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 3,
                        visibility: wgpu::ShaderStages::COMPUTE,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Storage { read_only: false },
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                ],
            });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("shamash cluster bind group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera.buffer().as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: lights.params_buffer().as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: lights.light_buffer().as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: lights.cluster_buffer().as_entire_binding(),
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("shamash cluster pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("shamash cluster pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("main"),
            compilation_options: Default::default(),
            cache: None,
        });

        let workgroups = [
            grid.x.div_ceil(WORKGROUP_SIZE[0]),
            grid.y.div_ceil(WORKGROUP_SIZE[1]),
            grid.z.div_ceil(WORKGROUP_SIZE[2]),
        ];

        Ok(Self {
            pipeline,
            bind_group,
            workgroups,
        })
    }
}

impl ClusterStage for LightCulling {
    fn record(&self, encoder: &mut wgpu::CommandEncoder) {
        let mut cpass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("shamash cluster pass"),
            timestamp_writes: None,
        });

        cpass.set_pipeline(&self.pipeline);
        cpass.set_bind_group(0, &self.bind_group, &[]);
        cpass.dispatch_workgroups(self.workgroups[0], self.workgroups[1], self.workgroups[2]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lights::ClusterGrid;

    #[test]
    fn dispatch_covers_the_whole_grid() {
        let grid = ClusterGrid { x: 16, y: 9, z: 24, max_lights_per_cluster: 63 };
        let wg = [
            grid.x.div_ceil(WORKGROUP_SIZE[0]),
            grid.y.div_ceil(WORKGROUP_SIZE[1]),
            grid.z.div_ceil(WORKGROUP_SIZE[2]),
        ];
        assert!(wg[0] * WORKGROUP_SIZE[0] >= grid.x);
        assert!(wg[1] * WORKGROUP_SIZE[1] >= grid.y);
        assert!(wg[2] * WORKGROUP_SIZE[2] >= grid.z);
        assert_eq!(wg, [4, 3, 6]);
    }
}
