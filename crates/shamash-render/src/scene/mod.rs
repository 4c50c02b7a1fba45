//! Scene representation consumed by the geometry pass.
//!
//! Responsibilities:
//! - GPU mesh/material/node resources and their bind groups
//! - a deterministic three-level traversal: node → material → primitive
//!
//! The traversal contract matters more than the storage: the geometry pass
//! binds the model group once per node, the material group once per material,
//! and vertex/index buffers once per primitive, in exactly the order `visit`
//! yields them. The traversal is finite and restartable; visiting twice
//! yields the same sequence.

mod material;
mod mesh;
mod node;
mod vertex;

pub use material::{Material, MaterialUniform};
pub use mesh::{MeshData, Primitive};
pub use node::{MaterialSlot, ModelUniform, Node};
pub use vertex::Vertex;

/// Bind group layouts shared by scene resources and the geometry pipeline.
///
/// Created once at renderer initialization. Nodes and materials build their
/// bind groups against these layouts; the geometry pipeline layout references
/// the same objects, which is what makes the per-draw `set_bind_group` calls
/// compatible by construction.
pub struct SceneLayouts {
    pub model: wgpu::BindGroupLayout,
    pub material: wgpu::BindGroupLayout,
}

impl SceneLayouts {
    pub fn new(device: &wgpu::Device) -> Self {
        let model = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("shamash model bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: Some(ModelUniform::min_binding_size()),
                },
                count: None,
            }],
        });

        let material = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("shamash material bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: Some(MaterialUniform::min_binding_size()),
                },
                count: None,
            }],
        });

        Self { model, material }
    }
}

/// Receiver for the ordered scene traversal.
pub trait SceneVisitor {
    fn node(&mut self, node: &Node);
    fn material(&mut self, material: &Material);
    fn primitive(&mut self, primitive: &Primitive);
}

/// Ordered collection of scene nodes.
#[derive(Default)]
pub struct Scene {
    nodes: Vec<Node>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, node: Node) {
        self.nodes.push(node);
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Walks every node, its materials, and their primitives, in insertion
    /// order, calling the visitor at each level.
    pub fn visit(&self, visitor: &mut impl SceneVisitor) {
        for node in &self.nodes {
            visitor.node(node);
            for slot in node.slots() {
                visitor.material(&slot.material);
                for primitive in &slot.primitives {
                    visitor.primitive(primitive);
                }
            }
        }
    }
}
