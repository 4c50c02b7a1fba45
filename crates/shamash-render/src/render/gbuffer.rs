use anyhow::{Context, Result};

/// G-buffer channel formats.
///
/// Precision rationale per channel:
/// - positions are unbounded world-space values and feed precision-sensitive
///   lighting math, so they get full 32-bit floats
/// - normals are unit vectors with signed components; 16-bit floats suffice
/// - albedo is a display-range color; 8-bit normalized is enough
pub mod formats {
    use wgpu::TextureFormat;

    pub const POSITION: TextureFormat = TextureFormat::Rgba32Float;
    pub const NORMAL: TextureFormat = TextureFormat::Rgba16Float;
    pub const ALBEDO: TextureFormat = TextureFormat::Rgba8Unorm;
    pub const DEPTH: TextureFormat = TextureFormat::Depth24Plus;

    /// Color channels in attachment order: position, normal, albedo.
    pub const COLOR: [TextureFormat; 3] = [POSITION, NORMAL, ALBEDO];
}

/// Neutral value every color channel is cleared to before geometry draws.
///
/// Pixels no primitive touches keep this value; a zero normal yields zero
/// lighting in the resolve pass, so the background needs no special casing.
pub const COLOR_CLEAR: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 0.0,
    b: 0.0,
    a: 0.0,
};

/// Depth is cleared to the far value so the less-than test keeps the nearest
/// surface per pixel.
pub const DEPTH_CLEAR: f32 = 1.0;

/// Sample type a G-buffer channel exposes to the resolve pass.
///
/// 32-bit (and, without the float32-filterable feature, 16-bit) float
/// textures may only be sampled without filtering; the resolve shader uses
/// `textureLoad` exclusively, so nothing is lost. Albedo stays filterable.
pub fn gbuffer_sample_type(format: wgpu::TextureFormat) -> wgpu::TextureSampleType {
    match format {
        wgpu::TextureFormat::Rgba32Float | wgpu::TextureFormat::Rgba16Float => {
            wgpu::TextureSampleType::Float { filterable: false }
        }
        _ => wgpu::TextureSampleType::Float { filterable: true },
    }
}

fn checked_extent(width: u32, height: u32) -> Result<wgpu::Extent3d> {
    anyhow::ensure!(
        width > 0 && height > 0,
        "G-buffer extent must be non-zero, got {width}x{height}"
    );
    Ok(wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    })
}

/// Per-resolution G-buffer attachments.
///
/// All four textures share one extent; attachment index i of every channel
/// describes the same surface fragment. The geometry pass is the only
/// writer, the resolve pass the only reader. Recreated whole on resize.
pub struct GBuffer {
    size: (u32, u32),

    pub position: wgpu::Texture,
    pub position_view: wgpu::TextureView,
    pub normal: wgpu::Texture,
    pub normal_view: wgpu::TextureView,
    pub albedo: wgpu::Texture,
    pub albedo_view: wgpu::TextureView,
    pub depth: wgpu::Texture,
    pub depth_view: wgpu::TextureView,
}

impl GBuffer {
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Result<Self> {
        let extent = checked_extent(width, height).context("creating G-buffer")?;

        let make = |format: wgpu::TextureFormat, label: &str| {
            let texture = device.create_texture(&wgpu::TextureDescriptor {
                label: Some(label),
                size: extent,
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                    | wgpu::TextureUsages::TEXTURE_BINDING,
                view_formats: &[],
            });
            let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
            (texture, view)
        };

        let (position, position_view) = make(formats::POSITION, "shamash gbuffer position");
        let (normal, normal_view) = make(formats::NORMAL, "shamash gbuffer normal");
        let (albedo, albedo_view) = make(formats::ALBEDO, "shamash gbuffer albedo");

        // Depth is never sampled by the resolve pass; attachment usage only.
        let depth = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("shamash gbuffer depth"),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: formats::DEPTH,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let depth_view = depth.create_view(&wgpu::TextureViewDescriptor::default());

        Ok(Self {
            size: (width, height),
            position,
            position_view,
            normal,
            normal_view,
            albedo,
            albedo_view,
            depth,
            depth_view,
        })
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Actual formats of the three color attachments, in attachment order.
    pub fn color_formats(&self) -> [wgpu::TextureFormat; 3] {
        [
            self.position.format(),
            self.normal.format(),
            self.albedo.format(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_precision_choices() {
        assert_eq!(formats::POSITION, wgpu::TextureFormat::Rgba32Float);
        assert_eq!(formats::NORMAL, wgpu::TextureFormat::Rgba16Float);
        assert_eq!(formats::ALBEDO, wgpu::TextureFormat::Rgba8Unorm);
        assert_eq!(formats::DEPTH, wgpu::TextureFormat::Depth24Plus);
        assert_eq!(
            formats::COLOR,
            [formats::POSITION, formats::NORMAL, formats::ALBEDO]
        );
    }

    #[test]
    fn float_channels_are_non_filterable() {
        assert_eq!(
            gbuffer_sample_type(formats::POSITION),
            wgpu::TextureSampleType::Float { filterable: false }
        );
        assert_eq!(
            gbuffer_sample_type(formats::NORMAL),
            wgpu::TextureSampleType::Float { filterable: false }
        );
        assert_eq!(
            gbuffer_sample_type(formats::ALBEDO),
            wgpu::TextureSampleType::Float { filterable: true }
        );
    }

    #[test]
    fn neutral_clear_is_zero() {
        assert_eq!(COLOR_CLEAR.r, 0.0);
        assert_eq!(COLOR_CLEAR.g, 0.0);
        assert_eq!(COLOR_CLEAR.b, 0.0);
        assert_eq!(COLOR_CLEAR.a, 0.0);
        assert_eq!(DEPTH_CLEAR, 1.0);
    }

    #[test]
    fn zero_extent_rejected() {
        assert!(checked_extent(0, 600).is_err());
        assert!(checked_extent(800, 0).is_err());
        assert!(checked_extent(800, 600).is_ok());
    }
}
