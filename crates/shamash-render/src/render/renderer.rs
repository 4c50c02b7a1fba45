use anyhow::{Context, Result};
use winit::dpi::PhysicalSize;

use crate::camera::CameraBinding;
use crate::lights::{ClusterStage, LightSet};
use crate::scene::{Scene, SceneLayouts};

use super::{GBuffer, GeometryPass, LightingResolvePass, RenderCtx, RenderTarget};

/// One step of the per-frame command sequence.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameStep {
    /// Zero the cluster buffer so a frame with fewer lights cannot inherit
    /// stale assignments.
    ClearClusters,
    /// Record the cluster stage (writes the cluster buffer).
    AssignClusters,
    /// Record the geometry pass (writes G-buffer + depth).
    Geometry,
    /// Record the lighting resolve (reads G-buffer + clusters, writes the
    /// frame target).
    Resolve,
}

/// The fixed recording order. Each step depends on the writes of every step
/// before it; the queue's serial timeline makes those writes visible in
/// submission order, so this list is the only ordering mechanism the
/// pipeline needs. Reordering entries is a correctness bug, not a tuning
/// knob — in particular `Resolve` before `Geometry` would shade from
/// cleared G-buffer data.
pub const FRAME_SEQUENCE: [FrameStep; 4] = [
    FrameStep::ClearClusters,
    FrameStep::AssignClusters,
    FrameStep::Geometry,
    FrameStep::Resolve,
];

/// Owns the deferred pipeline and sequences one frame's command stream.
///
/// Pass objects are private and only reachable through [`render_frame`];
/// callers cannot invoke them out of order. Submission is performed by the
/// frame context immediately after `render_frame` returns, completing the
/// clear → cluster → geometry → resolve → submit sequence.
///
/// [`render_frame`]: DeferredRenderer::render_frame
pub struct DeferredRenderer {
    gbuffer: GBuffer,
    scene_layouts: SceneLayouts,
    geometry: GeometryPass,
    resolve: LightingResolvePass,
    cluster_stage: Box<dyn ClusterStage>,
}

impl DeferredRenderer {
    /// Builds every pipeline and resolution-dependent resource.
    ///
    /// All configuration errors surface here: zero-sized targets, degenerate
    /// cluster grids (checked by the collaborators) and format disagreements
    /// between the G-buffer and the geometry pipeline. A failed construction
    /// leaves nothing partially initialized.
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        size: PhysicalSize<u32>,
        camera: &CameraBinding,
        lights: &LightSet,
        cluster_stage: Box<dyn ClusterStage>,
    ) -> Result<Self> {
        let gbuffer = GBuffer::new(device, size.width, size.height)
            .context("deferred renderer G-buffer")?;

        anyhow::ensure!(
            gbuffer.color_formats() == GeometryPass::TARGET_FORMATS,
            "geometry pipeline targets {:?} do not match G-buffer formats {:?}",
            GeometryPass::TARGET_FORMATS,
            gbuffer.color_formats(),
        );

        let scene_layouts = SceneLayouts::new(device);
        let geometry = GeometryPass::new(device, camera, &scene_layouts)
            .context("geometry pass setup")?;
        let resolve = LightingResolvePass::new(device, surface_format, camera, lights, &gbuffer)
            .context("lighting resolve setup")?;

        Ok(Self {
            gbuffer,
            scene_layouts,
            geometry,
            resolve,
            cluster_stage,
        })
    }

    /// Layouts scene resources must be built against so their bind groups
    /// match the geometry pipeline.
    pub fn scene_layouts(&self) -> &SceneLayouts {
        &self.scene_layouts
    }

    /// Records one frame into the target's encoder.
    ///
    /// Camera uniforms and the light list must already be uploaded for this
    /// frame; both are read-only from here on. Errors only arise from
    /// resolution changes (G-buffer recreation) and propagate so the caller
    /// can decide whether to retry at another size.
    pub fn render_frame(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        scene: &Scene,
        lights: &LightSet,
        camera: &CameraBinding,
    ) -> Result<()> {
        self.ensure_target_size(ctx, camera, lights)?;

        for step in FRAME_SEQUENCE {
            match step {
                FrameStep::ClearClusters => {
                    target.encoder.clear_buffer(lights.cluster_buffer(), 0, None);
                }
                FrameStep::AssignClusters => {
                    self.cluster_stage.record(target.encoder);
                }
                FrameStep::Geometry => {
                    self.geometry.record(target.encoder, &self.gbuffer, scene);
                }
                FrameStep::Resolve => {
                    self.resolve.record(target.encoder, target.color_view);
                }
            }
        }

        Ok(())
    }

    /// Recreates the G-buffer (and the resolve bindings that reference its
    /// views) when the frame target's resolution changed.
    fn ensure_target_size(
        &mut self,
        ctx: &RenderCtx<'_>,
        camera: &CameraBinding,
        lights: &LightSet,
    ) -> Result<()> {
        let (width, height) = (ctx.size.width, ctx.size.height);
        if self.gbuffer.size() == (width, height) {
            return Ok(());
        }

        self.gbuffer = GBuffer::new(ctx.device, width, height)
            .context("recreating G-buffer after resize")?;
        self.resolve.rebind(ctx.device, camera, lights, &self.gbuffer);

        log::debug!("G-buffer recreated at {width}x{height}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_sequence_order_is_fixed() {
        assert_eq!(
            FRAME_SEQUENCE,
            [
                FrameStep::ClearClusters,
                FrameStep::AssignClusters,
                FrameStep::Geometry,
                FrameStep::Resolve,
            ]
        );
    }

    #[test]
    fn geometry_precedes_resolve() {
        let pos = |step| FRAME_SEQUENCE.iter().position(|&s| s == step).unwrap();
        assert!(pos(FrameStep::ClearClusters) < pos(FrameStep::AssignClusters));
        assert!(pos(FrameStep::AssignClusters) < pos(FrameStep::Resolve));
        assert!(pos(FrameStep::Geometry) < pos(FrameStep::Resolve));
    }

    #[test]
    fn every_step_recorded_exactly_once() {
        for step in [
            FrameStep::ClearClusters,
            FrameStep::AssignClusters,
            FrameStep::Geometry,
            FrameStep::Resolve,
        ] {
            assert_eq!(FRAME_SEQUENCE.iter().filter(|&&s| s == step).count(), 1);
        }
    }
}
