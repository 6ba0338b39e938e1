//! Pins, the route arc and contact markers drawn over the globe.
//!
//! Overlay geometry is rebuilt wholesale, and only when a quantized
//! [`OverlaySignature`] of its inputs changes. Marker visibility is cheap
//! and is refreshed every frame without touching the geometry.

use std::sync::Arc;

use common::{Contact, GeoPoint};
use glam::Vec3;
use image::RgbaImage;
use web_time::Duration;

use crate::camera::{Camera, Projection};
use crate::config::{OverlayConfig, SurfaceConfig};
use crate::types::{surface_position, BadgeCache, HandleAllocator, NodeHandle};
use crate::ViewMode;

/// Change-detection fingerprint of everything overlay geometry depends on.
///
/// Inputs that differ by less than the configured quanta produce equal
/// signatures and therefore skip the rebuild.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OverlaySignature {
    mode: ViewMode,
    coordinates: Vec<[i32; 2]>,
    progress_bucket: u32,
    scale_bucket: i32,
    avatars: Vec<String>,
}

impl OverlaySignature {
    pub fn new(
        config: &OverlayConfig,
        mode: ViewMode,
        coordinates: &[GeoPoint],
        progress: f32,
        scale: f32,
        avatars: &[&str],
    ) -> Self {
        let quantize = |value: f32| (value / config.coordinate_quantum).round() as i32;

        let progress = if progress.is_nan() {
            0.
        } else {
            progress.clamp(0., 1.)
        };

        Self {
            mode,
            coordinates: coordinates
                .iter()
                .map(|point| [quantize(point.lat), quantize(point.lon)])
                .collect(),
            progress_bucket: (progress * config.progress_buckets as f32).floor() as u32,
            scale_bucket: (scale * config.scale_buckets as f32).round() as i32,
            avatars: avatars.iter().map(|avatar| avatar.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PinNode {
    pub handle: NodeHandle,
    pub contact_id: String,
    pub position: Vec3,
}

#[derive(Debug, Clone)]
pub struct ArcNode {
    pub handle: NodeHandle,
    pub points: Vec<Vec3>,
}

/// Camera-facing avatar badge anchored to a contact's location.
#[derive(Debug, Clone)]
pub struct MarkerNode {
    pub handle: NodeHandle,
    pub contact_id: String,
    pub glyph: String,
    pub badge: Arc<RgbaImage>,
    pub position: Vec3,
    pub scale: f32,
    pub visible: bool,
}

#[derive(Debug, Default)]
pub struct OverlayNodeSet {
    pub pins: Vec<PinNode>,
    pub arcs: Vec<ArcNode>,
    pub markers: Vec<MarkerNode>,
}

impl OverlayNodeSet {
    pub fn handles(&self) -> Vec<NodeHandle> {
        self.pins
            .iter()
            .map(|pin| pin.handle)
            .chain(self.arcs.iter().map(|arc| arc.handle))
            .chain(self.markers.iter().map(|marker| marker.handle))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.pins.len() + self.arcs.len() + self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn clear(&mut self) -> Vec<NodeHandle> {
        let removed = self.handles();
        self.pins.clear();
        self.arcs.clear();
        self.markers.clear();
        removed
    }
}

/// What a rebuild should produce.
#[derive(Debug, Clone, Default)]
pub struct OverlayLayout<'a> {
    pub pins: Vec<&'a Contact>,
    pub arc: Option<Vec<Vec3>>,
    pub markers: Vec<&'a Contact>,
    pub scale: f32,
}

#[derive(Debug)]
pub struct OverlayManager {
    config: OverlayConfig,
    marker_radius: f32,
    globe_radius: f32,

    last: Option<OverlaySignature>,
    nodes: OverlayNodeSet,
    badges: BadgeCache,
    rebuilds: usize,
}

impl OverlayManager {
    pub fn new(config: &OverlayConfig, surface: &SurfaceConfig) -> Self {
        Self {
            config: config.clone(),
            marker_radius: surface.marker_radius,
            globe_radius: surface.globe_radius,

            last: None,
            nodes: OverlayNodeSet::default(),
            badges: BadgeCache::new(config.badge_size),
            rebuilds: 0,
        }
    }

    /// True, and remembers `signature`, when it differs from the last one seen.
    pub fn should_rebuild(&mut self, signature: &OverlaySignature) -> bool {
        if self.last.as_ref() == Some(signature) {
            return false;
        }

        self.last = Some(signature.clone());
        true
    }

    /// Forget the last signature so the next check rebuilds.
    pub fn invalidate(&mut self) {
        self.last = None;
    }

    /// Replace every overlay node. Returns the handles that went away.
    pub fn rebuild(
        &mut self,
        layout: &OverlayLayout<'_>,
        handles: &mut HandleAllocator,
    ) -> Vec<NodeHandle> {
        let removed = self.nodes.clear();
        self.rebuilds += 1;

        for contact in &layout.pins {
            self.nodes.pins.push(PinNode {
                handle: handles.allocate(),
                contact_id: contact.id.clone(),
                position: surface_position(contact.location, self.marker_radius),
            });
        }

        if let Some(points) = &layout.arc {
            self.nodes.arcs.push(ArcNode {
                handle: handles.allocate(),
                points: points.clone(),
            });
        }

        for contact in &layout.markers {
            self.nodes.markers.push(MarkerNode {
                handle: handles.allocate(),
                contact_id: contact.id.clone(),
                glyph: contact.avatar.clone(),
                badge: self.badges.badge(&contact.avatar),
                position: surface_position(contact.location, self.marker_radius),
                scale: layout.scale,
                visible: false,
            });
        }

        log::debug!(
            "Rebuilt overlay: {} pins, {} arcs, {} markers ({} removed)",
            self.nodes.pins.len(),
            self.nodes.arcs.len(),
            self.nodes.markers.len(),
            removed.len()
        );

        removed
    }

    /// Rebuild if `signature` changed; the layout is only computed then.
    pub fn sync<'a>(
        &mut self,
        signature: &OverlaySignature,
        handles: &mut HandleAllocator,
        layout: impl FnOnce() -> OverlayLayout<'a>,
    ) -> Option<Vec<NodeHandle>> {
        if !self.should_rebuild(signature) {
            return None;
        }

        Some(self.rebuild(&layout(), handles))
    }

    /// Refresh every marker's visibility flag for this frame's camera.
    /// Returns the number of visible markers.
    pub fn update_visibility(&mut self, camera: &Camera, projection: &Projection) -> usize {
        let mut visible = 0;

        for marker in &mut self.nodes.markers {
            marker.visible = is_front_facing(camera, projection, marker.position, self.globe_radius);
            visible += usize::from(marker.visible);
        }

        visible
    }

    pub fn visibility(&self) -> Vec<(NodeHandle, bool)> {
        self.nodes
            .markers
            .iter()
            .map(|marker| (marker.handle, marker.visible))
            .collect()
    }

    pub fn nodes(&self) -> &OverlayNodeSet {
        &self.nodes
    }

    pub fn badges(&self) -> &BadgeCache {
        &self.badges
    }

    pub fn rebuilds(&self) -> usize {
        self.rebuilds
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }
}

/// Scale of the pins' glow halo at `time`: 1 up to the peak and back, once
/// per period each way.
pub fn pin_glow_scale(config: &OverlayConfig, time: Duration) -> f32 {
    let period = config.pin_glow_period_seconds;
    let phase = (time.as_secs_f32() / period) % 2.;
    let rising = if phase <= 1. { phase } else { 2. - phase };

    1. + (config.pin_glow_peak_scale - 1.) * rising
}

/// Whether a point in the globe's frame is on the camera's side of a sphere
/// of `radius` and inside the clip range.
///
/// The point is projected through the camera; it is visible when its depth
/// lies between the near plane and the depth of the sphere's horizon plane.
pub fn is_front_facing(camera: &Camera, projection: &Projection, local: Vec3, radius: f32) -> bool {
    let world = camera.to_world(local);
    let depth = projection.project(camera, world).z;

    let horizon = Vec3::Z * camera.horizon_z(radius);
    let horizon_depth = projection.project(camera, horizon).z;

    (0. ..=1.).contains(&depth) && depth <= horizon_depth
}
