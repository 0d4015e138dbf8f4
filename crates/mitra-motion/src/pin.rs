//! Pin regions.
//!
//! A pinned binding reserves `distance` pixels of extra scroll after its
//! start. While the scroll offset is inside `[start, start + distance]` the
//! pinned element is held at a fixed viewport rectangle; outside it the
//! element returns to normal flow. Content below the pinned element is
//! pushed down by the reserved distance.
//!
//! Only one region may hold a given element at overlapping offsets.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{MotionError, Result};
use crate::host::Renderer;
use crate::types::{BindingHandle, Rect, TargetId};

/// Scroll distance reserved for one pinned element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PinRegion {
    pub target: TargetId,
    /// Scroll offset where pinning begins.
    pub start: f64,
    /// Reserved scroll distance.
    pub distance: f64,
    /// Document-space box of the element before pinning.
    pub original: Rect,
    /// Viewport rectangle the element is held at while pinned.
    pub placement: Rect,
    pub pinned: bool,
}

impl PinRegion {
    pub fn end(&self) -> f64 {
        self.start + self.distance
    }

    pub fn contains(&self, offset: f64) -> bool {
        offset >= self.start && offset <= self.end()
    }

    fn overlaps(&self, start: f64, distance: f64) -> bool {
        start <= self.end() && self.start <= start + distance
    }
}

/// Reason a region changed placement during `PinCoordinator::update`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinChange {
    Pinned(BindingHandle),
    Unpinned(BindingHandle),
}

/// Owns every pin region, keyed by the binding that requested it.
#[derive(Debug, Default)]
pub struct PinCoordinator {
    regions: BTreeMap<BindingHandle, PinRegion>,
}

impl PinCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve (or re-reserve) a region for `binding`.
    ///
    /// `shift` is the pin spacing above the element, so `placement` matches
    /// where the element actually sits when pinning starts. Re-reserving a
    /// region that is currently pinned moves the element to the new
    /// placement right away.
    #[allow(clippy::too_many_arguments)]
    pub fn reserve<R: Renderer + ?Sized>(
        &mut self,
        binding: BindingHandle,
        target: TargetId,
        start: f64,
        distance: f64,
        original: Rect,
        shift: f64,
        renderer: &mut R,
    ) -> Result<&PinRegion> {
        if let Some((&owner, _)) = self
            .regions
            .iter()
            .find(|&(&owner, r)| owner != binding && r.target == target && r.overlaps(start, distance))
        {
            return Err(MotionError::ConflictingPin { target, owner });
        }

        let previous = self
            .regions
            .get(&binding)
            .map(|r| (r.target.clone(), r.placement, r.pinned));
        let placement = Rect::new(original.x, original.y + shift - start, original.width, original.height);
        debug!(?binding, %target, start, distance, "reserved pin region");

        let mut pinned = false;
        if let Some((previous_target, previous_placement, true)) = previous {
            if previous_target != target {
                renderer.apply_fixed_placement(&previous_target, None)?;
            } else {
                pinned = true;
                if previous_placement != placement {
                    renderer.apply_fixed_placement(&target, Some(placement))?;
                    debug!(?binding, %target, "moved pinned element to new placement");
                }
            }
        }

        let region = PinRegion {
            target,
            start,
            distance,
            original,
            placement,
            pinned,
        };
        self.regions.insert(binding, region);
        Ok(&self.regions[&binding])
    }

    pub fn region(&self, binding: BindingHandle) -> Option<&PinRegion> {
        self.regions.get(&binding)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Apply or remove the fixed placement for one region at `offset`.
    pub fn update<R: Renderer + ?Sized>(
        &mut self,
        binding: BindingHandle,
        offset: f64,
        renderer: &mut R,
    ) -> Result<Option<PinChange>> {
        let Some(region) = self.regions.get_mut(&binding) else {
            return Ok(None);
        };

        let inside = region.contains(offset);
        if inside == region.pinned {
            return Ok(None);
        }

        if inside {
            renderer.apply_fixed_placement(&region.target, Some(region.placement))?;
        } else {
            renderer.apply_fixed_placement(&region.target, None)?;
        }
        region.pinned = inside;
        debug!(?binding, target = %region.target, pinned = inside, offset, "pin placement changed");

        Ok(Some(if inside {
            PinChange::Pinned(binding)
        } else {
            PinChange::Unpinned(binding)
        }))
    }

    /// Remove a region and return its element to normal flow.
    ///
    /// Placement is restored whether or not the element is currently
    /// pinned. The region is removed even if the renderer fails.
    pub fn release<R: Renderer + ?Sized>(
        &mut self,
        binding: BindingHandle,
        renderer: &mut R,
    ) -> Result<Option<PinRegion>> {
        let Some(region) = self.regions.remove(&binding) else {
            return Ok(None);
        };
        debug!(?binding, target = %region.target, "released pin region");
        renderer.apply_fixed_placement(&region.target, None)?;
        Ok(Some(region))
    }

    /// Total reserved scroll distance.
    pub fn reserved_space(&self) -> f64 {
        self.regions.values().map(|r| r.distance).sum()
    }

    /// Scrollable document height for `content_height` of unpinned content.
    pub fn document_height(&self, content_height: f64) -> f64 {
        content_height + self.reserved_space()
    }

    /// Pin spacing inserted above document offset `y`, ignoring `except`.
    ///
    /// A region counts when its element ends at or above `y`.
    pub fn spacing_before(&self, y: f64, except: Option<BindingHandle>) -> f64 {
        self.regions
            .iter()
            .filter(|&(&owner, r)| Some(owner) != except && r.original.bottom() <= y)
            .map(|(_, r)| r.distance)
            .sum()
    }
}
