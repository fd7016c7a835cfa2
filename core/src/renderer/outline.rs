use crate::common::RgbaColor;
use crate::scene::{EntityId, MeshId, Scene, Transform};
use crate::selection::SelectionState;

/// The enlarged duplicate of the selected entity drawn by the stencil write pass.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OutlineInstance {
    pub entity: EntityId,
    pub mesh: MeshId,
    /// The entity's transform with its scale multiplied by the outline factor.
    pub transform: Transform,
    pub color: RgbaColor,
}

/// Holds at most one [`OutlineInstance`] and keeps it in step with the
/// selection.
///
/// The instance is updated in place every frame. Its geometry binding only
/// changes when the selected entity uses a different mesh; `allocations`
/// counts those rebinds.
#[derive(Debug, Default)]
pub struct OutlineSlot {
    instance: Option<OutlineInstance>,
    allocations: u32,
}

impl OutlineSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn instance(&self) -> Option<&OutlineInstance> {
        self.instance.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.instance.is_none()
    }

    /// Number of times geometry has been bound to the slot.
    pub fn allocations(&self) -> u32 {
        self.allocations
    }

    /// Brings the slot in line with `selection`. Returns the instance to draw,
    /// if any.
    ///
    /// An outlined selection whose entity no longer exists empties the slot.
    pub fn sync(&mut self, selection: &SelectionState, scene: &Scene) -> Option<&OutlineInstance> {
        let config = selection.config();
        let Some(entity) = selection.outlined().and_then(|id| scene.get_entity(id)) else {
            self.clear();
            return None;
        };

        let transform = entity.transform.scaled_by(config.outline_scale);
        match &mut self.instance {
            Some(instance) if instance.mesh == entity.mesh => {
                instance.entity = entity.id;
                instance.transform = transform;
                instance.color = config.outline_color;
            }
            slot => {
                self.allocations += 1;
                log::debug!(
                    "Outline slot bound to mesh {} of entity {}",
                    entity.mesh,
                    entity.id
                );
                *slot = Some(OutlineInstance {
                    entity: entity.id,
                    mesh: entity.mesh,
                    transform,
                    color: config.outline_color,
                });
            }
        }
        self.instance.as_ref()
    }

    pub fn clear(&mut self) {
        if let Some(instance) = self.instance.take() {
            log::debug!("Outline slot released from entity {}", instance.entity);
        }
    }
}
