use crate::coords::{Vec2, Vec3};
use crate::resource::{CullFace, DrawCheckMargins, ResourceId, UniformValue};

/// One recorded engine call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreatePlane { id: ResourceId, mount: String },
    CreateTarget { id: ResourceId, depth: bool },
    CreatePass { id: ResourceId, target: Option<ResourceId> },

    SetAlwaysDraw { id: ResourceId, value: bool },
    SetCullFace { id: ResourceId, value: CullFace },
    SetDrawCheckMargins { id: ResourceId, value: DrawCheckMargins },
    SetVisible { id: ResourceId, value: bool },
    SetWatchScroll { id: ResourceId, value: bool },
    EnableDepthTest { id: ResourceId, enabled: bool },

    SetRenderTarget { id: ResourceId, target: Option<ResourceId> },
    SetRenderOrder { id: ResourceId, order: i32 },

    SetRelativeTranslation { id: ResourceId, value: Vec3 },
    SetRotation { id: ResourceId, value: Vec3 },
    SetScale { id: ResourceId, value: Vec2 },
    SetTransformOrigin { id: ResourceId, value: Vec3 },
    SetPerspective { id: ResourceId, fov: f32 },
    SetUniform { id: ResourceId, name: String, value: UniformValue },

    Remove { id: ResourceId },
}

impl Call {
    /// The resource the call was made on (or created).
    pub fn id(&self) -> ResourceId {
        match self {
            Call::CreatePlane { id, .. }
            | Call::CreateTarget { id, .. }
            | Call::CreatePass { id, .. }
            | Call::SetAlwaysDraw { id, .. }
            | Call::SetCullFace { id, .. }
            | Call::SetDrawCheckMargins { id, .. }
            | Call::SetVisible { id, .. }
            | Call::SetWatchScroll { id, .. }
            | Call::EnableDepthTest { id, .. }
            | Call::SetRenderTarget { id, .. }
            | Call::SetRenderOrder { id, .. }
            | Call::SetRelativeTranslation { id, .. }
            | Call::SetRotation { id, .. }
            | Call::SetScale { id, .. }
            | Call::SetTransformOrigin { id, .. }
            | Call::SetPerspective { id, .. }
            | Call::SetUniform { id, .. }
            | Call::Remove { id } => *id,
        }
    }
}
