use anchorview_core::{NodeId, TypeTag};

/// Failure while rendering one slot of a view.
///
/// Raised per slot; sibling slots of the same pass still render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The slot has no type and the view has no default renderer.
    Configuration { id: NodeId, index: usize },
    /// The slot's type has no entry in the renderer map.
    Lookup {
        id: NodeId,
        index: usize,
        type_tag: TypeTag,
    },
    /// A renderer or compositor reported a failure of its own.
    Failed { message: String },
}

impl RenderError {
    pub fn failed(message: impl Into<String>) -> Self {
        RenderError::Failed {
            message: message.into(),
        }
    }

    /// The type tag a lookup failed on, if any.
    pub fn missing_type(&self) -> Option<&TypeTag> {
        match self {
            RenderError::Lookup { type_tag, .. } => Some(type_tag),
            _ => None,
        }
    }
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderError::Configuration { id, index } => write!(
                f,
                "slot {index} of view `{id}` has no type and the view has no default renderer"
            ),
            RenderError::Lookup {
                id,
                index,
                type_tag,
            } => write!(
                f,
                "no renderer registered for type `{type_tag}` (slot {index} of view `{id}`)"
            ),
            RenderError::Failed { message } => write!(f, "render failed: {message}"),
        }
    }
}

impl std::error::Error for RenderError {}
