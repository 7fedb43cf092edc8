//! Marker attributes
//!
//! The two attributes recognized by fully qualified name. Their presence is
//! the only external input driving discovery.

/// Fully qualified name of the interface-role marker.
pub const MIRRORED_FQN: &str = "mirror.runtime.Mirrored";

/// Fully qualified name of the specification-role marker.
pub const MIRROR_SPEC_FQN: &str = "mirror.runtime.MirrorSpec";

/// The recognized marker attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// Marks an interface that receives a synthesized mutable projection.
    Mirrored,
    /// Marks the immutable specification record nested under a marked
    /// interface.
    Spec,
}

impl Marker {
    /// The marker's fully qualified name.
    pub fn fqn(self) -> &'static str {
        match self {
            Marker::Mirrored => MIRRORED_FQN,
            Marker::Spec => MIRROR_SPEC_FQN,
        }
    }

    /// Recognize a marker from a fully qualified name.
    pub fn from_fqn(fqn: &str) -> Option<Marker> {
        match fqn {
            MIRRORED_FQN => Some(Marker::Mirrored),
            MIRROR_SPEC_FQN => Some(Marker::Spec),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fqn_round_trip() {
        assert_eq!(Marker::from_fqn(Marker::Mirrored.fqn()), Some(Marker::Mirrored));
        assert_eq!(Marker::from_fqn(Marker::Spec.fqn()), Some(Marker::Spec));
        assert_eq!(Marker::from_fqn("other.Attr"), None);
    }
}
