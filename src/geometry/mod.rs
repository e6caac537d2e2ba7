/// Aspect-ratio-preserving canvas layout.
pub mod layout;
/// Pointer event shapes and client-to-logical mapping.
pub mod pointer;
