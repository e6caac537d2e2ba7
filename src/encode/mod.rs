/// Canonical-resolution PNG export and the encoded-image wire form.
pub mod export;
/// Outbound persistence contract.
pub mod sink;
