//! Projection seam: decode and fold supplied by typed registries.

use crate::entry::RegistryEntry;

/// Outcome of decoding one raw message body.
#[derive(Debug)]
pub enum DecodeOutcome<T> {
    /// Tag and shape matched; the payload enters the cache and the fold.
    Accepted(T),
    /// Different protocol's traffic; skipped without a trace in state.
    Foreign,
    /// Our tag, unusable body; logged and skipped.
    Invalid(String),
}

/// Typed view over one topic's entry stream.
///
/// A projection supplies the two domain-specific pieces of a registry: how
/// to decode raw message bodies, and how to fold accepted entries into
/// state (a secondary index, an assembly document). The registry applies
/// the fold strictly in log order, on both the incremental sync path and
/// full replay; implementations must keep `fold` pure with respect to
/// entry order alone.
pub trait Projection: Send + Sync {
    type Payload: Clone + Send + Sync;

    fn decode(&self, raw: &[u8]) -> DecodeOutcome<Self::Payload>;

    fn fold(&mut self, entry: &RegistryEntry<Self::Payload>);

    /// Return projection state to its initial value (cache clear, replay).
    fn reset(&mut self);
}
