//! Capture session: the per-tick state machine and a simple host loop.

/// Tick-driven capture sequencer.
pub mod sequencer;
