/// What happens to a fan-in's output channel once every upstream is drained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FanInPolicy {
    /// The output is never closed. The consumer must stop on its own, for
    /// example with a select deadline.
    Open,
    /// The output is closed after the last relay has forwarded its last value,
    /// so consumers can simply receive until the channel reports closed.
    #[default]
    CloseWhenDrained,
}
