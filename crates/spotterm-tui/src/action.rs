//! Commands: what the user asked for, before it is applied or sent.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    TogglePlayPause,
    Next,
    Previous,
    /// Relative volume change in percent.
    VolumeDelta(i8),
    ToggleShuffle,
    CycleRepeat,
    /// Relative seek in seconds.
    Seek(i32),
    Quit,
}
