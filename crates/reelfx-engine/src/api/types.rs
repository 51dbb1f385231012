use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Owns everything one trigger created: timers, overlay nodes, particles,
/// reel motion. Disposing the handle releases all of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EffectHandle(pub u32);

/// Win-size category selecting a bundle of celebration parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Small,
    Big,
    Mega,
    Super,
}

impl Tier {
    pub const ALL: [Tier; 4] = [Tier::Small, Tier::Big, Tier::Mega, Tier::Super];

    /// Index-based lookup for the host bridge (0 = small).
    pub fn from_index(index: u32) -> Option<Tier> {
        Self::ALL.get(index as usize).copied()
    }
}

/// Scripted outcome of a preview spin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultType {
    Lose,
    SmallWin,
    BigWin,
    MegaWin,
    SuperWin,
}

impl ResultType {
    pub const ALL: [ResultType; 5] = [
        ResultType::Lose,
        ResultType::SmallWin,
        ResultType::BigWin,
        ResultType::MegaWin,
        ResultType::SuperWin,
    ];

    pub fn from_index(index: u32) -> Option<ResultType> {
        Self::ALL.get(index as usize).copied()
    }

    /// Celebration tier a win of this kind plays, if any.
    pub fn tier(self) -> Option<Tier> {
        match self {
            ResultType::Lose => None,
            ResultType::SmallWin => Some(Tier::Small),
            ResultType::BigWin => Some(Tier::Big),
            ResultType::MegaWin => Some(Tier::Mega),
            ResultType::SuperWin => Some(Tier::Super),
        }
    }
}

/// Standalone win effects that can be previewed on the winning symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WinAnimationKind {
    /// Orbiting sparkles, glow and frame on each winning symbol.
    Highlight,
    /// Bolts jumping between winning symbols.
    Lightning,
    /// A fountain burst from the grid's bottom edge.
    Fountain,
}

impl WinAnimationKind {
    pub const ALL: [WinAnimationKind; 3] = [
        WinAnimationKind::Highlight,
        WinAnimationKind::Lightning,
        WinAnimationKind::Fountain,
    ];

    pub fn from_index(index: u32) -> Option<WinAnimationKind> {
        Self::ALL.get(index as usize).copied()
    }
}

/// A sound cue for the host audio layer.
/// The numeric value maps to a cue defined in the editor's audio settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(transparent)]
pub struct SoundEvent(pub u32);

/// Notification for the host, 4 floats on the wire: `kind`, then payload.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct PreviewEvent {
    pub kind: f32,
    pub a: f32,
    pub b: f32,
    pub c: f32,
}

impl PreviewEvent {
    pub const FLOATS: usize = 4;

    /// An effect reached its deadline (a = handle).
    pub const EFFECT_FINISHED: f32 = 1.0;
    /// One reel settled (a = handle, b = reel index).
    pub const REEL_SETTLED: f32 = 2.0;
    /// Every reel of a spin settled (a = handle, b = reel count).
    pub const SPIN_COMPLETE: f32 = 3.0;
    /// An effect was disposed before finishing (a = handle).
    pub const EFFECT_CANCELLED: f32 = 4.0;

    pub fn effect_finished(handle: EffectHandle) -> Self {
        Self { kind: Self::EFFECT_FINISHED, a: handle.0 as f32, ..Default::default() }
    }

    pub fn reel_settled(handle: EffectHandle, reel: usize) -> Self {
        Self { kind: Self::REEL_SETTLED, a: handle.0 as f32, b: reel as f32, c: 0.0 }
    }

    pub fn spin_complete(handle: EffectHandle, reels: usize) -> Self {
        Self { kind: Self::SPIN_COMPLETE, a: handle.0 as f32, b: reels as f32, c: 0.0 }
    }

    pub fn effect_cancelled(handle: EffectHandle) -> Self {
        Self { kind: Self::EFFECT_CANCELLED, a: handle.0 as f32, ..Default::default() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_event_is_four_floats() {
        assert_eq!(std::mem::size_of::<PreviewEvent>(), PreviewEvent::FLOATS * 4);
        let ev = PreviewEvent::reel_settled(EffectHandle(7), 3);
        let floats: &[f32] = bytemuck::cast_slice(std::slice::from_ref(&ev));
        assert_eq!(floats, &[PreviewEvent::REEL_SETTLED, 7.0, 3.0, 0.0]);
    }

    #[test]
    fn index_lookups() {
        assert_eq!(Tier::from_index(2), Some(Tier::Mega));
        assert_eq!(Tier::from_index(9), None);
        assert_eq!(ResultType::from_index(0), Some(ResultType::Lose));
        assert_eq!(WinAnimationKind::from_index(1), Some(WinAnimationKind::Lightning));
    }

    #[test]
    fn result_tiers() {
        assert_eq!(ResultType::Lose.tier(), None);
        assert_eq!(ResultType::SuperWin.tier(), Some(Tier::Super));
    }
}
