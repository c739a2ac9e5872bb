//! Proximity bands used by the guide's treasure hints.

/// How far the player is from the nearest uncollected treasure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HintBand {
    Adjacent,
    Near,
    Medium,
    Far,
    /// No treasure box is left on the map.
    Nothing,
}

impl HintBand {
    /// Classifies a Manhattan distance; `None` means no treasure remains.
    pub fn classify(distance: Option<u32>) -> Self {
        match distance {
            None => HintBand::Nothing,
            Some(0..=1) => HintBand::Adjacent,
            Some(2..=3) => HintBand::Near,
            Some(4..=6) => HintBand::Medium,
            Some(_) => HintBand::Far,
        }
    }

    pub const fn text(self) -> &'static str {
        match self {
            HintBand::Adjacent => "HOT! (treasure right next to you!)",
            HintBand::Near => "HOT",
            HintBand::Medium => "WARM",
            HintBand::Far => "COLD",
            HintBand::Nothing => "COLD (no treasure left)",
        }
    }
}
