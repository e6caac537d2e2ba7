//! Tooth addressing for the dental chart.
//!
//! A chart row is an arch (`top` or `bottom`) of sixteen sections read left to right from the
//! examiner's point of view. Each section holds one FDI-numbered tooth; annotations are keyed by
//! section, not by tooth number.

use crate::foundation::error::{AnnotateError, AnnotateResult};

/// Teeth per arch.
pub const ARCH_LEN: usize = 16;

/// FDI numbers of the upper arch, by section index.
pub const TOP_ARCH: [u8; ARCH_LEN] = [
    18, 17, 16, 15, 14, 13, 12, 11, 21, 22, 23, 24, 25, 26, 27, 28,
];

/// FDI numbers of the lower arch, by section index.
pub const BOTTOM_ARCH: [u8; ARCH_LEN] = [
    48, 47, 46, 45, 44, 43, 42, 41, 31, 32, 33, 34, 35, 36, 37, 38,
];

/// Chart row.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ArchPosition {
    /// Maxillary arch.
    Top,
    /// Mandibular arch.
    Bottom,
}

impl ArchPosition {
    /// Key prefix.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
        }
    }

    fn teeth(self) -> &'static [u8; ARCH_LEN] {
        match self {
            Self::Top => &TOP_ARCH,
            Self::Bottom => &BOTTOM_ARCH,
        }
    }
}

/// One cell of the chart.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ToothSection {
    /// Arch.
    pub position: ArchPosition,
    /// Index within the arch, `0..16`.
    pub index: usize,
}

impl ToothSection {
    pub fn new(position: ArchPosition, index: usize) -> AnnotateResult<Self> {
        if index >= ARCH_LEN {
            return Err(AnnotateError::validation(format!(
                "section index {index} out of range 0..{ARCH_LEN}"
            )));
        }
        Ok(Self { position, index })
    }

    /// Section holding an FDI-numbered tooth.
    pub fn from_tooth_number(number: u8) -> Option<Self> {
        [ArchPosition::Top, ArchPosition::Bottom]
            .into_iter()
            .find_map(|position| {
                position
                    .teeth()
                    .iter()
                    .position(|&n| n == number)
                    .map(|index| Self { position, index })
            })
    }

    /// FDI number of the tooth in this section.
    pub fn tooth_number(self) -> u8 {
        self.position.teeth()[self.index.min(ARCH_LEN - 1)]
    }

    /// Key under which this section's annotation is stored.
    pub fn entity_key(self) -> EntityKey {
        EntityKey(format!("{}-{}", self.position.as_str(), self.index))
    }

    /// Reference of the tooth's base illustration, resolved by an image source.
    pub fn base_image_ref(self) -> String {
        format!("teeth-image/{}.png", self.tooth_number())
    }
}

/// Stable identity of an annotated structure.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct EntityKey(String);

impl EntityKey {
    /// Arbitrary key; hosts outside the dental chart may use their own scheme.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Key of a chart section.
    pub fn section(position: ArchPosition, index: usize) -> AnnotateResult<Self> {
        Ok(ToothSection::new(position, index)?.entity_key())
    }

    /// Key of the section holding an FDI-numbered tooth.
    pub fn tooth(number: u8) -> AnnotateResult<Self> {
        ToothSection::from_tooth_number(number)
            .map(ToothSection::entity_key)
            .ok_or_else(|| AnnotateError::validation(format!("unknown FDI tooth number {number}")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Chart section this key addresses, when it follows the `{arch}-{index}` form.
    pub fn to_section(&self) -> Option<ToothSection> {
        let (arch, index) = self.0.split_once('-')?;
        let position = match arch {
            "top" => ArchPosition::Top,
            "bottom" => ArchPosition::Bottom,
            _ => return None,
        };
        ToothSection::new(position, index.parse().ok()?).ok()
    }
}

impl std::fmt::Display for EntityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/chart/tooth.rs"]
mod tests;
