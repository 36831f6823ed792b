//! Vibration feature catalogue.
//!
//! Every bearing is described by the same 26 features, always stored in the
//! order of [`Feature::ALL`]. The names returned by [`Feature::name`] are the
//! column names the degradation and RUL models were trained on, so they double
//! as model file names in `predictors::linear`.

use serde::{Deserialize, Serialize};

/// Number of vibration features per bearing.
pub const NUM_FEATURES: usize = 26;

/// One vibration feature of a bearing.
///
/// Groups:
/// - 0-8: time-domain statistics
/// - 9-10: dominant frequency location and magnitude
/// - 11-17: frequency-band energies
/// - 18-25: bearing fault frequency energies (BPFO, BPFI, BSF, FTF and harmonics)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Feature {
    Rms,
    Peak,
    CrestFactor,
    Kurtosis,
    Skewness,
    StdDev,
    PeakToPeak,
    Mean,
    Variance,
    DominantFrequencyHz,
    DominantFrequencyMag,
    Energy0To500Hz,
    Energy500To1000Hz,
    Energy1000To2000Hz,
    Energy2000To4000Hz,
    Energy4000To6000Hz,
    Energy6000To8000Hz,
    Energy8000To10240Hz,
    EnergyBpfo,
    EnergyBpfi,
    EnergyBsf,
    EnergyFtf,
    EnergyBpfo2x,
    EnergyBpfi2x,
    EnergyBpfo3x,
    EnergyBpfi3x,
}

impl Feature {
    /// All features in storage order.
    pub const ALL: [Self; NUM_FEATURES] = [
        Self::Rms,
        Self::Peak,
        Self::CrestFactor,
        Self::Kurtosis,
        Self::Skewness,
        Self::StdDev,
        Self::PeakToPeak,
        Self::Mean,
        Self::Variance,
        Self::DominantFrequencyHz,
        Self::DominantFrequencyMag,
        Self::Energy0To500Hz,
        Self::Energy500To1000Hz,
        Self::Energy1000To2000Hz,
        Self::Energy2000To4000Hz,
        Self::Energy4000To6000Hz,
        Self::Energy6000To8000Hz,
        Self::Energy8000To10240Hz,
        Self::EnergyBpfo,
        Self::EnergyBpfi,
        Self::EnergyBsf,
        Self::EnergyFtf,
        Self::EnergyBpfo2x,
        Self::EnergyBpfi2x,
        Self::EnergyBpfo3x,
        Self::EnergyBpfi3x,
    ];

    /// Position of this feature in a feature vector.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Model / column name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Rms => "RMS",
            Self::Peak => "Peak",
            Self::CrestFactor => "CrestFactor",
            Self::Kurtosis => "Kurtosis",
            Self::Skewness => "Skewness",
            Self::StdDev => "StdDev",
            Self::PeakToPeak => "PeakToPeak",
            Self::Mean => "Mean",
            Self::Variance => "Variance",
            Self::DominantFrequencyHz => "DominantFreq_Hz",
            Self::DominantFrequencyMag => "DominantFreq_Mag",
            Self::Energy0To500Hz => "Energy_0_500Hz",
            Self::Energy500To1000Hz => "Energy_500_1000Hz",
            Self::Energy1000To2000Hz => "Energy_1000_2000Hz",
            Self::Energy2000To4000Hz => "Energy_2000_4000Hz",
            Self::Energy4000To6000Hz => "Energy_4000_6000Hz",
            Self::Energy6000To8000Hz => "Energy_6000_8000Hz",
            Self::Energy8000To10240Hz => "Energy_8000_10240Hz",
            Self::EnergyBpfo => "Energy_BPFO",
            Self::EnergyBpfi => "Energy_BPFI",
            Self::EnergyBsf => "Energy_BSF",
            Self::EnergyFtf => "Energy_FTF",
            Self::EnergyBpfo2x => "Energy_BPFO_2x",
            Self::EnergyBpfi2x => "Energy_BPFI_2x",
            Self::EnergyBpfo3x => "Energy_BPFO_3x",
            Self::EnergyBpfi3x => "Energy_BPFI_3x",
        }
    }

    /// Parse a model / column name. Case-sensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    pub const fn group(self) -> FeatureGroup {
        match self.index() {
            0..=8 => FeatureGroup::Statistical,
            9..=10 => FeatureGroup::FrequencyDomain,
            11..=17 => FeatureGroup::EnergyBands,
            _ => FeatureGroup::FaultFrequencies,
        }
    }
}

/// Display grouping of the feature catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureGroup {
    Statistical,
    FrequencyDomain,
    EnergyBands,
    FaultFrequencies,
}

impl std::fmt::Display for FeatureGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeatureGroup::Statistical => write!(f, "Statistical Features"),
            FeatureGroup::FrequencyDomain => write!(f, "Frequency Domain"),
            FeatureGroup::EnergyBands => write!(f, "Energy Bands"),
            FeatureGroup::FaultFrequencies => write!(f, "Bearing Fault Frequencies"),
        }
    }
}

impl std::fmt::Display for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_is_in_index_order() {
        for (i, feature) in Feature::ALL.iter().enumerate() {
            assert_eq!(feature.index(), i, "{feature} out of order");
        }
    }

    #[test]
    fn names_round_trip() {
        for feature in Feature::ALL {
            assert_eq!(Feature::from_name(feature.name()), Some(feature));
        }
        assert_eq!(Feature::from_name("rms"), None);
        assert_eq!(Feature::from_name("Revolutions"), None);
    }

    #[test]
    fn groups_partition_the_catalogue() {
        let count = |group| Feature::ALL.into_iter().filter(|f| f.group() == group).count();
        assert_eq!(count(FeatureGroup::Statistical), 9);
        assert_eq!(count(FeatureGroup::FrequencyDomain), 2);
        assert_eq!(count(FeatureGroup::EnergyBands), 7);
        assert_eq!(count(FeatureGroup::FaultFrequencies), 8);
        assert_eq!(Feature::EnergyBpfo.group(), FeatureGroup::FaultFrequencies);
        assert_eq!(Feature::Energy8000To10240Hz.group(), FeatureGroup::EnergyBands);
    }
}
