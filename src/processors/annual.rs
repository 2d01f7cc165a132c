//! Annual reduction of the 16 zonal series, plus the alternate global and
//! hemispheric estimators.

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};
use crate::models::{Parameters, RunMetadata, ZoneSeries};
use crate::utils::constants::{valid, MISSING};

/// Which alternate global-mean blend to compute, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlobalMode {
    Disabled,
    /// Blend of the three compound belt zones (southern belt twice).
    Variant1,
    /// Blend of the outer belts with the two tropical bands.
    #[default]
    Variant2,
}

/// Configuration for the alternate estimators.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AlternateConfig {
    pub global_mode: GlobalMode,
    pub hemispheric: bool,
}

impl Default for AlternateConfig {
    fn default() -> Self {
        Self {
            global_mode: GlobalMode::default(),
            hemispheric: true,
        }
    }
}

/// Output of the annual reduction: per-zone monthly, weight and annual
/// arrays, the metadata threaded through the pipeline, and the
/// minimum-valid-months threshold the annual means were computed with.
#[derive(Debug, Clone)]
pub struct ZonalAnnual {
    pub meta: RunMetadata,
    /// 16 zones x monm months.
    pub monthly: Vec<Vec<f64>>,
    /// 16 zones x monm month weights.
    pub weights: Vec<Vec<f64>>,
    /// 16 zones x years.
    pub annual: Vec<Vec<f64>>,
    pub min_months: usize,
}

const ZONE_COUNT: usize = 16;
const GLOBAL: usize = 15;
const BLEND_WEIGHTS: [f64; 4] = [3.0, 2.0, 2.0, 3.0];

/// Reduce the 16 zonal series to annual means and apply the configured
/// alternate estimators.
///
/// A year's annual mean is the mean of its valid months, only when at least
/// `zone_annual_min_months` of them are valid. The alternate global mean
/// replaces zone 15 with a weighted blend of 4 zone picks; the alternate
/// hemispheric means replace zones 11 and 12 with `0.4 x tropical band +
/// 0.6 x extratropical compound`. Blends are all-or-nothing: any missing
/// input makes the blended value missing for that year or month.
pub fn annzon(
    meta: &RunMetadata,
    zones: &[ZoneSeries],
    alternate: &AlternateConfig,
    params: &Parameters,
) -> Result<ZonalAnnual> {
    if zones.len() != ZONE_COUNT {
        return Err(AnalysisError::GeometryMismatch {
            expected: format!("{} zonal series", ZONE_COUNT),
            found: format!("{}", zones.len()),
        });
    }
    let monm = meta.monm;
    let years = monm / 12;
    for (i, zone) in zones.iter().enumerate() {
        if zone.series.len() != monm {
            return Err(AnalysisError::InvalidFormat(format!(
                "zone {} has {} months, expected {}",
                i,
                zone.series.len(),
                monm
            )));
        }
    }

    let mut monthly: Vec<Vec<f64>> = zones.iter().map(|z| z.series.clone()).collect();
    let weights: Vec<Vec<f64>> = zones.iter().map(|z| z.weight.clone()).collect();
    let mut annual = vec![vec![MISSING; years]; ZONE_COUNT];

    for zone in 0..ZONE_COUNT {
        for year in 0..years {
            let mut sum = 0.0;
            let mut months = 0usize;
            for m in 0..12 {
                let v = monthly[zone][year * 12 + m];
                if valid(v) {
                    months += 1;
                    sum += v;
                }
            }
            if months >= params.zone_annual_min_months {
                annual[zone][year] = sum / months as f64;
            }
        }
    }

    let picks = match alternate.global_mode {
        GlobalMode::Disabled => None,
        GlobalMode::Variant1 => Some([8usize, 9, 9, 10]),
        GlobalMode::Variant2 => Some([8usize, 3, 4, 10]),
    };
    if let Some(picks) = picks {
        for year in 0..years {
            let blended = blend(&picks, |z| annual[z][year]);
            annual[GLOBAL][year] = blended;
        }
        for i in 0..monm {
            let blended = blend(&picks, |z| monthly[z][i]);
            monthly[GLOBAL][i] = blended;
        }
    }

    if alternate.hemispheric {
        // Northern: 0.4 x (EQU-24N band) + 0.6 x (24N-90N compound);
        // southern: the mirrored pair.
        for hemisphere in 0..2 {
            let target = 11 + hemisphere;
            let band = 3 + hemisphere;
            let compound = 8 + 2 * hemisphere;
            for year in 0..years {
                annual[target][year] = hemi_blend(annual[band][year], annual[compound][year]);
            }
            for i in 0..monm {
                monthly[target][i] = hemi_blend(monthly[band][i], monthly[compound][i]);
            }
        }
    }

    Ok(ZonalAnnual {
        meta: meta.clone(),
        monthly,
        weights,
        annual,
        min_months: params.zone_annual_min_months,
    })
}

/// Weighted blend over 4 zone picks; MISSING unless every input is valid.
fn blend(picks: &[usize; 4], value: impl Fn(usize) -> f64) -> f64 {
    let mut total = 0.0;
    let mut all_valid = true;
    for (&zone, &w) in picks.iter().zip(BLEND_WEIGHTS.iter()) {
        let v = value(zone);
        if !valid(v) {
            all_valid = false;
            break;
        }
        total += v * w;
    }
    if all_valid {
        0.1 * total
    } else {
        MISSING
    }
}

fn hemi_blend(band: f64, compound: f64) -> f64 {
    if valid(band) && valid(compound) {
        0.4 * band + 0.6 * compound
    } else {
        MISSING
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AnalysisMode;

    fn meta(monm: usize) -> RunMetadata {
        RunMetadata::new("test".into(), AnalysisMode::Land, 1880, monm, 1200.0)
    }

    fn constant_zone(monm: usize, value: f64) -> ZoneSeries {
        ZoneSeries {
            series: vec![value; monm],
            weight: vec![1.0; monm],
        }
    }

    fn sixteen_zones(monm: usize) -> Vec<ZoneSeries> {
        (0..16).map(|z| constant_zone(monm, z as f64 * 0.1)).collect()
    }

    #[test]
    fn test_annual_mean_of_constant_series() {
        let monm = 24;
        let result = annzon(
            &meta(monm),
            &sixteen_zones(monm),
            &AlternateConfig {
                global_mode: GlobalMode::Disabled,
                hemispheric: false,
            },
            &Parameters::default(),
        )
        .unwrap();

        assert_eq!(result.annual[0].len(), 2);
        assert!((result.annual[3][0] - 0.3).abs() < 1e-9);
        assert!((result.annual[3][1] - 0.3).abs() < 1e-9);
        assert_eq!(result.min_months, 6);
    }

    #[test]
    fn test_annual_threshold_boundary() {
        let monm = 12;
        let params = Parameters::default();
        let mut zones = sixteen_zones(monm);

        // Exactly min_months - 1 valid months: MISSING.
        let mut series = vec![MISSING; monm];
        for m in 0..params.zone_annual_min_months - 1 {
            series[m] = 1.0;
        }
        zones[0] = ZoneSeries {
            series: series.clone(),
            weight: vec![1.0; monm],
        };
        // Exactly min_months valid months: computed.
        series[params.zone_annual_min_months - 1] = 1.0;
        zones[1] = ZoneSeries {
            series,
            weight: vec![1.0; monm],
        };

        let result = annzon(
            &meta(monm),
            &zones,
            &AlternateConfig {
                global_mode: GlobalMode::Disabled,
                hemispheric: false,
            },
            &params,
        )
        .unwrap();

        assert_eq!(result.annual[0][0], MISSING);
        assert!((result.annual[1][0] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_alternate_global_blend() {
        let monm = 12;
        let result = annzon(
            &meta(monm),
            &sixteen_zones(monm),
            &AlternateConfig {
                global_mode: GlobalMode::Variant2,
                hemispheric: false,
            },
            &Parameters::default(),
        )
        .unwrap();

        // Zones 8, 3, 4, 10 at values 0.8, 0.3, 0.4, 1.0 with weights
        // 3,2,2,3 and scale 0.1.
        let expected = 0.1 * (3.0 * 0.8 + 2.0 * 0.3 + 2.0 * 0.4 + 3.0 * 1.0);
        assert!((result.annual[15][0] - expected).abs() < 1e-9);
        assert!((result.monthly[15][5] - expected).abs() < 1e-9);
    }

    #[test]
    fn test_alternate_global_missing_input_propagates() {
        let monm = 12;
        let mut zones = sixteen_zones(monm);
        // Zone 4 contributes to the Variant2 blend; empty it.
        zones[4] = ZoneSeries {
            series: vec![MISSING; monm],
            weight: vec![0.0; monm],
        };

        let result = annzon(
            &meta(monm),
            &zones,
            &AlternateConfig {
                global_mode: GlobalMode::Variant2,
                hemispheric: false,
            },
            &Parameters::default(),
        )
        .unwrap();

        assert_eq!(result.annual[15][0], MISSING);
        assert!(result.monthly[15].iter().all(|&v| v == MISSING));
    }

    #[test]
    fn test_alternate_hemispheric_blend() {
        let monm = 12;
        let result = annzon(
            &meta(monm),
            &sixteen_zones(monm),
            &AlternateConfig {
                global_mode: GlobalMode::Disabled,
                hemispheric: true,
            },
            &Parameters::default(),
        )
        .unwrap();

        // Northern: 0.4 x zone3 + 0.6 x zone8.
        let expected_n = 0.4 * 0.3 + 0.6 * 0.8;
        // Southern: 0.4 x zone4 + 0.6 x zone10.
        let expected_s = 0.4 * 0.4 + 0.6 * 1.0;
        assert!((result.annual[11][0] - expected_n).abs() < 1e-9);
        assert!((result.annual[12][0] - expected_s).abs() < 1e-9);
        assert!((result.monthly[11][0] - expected_n).abs() < 1e-9);
    }

    #[test]
    fn test_wrong_zone_count_rejected() {
        let result = annzon(
            &meta(12),
            &sixteen_zones(12)[..8],
            &AlternateConfig::default(),
            &Parameters::default(),
        );
        assert!(result.is_err());
    }
}
