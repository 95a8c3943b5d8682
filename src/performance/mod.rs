//! Performance probing.
//!
//! Runs the mobile and desktop PageSpeed assessments concurrently and waits
//! for both to settle. One failed strategy leaves its slot empty; only when
//! both fail does the stage itself fail.

mod pagespeed;

use async_trait::async_trait;
use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, EnumIter};

use crate::error_handling::PerformanceError;
use crate::models::{PsiData, PsiDeviceData};

pub use pagespeed::{normalize_error_message, PageSpeedClient, TRACKED_METRICS};

/// Device profile a page is scored for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum DeviceStrategy {
    Mobile,
    Desktop,
}

/// A performance-scoring service.
#[async_trait]
pub trait PerformanceApi: Send + Sync {
    /// Scores `url` for one device strategy.
    async fn assess(&self, url: &str, strategy: DeviceStrategy) -> Result<PsiDeviceData, PerformanceError>;
}

/// Assesses `url` for every [`DeviceStrategy`] and combines the results.
///
/// # Errors
///
/// Returns [`PerformanceError::AllProbesFailed`] when no strategy succeeded.
pub async fn fetch_psi_data(api: &dyn PerformanceApi, url: &str) -> Result<PsiData, PerformanceError> {
    let probes = DeviceStrategy::iter().map(|strategy| async move {
        let result = api.assess(url, strategy).await;
        if let Err(e) = &result {
            log::warn!("{} performance probe for {} failed: {}", strategy.as_ref(), url, e);
        }
        (strategy, result.ok())
    });

    let mut data = PsiData {
        mobile: None,
        desktop: None,
    };
    for (strategy, device) in futures::future::join_all(probes).await {
        match strategy {
            DeviceStrategy::Mobile => data.mobile = device,
            DeviceStrategy::Desktop => data.desktop = device,
        }
    }

    if data.mobile.is_none() && data.desktop.is_none() {
        return Err(PerformanceError::AllProbesFailed);
    }
    Ok(data)
}
