use anyhow::Result;
use log::LevelFilter;
use nalgebra::DVector;

pub fn init_logger() {
    let _ = env_logger::builder()
        .filter_level(LevelFilter::Warn)
        .filter(Some("numdiff_core"), LevelFilter::Trace)
        .is_test(true)
        .try_init();
}

/// Pins a closure to the `ResidualFunction` signature so its argument types are inferred.
pub fn residuals<F>(f: F) -> F
where
    F: FnMut(&[DVector<f64>], &mut [f64]) -> Result<()>,
{
    f
}
