//! Percent ⇄ server volume conversion and the fixed-step volume keys.

use libpulse_binding::volume::Volume as PulseVolume;

/// Server units of 100 percent
pub const NORM: u32 = PulseVolume::NORMAL.0;

/// Server units of silence
pub const MUTED: u32 = PulseVolume::MUTED.0;

/// Distance moved by one volume key press, in percent
pub const VOLUME_STEP: u8 = 11;

/// Highest percent value the boundary accepts
pub const MAX_PERCENT: u8 = 100;

/// Convert a percent value (0..=100) to server units
pub fn percent_to_units(percent: u8) -> u32 {
    let percent = percent.min(MAX_PERCENT);
    let span = f64::from(NORM - MUTED);
    (f64::from(percent) / 100.0 * span).round() as u32 + MUTED
}

/// Convert server units to a percent value
///
/// Amplified volumes above [`NORM`] report as 100.
pub fn units_to_percent(units: u32) -> u8 {
    let span = f64::from(NORM - MUTED);
    let percent = (f64::from(units.saturating_sub(MUTED)) / span * 100.0).round();
    percent.min(f64::from(MAX_PERCENT)) as u8
}

/// Target of a "volume up" key press, or `None` when already at the top.
///
/// Snaps down to a multiple of the step first. Because 100 is not a
/// multiple of 11 the last step from 88 lands on 100.
pub fn step_up(current: u8) -> Option<u8> {
    let mut normalized = (current / VOLUME_STEP) * VOLUME_STEP;

    if normalized >= 99 {
        return None;
    }
    if normalized >= 88 {
        normalized += 1;
    }

    Some(normalized + VOLUME_STEP)
}

/// Target of a "volume down" key press, or `None` when already silent.
///
/// Snaps up to a multiple of the step first, clamped to 99 so that 100
/// steps down to 88.
pub fn step_down(current: u8) -> Option<u8> {
    let current = current.min(MAX_PERCENT);
    let mut normalized = current.div_ceil(VOLUME_STEP) * VOLUME_STEP;

    if normalized >= 100 {
        normalized = 99;
    } else if normalized == 0 {
        return None;
    }

    Some(normalized - VOLUME_STEP)
}
