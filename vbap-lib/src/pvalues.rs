//! Frequency-dependent p-norm exponents for VBAP gain normalisation.
//!
//! Low frequencies add coherently at the listening position and want
//! amplitude normalisation (p near 1); high frequencies add in power and
//! want energy normalisation (p = 2). How early the exponent reaches 2
//! depends on the room, expressed as the direct-to-total energy ratio DTT:
//! 0 for an anechoic room, 1 for a typical listening room.

use crate::constants::NORM_EPSILON;
use crate::error::VbapError;

const A1: f32 = 0.00045;
const A2: f32 = 0.000085;

/// One exponent per frequency, each within [1, 2].
///
/// # Errors
/// Returns [`VbapError::InvalidArgument`] when `dtt` is outside [0, 1] or a
/// frequency is negative or not finite.
pub fn get_p_values(dtt: f32, freqs: &[f32]) -> Result<Vec<f32>, VbapError> {
    if !(0.0..=1.0).contains(&dtt) {
        return Err(VbapError::InvalidArgument(format!(
            "DTT must be within [0, 1], got {}",
            dtt
        )));
    }
    if let Some(freq) = freqs.iter().find(|f| !f.is_finite() || **f < 0.0) {
        return Err(VbapError::InvalidArgument(format!(
            "frequencies must be finite and non-negative, got {}",
            freq
        )));
    }

    Ok(freqs
        .iter()
        .map(|&freq| {
            let p0 = 1.5 - 0.5 * (4.7 * (A1 * freq).tanh()).cos() * (1.0 - A2 * freq).max(0.0);
            (p0 - 2.0) * dtt.sqrt() + 2.0
        })
        .collect())
}

/// Divide `gains` by their p-norm, in place.
///
/// `p = 2` gives energy normalisation and `p = 1` amplitude normalisation
/// for non-negative gains. An all-zero row is left untouched.
///
/// # Errors
/// Returns [`VbapError::InvalidArgument`] unless `p` is finite and positive.
pub fn normalize_gains_p(gains: &mut [f32], p: f32) -> Result<(), VbapError> {
    if !p.is_finite() || p <= 0.0 {
        return Err(VbapError::InvalidArgument(format!(
            "p-norm exponent must be positive, got {}",
            p
        )));
    }
    let norm = gains.iter().map(|g| g.abs().powf(p)).sum::<f32>().powf(1.0 / p);
    if norm <= NORM_EPSILON {
        return Ok(());
    }
    for gain in gains.iter_mut() {
        *gain /= norm;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_type_changes_the_exponent() {
        let anechoic = get_p_values(0.0, &[1000.0]).expect("p values");
        let room = get_p_values(1.0, &[1000.0]).expect("p values");
        assert_ne!(anechoic[0], room[0]);
        for p in anechoic.iter().chain(&room) {
            assert!((0.0..=2.0).contains(p));
        }
    }

    #[test]
    fn anechoic_room_is_energy_normalised() {
        let p = get_p_values(0.0, &[0.0, 250.0, 4000.0, 16000.0]).expect("p values");
        assert!(p.iter().all(|&v| (v - 2.0).abs() < 1e-6));
    }

    #[test]
    fn listening_room_stays_within_amplitude_and_energy() {
        let freqs: Vec<f32> = (0..=24).map(|k| k as f32 * 1000.0).collect();
        let p = get_p_values(1.0, &freqs).expect("p values");
        assert!((p[0] - 1.0).abs() < 1e-6);
        assert!(p.iter().all(|&v| (1.0..=2.0).contains(&v)));
        // Above 1 / A2 the exponent settles at 1.5.
        assert!((p[20] - 1.5).abs() < 1e-6);
    }

    #[test]
    fn invalid_arguments_are_rejected() {
        assert!(get_p_values(-0.1, &[100.0]).is_err());
        assert!(get_p_values(1.1, &[100.0]).is_err());
        assert!(get_p_values(0.5, &[-1.0]).is_err());
        assert!(get_p_values(0.5, &[f32::NAN]).is_err());
        assert!(get_p_values(f32::NAN, &[100.0]).is_err());
    }

    #[test]
    fn p_norm_normalisation() {
        let mut gains = vec![3.0, 4.0];
        normalize_gains_p(&mut gains, 2.0).expect("normalise");
        assert!((gains[0] - 0.6).abs() < 1e-6);
        assert!((gains[1] - 0.8).abs() < 1e-6);

        let mut gains = vec![1.0, 3.0];
        normalize_gains_p(&mut gains, 1.0).expect("normalise");
        assert_eq!(gains, vec![0.25, 0.75]);

        let mut zeros = vec![0.0; 3];
        normalize_gains_p(&mut zeros, 1.5).expect("normalise");
        assert_eq!(zeros, vec![0.0; 3]);
        assert!(normalize_gains_p(&mut zeros, 0.0).is_err());
    }
}
