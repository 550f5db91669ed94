//! Hand-calculation helpers for the EKV MOS transistor model, used when
//! cross-checking simulated operating points.

/// Boltzmann constant, J/K.
pub const BOLTZMANN: f64 = 1.380_648_8e-23;
/// 0 degrees Celsius in Kelvin.
pub const ZERO_CELSIUS: f64 = 273.15;
/// Elementary charge, C.
pub const ELEMENTARY_CHARGE: f64 = 1.602_176_57e-19;

/// Normalized EKV transconductance function.
pub fn gekv(i: f64) -> f64 {
    (0.25 + i).sqrt() - 0.5
}

/// Normalized inverse EKV function.
pub fn fekv_inv(i: f64) -> f64 {
    2.0 * gekv(i) + gekv(i).ln()
}

/// Normalized EKV function with the default precision of 1e-9.
pub fn fekv(u: f64) -> f64 {
    fekv_with_precision(u, 1e-9)
}

/// Normalized EKV function, solved by Newton iteration on [`fekv_inv`].
/// Deep weak inversion (u < -15) short-circuits to the exponential
/// asymptote.
pub fn fekv_with_precision(u: f64, prec: f64) -> f64 {
    if u < -15.0 {
        return u.exp();
    }
    let mut ix = 1.0e-16;
    let mut vx = fekv_inv(ix);
    while (u - vx).abs() > prec {
        vx = fekv_inv(ix);
        ix += (u - vx) * gekv(ix);
    }
    ix
}

/// Thermodynamic voltage kT/q for a temperature in degrees Celsius.
pub fn ut(temp: f64) -> f64 {
    BOLTZMANN * (temp + ZERO_CELSIUS) / ELEMENTARY_CHARGE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thermodynamic_voltage_at_room_temperature() {
        // kT/q at 300 K is about 25.85 mV.
        let v = ut(26.85);
        assert!((v - 0.025852).abs() < 1e-5);
    }

    #[test]
    fn test_gekv_approaches_sqrt_in_strong_inversion() {
        let i = 1.0e6;
        assert!((gekv(i) - i.sqrt()).abs() / i.sqrt() < 1e-3);
    }

    #[test]
    fn test_fekv_inverts_fekv_inv() {
        for &i in &[0.1, 1.0, 10.0] {
            let u = fekv_inv(i);
            let back = fekv_with_precision(u, 1e-12);
            assert!(
                (back - i).abs() < 1e-6,
                "fekv(fekv_inv({})) = {}",
                i,
                back
            );
        }
    }

    #[test]
    fn test_fekv_weak_inversion_asymptote() {
        let u = -20.0;
        assert_eq!(fekv(u), u.exp());
    }
}
