/// Elementary charge in coulombs (CODATA 2018, exact). One eV is this many joules.
pub const ELEMENTARY_CHARGE_C: f64 = 1.602176634e-19;

/// Avogadro constant in mol⁻¹ (CODATA 2018, exact).
pub const AVOGADRO_PER_MOL: f64 = 6.02214076e23;

pub const EV_PER_KEV: f64 = 1.0e3;

pub const M_PER_MM: f64 = 1.0e-3;

pub const KG_M3_PER_G_CM3: f64 = 1.0e3;

pub const LITERS_PER_M3: f64 = 1.0e3;

/// G-values are expressed per this much absorbed energy.
pub const G_VALUE_REFERENCE_EV: f64 = 100.0;
