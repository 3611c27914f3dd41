use super::constants::{
    ELEMENTARY_CHARGE_C, EV_PER_KEV, G_VALUE_REFERENCE_EV, KG_M3_PER_G_CM3, LITERS_PER_M3,
    M_PER_MM,
};
use nalgebra::Vector3;

#[inline]
pub fn kev_to_ev(kev: f64) -> f64 {
    kev * EV_PER_KEV
}

#[inline]
pub fn kev_to_joules(kev: f64) -> f64 {
    kev * EV_PER_KEV * ELEMENTARY_CHARGE_C
}

#[inline]
pub fn joules_to_kev(joules: f64) -> f64 {
    joules / (EV_PER_KEV * ELEMENTARY_CHARGE_C)
}

#[inline]
pub fn mm_to_m(mm: f64) -> f64 {
    mm * M_PER_MM
}

#[inline]
pub fn g_cm3_to_kg_m3(density_g_cm3: f64) -> f64 {
    density_g_cm3 * KG_M3_PER_G_CM3
}

#[inline]
pub fn m3_to_liters(volume_m3: f64) -> f64 {
    volume_m3 * LITERS_PER_M3
}

/// Number of 100 eV units contained in `kev`, the quantity G-values are normalised to.
#[inline]
pub fn kev_to_g_value_units(kev: f64) -> f64 {
    kev_to_ev(kev) / G_VALUE_REFERENCE_EV
}

/// Volume of one voxel in m³; each axis is converted from mm before multiplying.
pub fn voxel_volume_m3(spacing_mm: &Vector3<f64>) -> f64 {
    mm_to_m(spacing_mm.x) * mm_to_m(spacing_mm.y) * mm_to_m(spacing_mm.z)
}

pub fn voxel_volume_liters(spacing_mm: &Vector3<f64>) -> f64 {
    m3_to_liters(voxel_volume_m3(spacing_mm))
}

/// Mass of one voxel in kg for a uniform density given in g/cm³.
///
/// No guard is applied here: a zero volume or density yields a zero mass, and callers
/// dividing by it get non-finite values.
pub fn voxel_mass_kg(spacing_mm: &Vector3<f64>, density_g_cm3: f64) -> f64 {
    voxel_volume_m3(spacing_mm) * g_cm3_to_kg_m3(density_g_cm3)
}
