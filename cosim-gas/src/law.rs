//! Pipe pressure-drop law and load conversion.
//!
//! Pipes follow the Renouard formulas, with flow `Q` in normal m³/h and the
//! inner diameter `D` in mm:
//!
//! ```text
//! low pressure:          Δp [mbar]       = 23200 · d · L [m]  · Q^1.82 · D^-4.82
//! medium/high pressure:  p₁² − p₂² [bar²] = 48600 · d · L [km] · Q^1.82 · D^-4.82
//! ```
//!
//! where `d` is the gas density relative to air.

use uom::si::{
    f64::{Length, MassRate, Power, Pressure},
    length::{kilometer, meter, millimeter},
    mass_rate::kilogram_per_second,
    power::watt,
    pressure::{bar, pascal},
};

use crate::{level::PressureLevel, network::Load};

/// Gas density relative to air.
pub const RELATIVE_DENSITY: f64 = 0.6;

/// Gas density at normal conditions, kg/m³.
pub const NORMAL_DENSITY: f64 = RELATIVE_DENSITY * 1.293;

/// Lower heating value of the gas, J/kg.
pub const LOWER_HEATING_VALUE: f64 = 50.0e6;

/// Flow exponent of the Renouard formulas.
pub const RENOUARD_EXPONENT: f64 = 1.82;

const RENOUARD_LOW: f64 = 23_200.0;
const RENOUARD_SQUARED: f64 = 48_600.0;
const PASCAL_PER_MILLIBAR: f64 = 100.0;
const PASCAL_PER_BAR: f64 = 1.0e5;
const SECONDS_PER_HOUR: f64 = 3600.0;

/// Hydraulic resistance of a pipe at a pressure level.
///
/// Relates the level's pressure potential to the volumetric flow:
/// `potential = resistance · Q^1.82`. The potential is a plain pressure
/// difference in Pa at low pressure and a difference of squared absolute
/// pressures in bar² otherwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resistance {
    level: PressureLevel,
    value: f64,
}

impl Resistance {
    /// Computes the resistance of a pipe with the given geometry.
    #[must_use]
    pub fn of_pipe(length: Length, diameter: Length, level: PressureLevel) -> Self {
        let geometry = RELATIVE_DENSITY * diameter.get::<millimeter>().powf(-4.82);
        let value = if level.is_squared() {
            RENOUARD_SQUARED * geometry * length.get::<kilometer>()
        } else {
            RENOUARD_LOW * PASCAL_PER_MILLIBAR * geometry * length.get::<meter>()
        };
        Self { level, value }
    }

    /// Mass flow in kg/s from `upstream_pa` to `downstream_pa`.
    ///
    /// The sign follows the pressure potential, so the result is negative when
    /// gas flows from downstream to upstream.
    #[must_use]
    pub fn mass_flow_kg_s(&self, upstream_pa: f64, downstream_pa: f64) -> f64 {
        self.potential_flow_kg_s(
            potential(self.level, upstream_pa) - potential(self.level, downstream_pa),
        )
    }

    /// Mass flow in kg/s driven by a difference of pressure potentials.
    #[must_use]
    pub fn potential_flow_kg_s(&self, difference: f64) -> f64 {
        let volume_per_hour = (difference.abs() / self.value).powf(RENOUARD_EXPONENT.recip());
        difference.signum() * volume_per_hour * NORMAL_DENSITY / SECONDS_PER_HOUR
    }

    /// Mass flow between two pressures as a quantity.
    #[must_use]
    pub fn mass_flow(&self, upstream: Pressure, downstream: Pressure) -> MassRate {
        MassRate::new::<kilogram_per_second>(
            self.mass_flow_kg_s(upstream.get::<pascal>(), downstream.get::<pascal>()),
        )
    }
}

/// Pressure potential of a pressure at `level`.
///
/// This is the pressure itself in Pa at low pressure and the squared absolute
/// pressure in bar² at medium and high pressure.
#[must_use]
pub fn potential(level: PressureLevel, pressure_pa: f64) -> f64 {
    if level.is_squared() {
        let pressure_bar = pressure_pa / PASCAL_PER_BAR;
        pressure_bar * pressure_bar
    } else {
        pressure_pa
    }
}

/// Inverse of [`potential`].
///
/// A negative squared potential has no physical pressure and maps to the
/// negated root, which keeps the mapping monotone.
#[must_use]
pub fn pressure_from_potential(level: PressureLevel, potential: f64) -> f64 {
    if level.is_squared() {
        potential.signum() * potential.abs().sqrt() * PASCAL_PER_BAR
    } else {
        potential
    }
}

/// Mass flow drawn by a load, `demand · scaling / LHV`.
#[must_use]
pub fn load_mass_flow(load: &Load) -> MassRate {
    power_to_mass_flow(load.demand * load.scaling)
}

/// Converts a gas power to the mass flow carrying it.
#[must_use]
pub fn power_to_mass_flow(power: Power) -> MassRate {
    MassRate::new::<kilogram_per_second>(power.get::<watt>() / LOWER_HEATING_VALUE)
}

/// Converts an absolute pressure in bar to Pa.
#[must_use]
pub fn bar_to_pascal(value: f64) -> f64 {
    Pressure::new::<bar>(value).get::<pascal>()
}
