//! Reservation cost calculation.
//!
//! `total = round_cents(lab.hourly_rate * hours + Σ billable material rate * hours)`
//! where `hours` is the fractional length of the booking window. Only the final
//! total is rounded.

use std::collections::HashSet;

use crate::laboratory::Laboratory;
use crate::material::Material;
use crate::money::round_cents;
use crate::time::TimeWindow;

/// Breakdown of a reservation price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quote {
    pub hours: f64,
    pub laboratory_cost: f64,
    pub materials_cost: f64,
    /// Rounded to cents.
    pub total: f64,
}

/// Price a booking of `laboratory` with the selected `materials` over `window`.
///
/// Materials belonging to another laboratory are ignored, as are repeated
/// entries. Free materials and materials without a rate cost nothing.
#[must_use]
pub fn quote(laboratory: &Laboratory, materials: &[Material], window: TimeWindow) -> Quote {
    let hours = window.hours();
    let laboratory_cost = laboratory.hourly_rate * hours;

    let mut seen = HashSet::new();
    let materials_cost: f64 = materials
        .iter()
        .filter(|m| m.laboratory_id == laboratory.id)
        .filter(|m| seen.insert(m.id))
        .map(|m| m.billable_rate() * hours)
        .sum();

    Quote {
        hours,
        laboratory_cost,
        materials_cost,
        total: round_cents(laboratory_cost + materials_cost),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::LaboratoryId;
    use crate::time::ClockTime;

    fn window(start: &str, end: &str) -> TimeWindow {
        let start: ClockTime = start.parse().unwrap();
        let end: ClockTime = end.parse().unwrap();
        TimeWindow::new(start, end).unwrap()
    }

    fn laboratory(rate: f64) -> Laboratory {
        Laboratory::builder()
            .title("Fab Lab")
            .hourly_rate(rate)
            .build()
            .unwrap()
    }

    fn metered(laboratory_id: LaboratoryId, rate: f64) -> Material {
        Material::builder()
            .laboratory_id(laboratory_id)
            .name("Laser cutter")
            .kind("Cutter")
            .is_free(false)
            .hourly_rate(rate)
            .build()
            .unwrap()
    }

    fn free(laboratory_id: LaboratoryId) -> Material {
        Material::builder()
            .laboratory_id(laboratory_id)
            .name("Workbench")
            .kind("Furniture")
            .is_free(true)
            .build()
            .unwrap()
    }

    fn assert_cents(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn should_charge_laboratory_rate_for_full_day() {
        let lab = laboratory(50.0);
        let q = quote(&lab, &[], window("09:00", "17:00"));
        assert_cents(q.hours, 8.0);
        assert_cents(q.total, 400.0);
    }

    #[test]
    fn should_add_metered_material_rate() {
        let lab = laboratory(50.0);
        let materials = [metered(lab.id, 25.0)];
        let q = quote(&lab, &materials, window("09:00", "17:00"));
        assert_cents(q.materials_cost, 200.0);
        assert_cents(q.total, 600.0);
    }

    #[test]
    fn should_not_charge_free_material() {
        let lab = laboratory(50.0);
        let materials = [free(lab.id)];
        let q = quote(&lab, &materials, window("09:00", "17:00"));
        assert_cents(q.total, 400.0);
    }

    #[test]
    fn should_not_charge_material_without_rate() {
        let lab = laboratory(50.0);
        let mut unpriced = metered(lab.id, 25.0);
        unpriced.hourly_rate = None;
        let q = quote(&lab, &[unpriced], window("09:00", "17:00"));
        assert_cents(q.total, 400.0);
    }

    #[test]
    fn should_skip_material_of_another_laboratory() {
        let lab = laboratory(50.0);
        let foreign = metered(LaboratoryId::new(), 25.0);
        let q = quote(&lab, &[foreign], window("09:00", "17:00"));
        assert_cents(q.total, 400.0);
    }

    #[test]
    fn should_charge_repeated_material_once() {
        let lab = laboratory(10.0);
        let m = metered(lab.id, 5.0);
        let q = quote(&lab, &[m.clone(), m], window("09:00", "10:00"));
        assert_cents(q.total, 15.0);
    }

    #[test]
    fn should_price_fractional_hours() {
        let lab = laboratory(50.0);
        let materials = [metered(lab.id, 25.0)];
        let q = quote(&lab, &materials, window("09:00", "10:30"));
        assert_cents(q.hours, 1.5);
        assert_cents(q.total, 112.5);
    }

    #[test]
    fn should_round_total_to_cents() {
        // 20 minutes at 10/hour = 3.333...
        let lab = laboratory(10.0);
        let q = quote(&lab, &[], window("09:00", "09:20"));
        assert_cents(q.total, 3.33);
    }
}
