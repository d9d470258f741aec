//! Capacity arithmetic.
//!
//! Capacity is always derived from the current roster and never cached: a
//! roster change must show up in the very next calculation.

use std::collections::BTreeMap;

use aftersales_planner_sdk::{
    BASE_AW_PER_DAY, BASE_MINUTES_PER_DAY, CapacityBucket, Category, Employee, EmployeeCapacity,
};

/// Per-category value with every category present.
pub type PerCategory<T> = BTreeMap<Category, T>;

/// `round(base * performance / 100)` with halves rounded up.
fn scale(base: i64, performance: i32) -> i64 {
    let performance = i64::from(performance.max(0));
    (base * performance + 50).div_euclid(100)
}

/// Daily AW of one employee.
#[must_use]
pub fn aw_for_performance(performance: i32) -> i64 {
    scale(BASE_AW_PER_DAY, performance)
}

/// Daily AW and working minutes of one employee.
#[must_use]
pub fn capacity_for_employee(performance: i32) -> EmployeeCapacity {
    EmployeeCapacity {
        aw: aw_for_performance(performance),
        minutes: scale(BASE_MINUTES_PER_DAY, performance),
    }
}

/// Sum of per-employee AW over the employees of `category`.
#[must_use]
pub fn capacity_for_category(roster: &[Employee], category: Category) -> i64 {
    roster
        .iter()
        .filter(|e| e.category == category)
        .map(|e| aw_for_performance(e.performance))
        .sum()
}

/// AW and minutes of every category in one pass over the roster.
#[must_use]
pub fn capacity_per_category(roster: &[Employee]) -> PerCategory<EmployeeCapacity> {
    let mut out: PerCategory<EmployeeCapacity> = Category::ALL
        .into_iter()
        .map(|c| (c, EmployeeCapacity::default()))
        .collect();
    for employee in roster {
        let cap = capacity_for_employee(employee.performance);
        let slot = out.entry(employee.category).or_default();
        slot.aw += cap.aw;
        slot.minutes += cap.minutes;
    }
    out
}

/// Rejection carried out of a failed booking check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shortfall {
    pub remaining: i64,
    pub requested: i64,
}

/// Whether `requested` AW still fit into `bucket`.
///
/// # Errors
/// Returns the shortfall when `requested` exceeds the clamped remaining AW.
pub fn check_booking(bucket: CapacityBucket, requested: i64) -> Result<(), Shortfall> {
    let remaining = bucket.remaining();
    if requested > remaining {
        Err(Shortfall {
            remaining,
            requested,
        })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn emp(category: Category, performance: i32) -> Employee {
        Employee {
            id: Uuid::now_v7(),
            name: "Test".to_owned(),
            category,
            performance,
        }
    }

    #[test]
    fn full_performance_is_one_base_day() {
        assert_eq!(
            capacity_for_employee(100),
            EmployeeCapacity { aw: 96, minutes: 480 }
        );
        assert_eq!(aw_for_performance(50), 48);
        assert_eq!(aw_for_performance(0), 0);
    }

    #[test]
    fn per_employee_rounding_is_half_up() {
        // 96 * 85 / 100 = 81.6
        assert_eq!(aw_for_performance(85), 82);
        // 96 * 33 / 100 = 31.68
        assert_eq!(aw_for_performance(33), 32);
        // 480 * 101 / 100 = 484.8
        assert_eq!(capacity_for_employee(101).minutes, 485);
        // 96 * 1 / 100 = 0.96
        assert_eq!(aw_for_performance(1), 1);
    }

    #[test]
    fn category_capacity_rounds_each_employee() {
        // Two employees at 85%: 82 + 82, not round(96 * 1.7) = 163.
        let roster = vec![emp(Category::Mech, 85), emp(Category::Mech, 85)];
        assert_eq!(capacity_for_category(&roster, Category::Mech), 164);
    }

    #[test]
    fn other_categories_do_not_contribute() {
        let roster = vec![
            emp(Category::Mech, 100),
            emp(Category::Body, 50),
            emp(Category::Prep, 200),
        ];
        assert_eq!(capacity_for_category(&roster, Category::Mech), 96);
        assert_eq!(capacity_for_category(&roster, Category::Body), 48);
        assert_eq!(capacity_for_category(&roster, Category::Prep), 192);
    }

    #[test]
    fn adding_an_employee_adds_exactly_their_share() {
        let mut roster = vec![emp(Category::Body, 100)];
        let before = capacity_for_category(&roster, Category::Body);
        roster.push(emp(Category::Body, 75));
        let after = capacity_for_category(&roster, Category::Body);
        assert_eq!(after - before, aw_for_performance(75));
    }

    #[test]
    fn per_category_map_has_every_category() {
        let roster = vec![emp(Category::Prep, 100)];
        let map = capacity_per_category(&roster);
        assert_eq!(map.len(), 3);
        assert_eq!(map[&Category::Mech], EmployeeCapacity::default());
        assert_eq!(map[&Category::Prep].aw, 96);
    }

    #[test]
    fn booking_check_uses_clamped_remaining() {
        let bucket = CapacityBucket::new(96, 50);
        assert!(check_booking(bucket, 46).is_ok());
        assert_eq!(
            check_booking(bucket, 47),
            Err(Shortfall { remaining: 46, requested: 47 })
        );

        let overbooked = CapacityBucket::new(96, 120);
        assert!(check_booking(overbooked, 0).is_ok());
        assert_eq!(
            check_booking(overbooked, 1),
            Err(Shortfall { remaining: 0, requested: 1 })
        );
    }
}
