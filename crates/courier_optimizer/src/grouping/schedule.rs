use fxhash::FxHashMap;
use jiff::SignedDuration;
use tracing::{Level, debug, instrument};

use crate::{
    problem::{
        driver::{Driver, DriverIdx},
        time_window::TimeWindow,
    },
    utils::dsu::Dsu,
};

/// A driver of a schedule group with its own availability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleMember {
    driver: DriverIdx,
    id: String,
    slots: Vec<TimeWindow>,
}

impl ScheduleMember {
    pub fn driver(&self) -> DriverIdx {
        self.driver
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn slots(&self) -> &[TimeWindow] {
        &self.slots
    }

    pub fn earliest_start(&self) -> SignedDuration {
        self.slots
            .iter()
            .map(TimeWindow::start)
            .min()
            .unwrap_or(SignedDuration::ZERO)
    }

    pub fn is_available_during(&self, window: &TimeWindow) -> bool {
        self.slots.iter().any(|slot| slot.overlaps(window))
    }
}

/// Drivers whose availabilities are connected through overlapping slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    slots: Vec<TimeWindow>,
    span: TimeWindow,
    members: Vec<ScheduleMember>,
}

impl Schedule {
    /// Union of the member slots, sorted and disjoint.
    pub fn slots(&self) -> &[TimeWindow] {
        &self.slots
    }

    pub fn span(&self) -> &TimeWindow {
        &self.span
    }

    /// Ordered by earliest slot start, then id.
    pub fn members(&self) -> &[ScheduleMember] {
        &self.members
    }

    pub fn overlap(&self, window: &TimeWindow) -> SignedDuration {
        self.slots
            .iter()
            .map(|slot| slot.overlap(window))
            .fold(SignedDuration::ZERO, |total, overlap| total + overlap)
    }

    /// Members with a slot of their own overlapping `window`, in member order.
    pub fn available_during<'a>(
        &'a self,
        window: &'a TimeWindow,
    ) -> impl Iterator<Item = &'a ScheduleMember> + 'a {
        self.members
            .iter()
            .filter(move |member| member.is_available_during(window))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schedules {
    groups: Vec<Schedule>,
}

impl Schedules {
    pub fn groups(&self) -> &[Schedule] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Group overlapping `window` the most. Ties go to the earlier group.
    pub fn best_match(&self, window: &TimeWindow) -> Option<&Schedule> {
        let mut best: Option<(&Schedule, SignedDuration)> = None;

        for schedule in &self.groups {
            let overlap = schedule.overlap(window);
            if overlap > SignedDuration::ZERO && best.is_none_or(|(_, current)| overlap > current) {
                best = Some((schedule, overlap));
            }
        }

        best.map(|(schedule, _)| schedule)
    }
}

/// Groups drivers whose slots intersect, transitively.
///
/// Slots are swept in `(start, end, driver id)` order; a slot starting before the end
/// of the running cluster joins it. Touching slots stay apart.
#[instrument(skip_all, level = Level::DEBUG, fields(drivers = drivers.len()))]
pub fn group_drivers_by_time_slot(drivers: &[Driver]) -> Schedules {
    let mut entries = drivers
        .iter()
        .enumerate()
        .flat_map(|(index, driver)| {
            let driver_idx = DriverIdx::new(index);
            driver.time_slots().iter().map(move |slot| (*slot, driver_idx))
        })
        .collect::<Vec<_>>();

    entries.sort_by(|(a, a_driver), (b, b_driver)| {
        a.cmp(b)
            .then_with(|| drivers[*a_driver].id().cmp(drivers[*b_driver].id()))
    });

    let mut dsu = Dsu::new(drivers.len());
    let mut cluster: Option<(SignedDuration, DriverIdx)> = None;

    for &(slot, driver_idx) in &entries {
        match cluster {
            Some((end, owner)) if slot.start() < end => {
                dsu.union(owner.get(), driver_idx.get());
                cluster = Some((end.max(slot.end()), owner));
            }
            _ => cluster = Some((slot.end(), driver_idx)),
        }
    }

    let mut components: FxHashMap<usize, Vec<DriverIdx>> = FxHashMap::default();
    for driver_idx in (0..drivers.len()).map(DriverIdx::new) {
        components
            .entry(dsu.find(driver_idx.get()))
            .or_default()
            .push(driver_idx);
    }

    let mut groups = components
        .into_values()
        .filter_map(|members| build_schedule(drivers, members))
        .collect::<Vec<_>>();

    groups.sort_by(|a, b| {
        a.span
            .cmp(&b.span)
            .then_with(|| a.members[0].id.cmp(&b.members[0].id))
    });

    debug!(groups = groups.len(), "Grouped drivers");

    Schedules { groups }
}

fn build_schedule(drivers: &[Driver], members: Vec<DriverIdx>) -> Option<Schedule> {
    let mut members = members
        .into_iter()
        .map(|driver_idx| {
            let driver = &drivers[driver_idx];
            ScheduleMember {
                driver: driver_idx,
                id: driver.id().to_owned(),
                slots: driver.time_slots().to_vec(),
            }
        })
        .collect::<Vec<_>>();

    members.sort_by(|a, b| {
        a.earliest_start()
            .cmp(&b.earliest_start())
            .then_with(|| a.id.cmp(&b.id))
    });

    let mut slots = members
        .iter()
        .flat_map(|member| member.slots.iter().copied())
        .collect::<Vec<_>>();
    slots.sort();

    let mut merged: Vec<TimeWindow> = Vec::with_capacity(slots.len());
    for slot in slots {
        match merged.last_mut() {
            Some(last) if slot.start() <= last.end() => *last = last.span(&slot),
            _ => merged.push(slot),
        }
    }

    let span = merged.first()?.span(merged.last()?);

    Some(Schedule {
        slots: merged,
        span,
        members,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils;

    fn group_ids(schedules: &Schedules) -> Vec<Vec<String>> {
        schedules
            .groups()
            .iter()
            .map(|group| {
                group
                    .members()
                    .iter()
                    .map(|member| member.id().to_owned())
                    .collect()
            })
            .collect()
    }

    fn drivers() -> Vec<Driver> {
        vec![
            test_utils::create_driver("d1", &[(28_800, 39_600)], 3),
            test_utils::create_driver("d2", &[(28_800, 39_600)], 3),
            test_utils::create_driver("d3", &[(30_000, 40_000)], 15),
            test_utils::create_driver("d4", &[(43_200, 50_400)], 3),
            test_utils::create_driver("d5", &[(45_000, 54_000)], 15),
            test_utils::create_driver("d6", &[(61_200, 64_800)], 3),
            test_utils::create_driver("d7", &[(63_000, 68_400)], 3),
        ]
    }

    #[test]
    fn test_groups_overlapping_drivers() {
        let schedules = group_drivers_by_time_slot(&drivers());

        assert_eq!(
            group_ids(&schedules),
            vec![
                vec!["d1", "d2", "d3"],
                vec!["d4", "d5"],
                vec!["d6", "d7"],
            ]
        );
        assert_eq!(
            schedules.groups()[0].slots(),
            &[TimeWindow::new(28_800, 40_000).unwrap()]
        );
    }

    #[test]
    fn test_touching_slots_stay_apart() {
        let drivers = vec![
            test_utils::create_driver("a", &[(0, 3_600)], 3),
            test_utils::create_driver("b", &[(3_600, 7_200)], 3),
        ];

        assert_eq!(group_drivers_by_time_slot(&drivers).len(), 2);
    }

    #[test]
    fn test_grouping_is_transitive_through_second_slot() {
        let drivers = vec![
            test_utils::create_driver("a", &[(0, 3_600)], 3),
            test_utils::create_driver("b", &[(10_000, 12_000)], 3),
            test_utils::create_driver("c", &[(1_000, 2_000), (11_000, 11_500)], 3),
        ];

        let schedules = group_drivers_by_time_slot(&drivers);

        assert_eq!(group_ids(&schedules), vec![vec!["a", "c", "b"]]);
        assert_eq!(schedules.groups()[0].slots().len(), 2);
        assert_eq!(
            schedules.groups()[0].span(),
            &TimeWindow::new(0, 12_000).unwrap()
        );
    }

    #[test]
    fn test_independent_of_input_order() {
        let mut reversed = drivers();
        reversed.reverse();

        let expected = group_drivers_by_time_slot(&drivers());
        let schedules = group_drivers_by_time_slot(&reversed);

        assert_eq!(group_ids(&schedules), group_ids(&expected));
        assert_eq!(
            group_drivers_by_time_slot(&reversed),
            group_drivers_by_time_slot(&reversed)
        );
    }

    #[test]
    fn test_best_match() {
        let schedules = group_drivers_by_time_slot(&drivers());

        let window = TimeWindow::new(36_000, 43_200).unwrap();
        let best = schedules.best_match(&window).unwrap();
        assert_eq!(best.members()[0].id(), "d1");

        // Touches the first group and overlaps the second
        let window = TimeWindow::new(40_000, 46_000).unwrap();
        let best = schedules.best_match(&window).unwrap();
        assert_eq!(best.members()[0].id(), "d4");
        assert_eq!(
            best.available_during(&window)
                .map(ScheduleMember::id)
                .collect::<Vec<_>>(),
            vec!["d4", "d5"]
        );

        let window = TimeWindow::new(0, 3_600).unwrap();
        assert!(schedules.best_match(&window).is_none());
    }

    #[test]
    fn test_empty_drivers() {
        assert!(group_drivers_by_time_slot(&[]).is_empty());
    }
}
