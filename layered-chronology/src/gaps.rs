use layered_timeline::Timeline;

use crate::analyzer::{dated_in_order, sort_date, ChronologyAnalyzer};
use crate::insights::{Significance, TimelineGap};

impl ChronologyAnalyzer {
    /// Intervals between consecutive dated events longer than the gap threshold.
    pub fn identify_gaps(&self, timeline: &Timeline) -> Vec<TimelineGap> {
        let dated = dated_in_order(timeline);
        let mut gaps = Vec::new();

        for pair in dated.windows(2) {
            let (before, after) = (pair[0], pair[1]);
            let (start, end) = (sort_date(before), sort_date(after));
            let days = (end - start).num_days();
            if days <= self.config.gap_threshold_days {
                continue;
            }

            let significance = self.gap_significance(days);
            let missing = self
                .rules
                .missing_between(before.event_type, after.event_type);
            tracing::trace!(from = %before.id, to = %after.id, days, ?significance, "gap");

            gaps.push(TimelineGap {
                start_event_id: before.id.clone(),
                end_event_id: after.id.clone(),
                start_date: start,
                end_date: end,
                duration_days: days,
                significance,
                description: format!(
                    "{} days without recorded events between {} and {}",
                    days, before.event_type, after.event_type
                ),
                missing_event_types: missing,
            });
        }
        gaps
    }

    fn gap_significance(&self, days: i64) -> Significance {
        if days > self.config.high_gap_days {
            Significance::High
        } else if days > self.config.medium_gap_days {
            Significance::Medium
        } else {
            Significance::Low
        }
    }
}
