//! Recency grouping for the history sidebar.

use std::fmt;

use chrono::{DateTime, Days, NaiveDate, TimeZone};

use crate::chat::core::conversation::Conversation;

/// Named recency bucket, in display order.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum RecencyBucket {
    /// Updated on today's calendar date.
    Today,
    /// Updated on yesterday's calendar date.
    Yesterday,
    /// Updated within the last 7 days.
    LastSevenDays,
    /// Updated within the last 30 days.
    LastThirtyDays,
    /// Everything else.
    Older,
}

impl RecencyBucket {
    /// All buckets in display order.
    pub const ALL: [Self; 5] = [
        Self::Today,
        Self::Yesterday,
        Self::LastSevenDays,
        Self::LastThirtyDays,
        Self::Older,
    ];

    /// Heading shown above the bucket.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Today => "Today",
            Self::Yesterday => "Yesterday",
            Self::LastSevenDays => "Last 7 days",
            Self::LastThirtyDays => "Last 30 days",
            Self::Older => "Older",
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::Today => 0,
            Self::Yesterday => 1,
            Self::LastSevenDays => 2,
            Self::LastThirtyDays => 3,
            Self::Older => 4,
        }
    }
}

impl fmt::Display for RecencyBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One non-empty bucket of the history sidebar.
#[derive(Clone, Debug)]
pub struct HistoryGroup<'a> {
    /// Which bucket this is.
    pub bucket: RecencyBucket,
    /// Members, in store order.
    pub conversations: Vec<&'a Conversation>,
}

impl HistoryGroup<'_> {
    /// Heading shown above the group.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        self.bucket.label()
    }
}

/// Calendar cutoffs derived from "now".
#[derive(Clone, Copy, Debug)]
struct Cutoffs {
    today: NaiveDate,
    yesterday: Option<NaiveDate>,
    last_week: Option<NaiveDate>,
    last_month: Option<NaiveDate>,
}

impl Cutoffs {
    fn new(today: NaiveDate) -> Self {
        Self {
            today,
            yesterday: today.checked_sub_days(Days::new(1)),
            last_week: today.checked_sub_days(Days::new(7)),
            last_month: today.checked_sub_days(Days::new(30)),
        }
    }

    // Comparing calendar dates is the same as comparing instants against the
    // cutoff's local midnight.
    fn classify(&self, day: NaiveDate) -> RecencyBucket {
        if day == self.today {
            RecencyBucket::Today
        } else if Some(day) == self.yesterday {
            RecencyBucket::Yesterday
        } else if self.last_week.is_none_or(|cutoff| day >= cutoff) {
            RecencyBucket::LastSevenDays
        } else if self.last_month.is_none_or(|cutoff| day >= cutoff) {
            RecencyBucket::LastThirtyDays
        } else {
            RecencyBucket::Older
        }
    }
}

/// Classify a single instant relative to `now`, in `now`'s time zone.
#[must_use]
pub fn bucket_for<Tz: TimeZone, U: TimeZone>(
    updated_at: &DateTime<U>,
    now: &DateTime<Tz>,
) -> RecencyBucket {
    let cutoffs = Cutoffs::new(now.date_naive());
    cutoffs.classify(updated_at.with_timezone(&now.timezone()).date_naive())
}

/// Partition conversations into recency buckets by `updated_at`.
///
/// Buckets come back in display order with empty ones dropped; each
/// conversation lands in exactly one bucket and keeps its store position
/// relative to the others in that bucket. Dates are taken in `now`'s time
/// zone, so pass `Local::now()` for a wall-clock sidebar.
#[must_use]
pub fn group_by_recency<'a, Tz: TimeZone>(
    conversations: &'a [Conversation],
    now: &DateTime<Tz>,
) -> Vec<HistoryGroup<'a>> {
    let cutoffs = Cutoffs::new(now.date_naive());
    let zone = now.timezone();

    let mut buckets: [Vec<&'a Conversation>; 5] = Default::default();
    for conversation in conversations {
        let day = conversation.updated_at.with_timezone(&zone).date_naive();
        buckets[cutoffs.classify(day).index()].push(conversation);
    }

    RecencyBucket::ALL
        .into_iter()
        .zip(buckets)
        .filter(|(_, members)| !members.is_empty())
        .map(|(bucket, conversations)| HistoryGroup {
            bucket,
            conversations,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset, Utc};

    use crate::chat::core::title::TitleRule;

    fn conversation_at(updated_at: DateTime<Utc>) -> Conversation {
        Conversation::start(None, &TitleRule::default(), updated_at)
    }

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_four_buckets_in_order() {
        let now = noon();
        let conversations = vec![
            conversation_at(now),
            conversation_at(now - Duration::days(1)),
            conversation_at(now - Duration::days(10)),
            conversation_at(now - Duration::days(40)),
        ];

        let groups = group_by_recency(&conversations, &now);
        let labels: Vec<_> = groups.iter().map(HistoryGroup::label).collect();
        assert_eq!(labels, vec!["Today", "Yesterday", "Last 30 days", "Older"]);
        for (group, conv) in groups.iter().zip(&conversations) {
            assert_eq!(group.conversations.len(), 1);
            assert_eq!(group.conversations[0].id, conv.id);
        }
    }

    #[test]
    fn test_empty_input_yields_no_groups() {
        assert!(group_by_recency(&[], &noon()).is_empty());
    }

    #[test]
    fn test_partition_is_exhaustive_and_disjoint() {
        let now = noon();
        let conversations: Vec<_> = (0..60)
            .map(|h| conversation_at(now - Duration::hours(h * 17)))
            .collect();

        let groups = group_by_recency(&conversations, &now);
        let mut seen: Vec<_> = groups
            .iter()
            .flat_map(|g| g.conversations.iter().map(|c| c.id))
            .collect();
        assert_eq!(seen.len(), conversations.len());
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), conversations.len());

        let order: Vec<_> = groups.iter().map(|g| g.bucket).collect();
        let mut sorted = order.clone();
        sorted.sort();
        assert_eq!(order, sorted);
    }

    #[test]
    fn test_store_order_preserved_within_bucket() {
        let now = noon();
        let conversations = vec![
            conversation_at(now - Duration::hours(5)),
            conversation_at(now - Duration::hours(1)),
            conversation_at(now - Duration::hours(3)),
        ];

        let groups = group_by_recency(&conversations, &now);
        assert_eq!(groups.len(), 1);
        let ids: Vec<_> = groups[0].conversations.iter().map(|c| c.id).collect();
        let expected: Vec<_> = conversations.iter().map(|c| c.id).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_calendar_boundaries() {
        let now = noon();
        let midnight = Utc.with_ymd_and_hms(2026, 10, 16, 0, 0, 0).unwrap();

        assert_eq!(bucket_for(&midnight, &now), RecencyBucket::Today);
        assert_eq!(
            bucket_for(&(midnight - Duration::seconds(1)), &now),
            RecencyBucket::Yesterday
        );
        // Cutoff days are inclusive from their midnight.
        let week = midnight - Duration::days(7);
        assert_eq!(bucket_for(&week, &now), RecencyBucket::LastSevenDays);
        assert_eq!(
            bucket_for(&(week - Duration::seconds(1)), &now),
            RecencyBucket::LastThirtyDays
        );
        let month = midnight - Duration::days(30);
        assert_eq!(bucket_for(&month, &now), RecencyBucket::LastThirtyDays);
        assert_eq!(
            bucket_for(&(month - Duration::seconds(1)), &now),
            RecencyBucket::Older
        );
    }

    #[test]
    fn test_future_dates_fall_in_last_seven_days() {
        let now = noon();
        assert_eq!(
            bucket_for(&(now + Duration::days(3)), &now),
            RecencyBucket::LastSevenDays
        );
    }

    #[test]
    fn test_dates_follow_now_time_zone() {
        // 23:30 UTC on the 15th is already the 16th in UTC+9.
        let seoul = FixedOffset::east_opt(9 * 3600).unwrap();
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 3, 0, 0).unwrap().with_timezone(&seoul);
        let late = Utc.with_ymd_and_hms(2026, 10, 15, 23, 30, 0).unwrap();

        assert_eq!(bucket_for(&late, &now), RecencyBucket::Today);
        assert_eq!(bucket_for(&late, &now.with_timezone(&Utc)), RecencyBucket::Yesterday);
    }
}
