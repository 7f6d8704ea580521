use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, SecondsFormat, Utc};
use tracing::debug;

use shared_config::AppConfig;
use shared_database::{SupabaseClient, PAGE_SIZE};
use shared_models::credits::CreditTransactionType;
use shared_models::scheduling::AppointmentStatus;
use shared_models::user::{UserRole, VerificationStatus};

use crate::models::{AdminError, AppointmentStatRow, Dashboard, DashboardTotals, DayBucket, PurchaseRow, UserStatRow};

pub const DEFAULT_DASHBOARD_DAYS: u32 = 7;
pub const MAX_DASHBOARD_DAYS: u32 = 90;

/// All-time head counts.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadCounts {
    pub patients: u64,
    pub doctors: u64,
    pub pending_verifications: u64,
}

pub struct DashboardService {
    supabase: SupabaseClient,
}

impl DashboardService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn build(&self, days: Option<u32>, now: DateTime<Utc>) -> Result<Dashboard, AdminError> {
        let days = days.unwrap_or(DEFAULT_DASHBOARD_DAYS).clamp(1, MAX_DASHBOARD_DAYS);
        let (from, to) = window(days, now);
        let range = format!(
            "created_at=gte.{}&created_at=lt.{}&order=created_at.asc,id.asc",
            from.to_rfc3339_opts(SecondsFormat::Secs, true),
            to.to_rfc3339_opts(SecondsFormat::Secs, true)
        );

        let patients_path = format!("/rest/v1/users?select=id&role=eq.{}", UserRole::Patient);
        let doctors_path = format!("/rest/v1/users?select=id&role=eq.{}", UserRole::Doctor);
        let pending_path = format!(
            "/rest/v1/users?select=id&role=eq.{}&verification_status=eq.{}",
            UserRole::Doctor,
            VerificationStatus::Pending
        );
        let new_users_path = format!("/rest/v1/users?select=role,created_at&{}", range);
        let appointments_path = format!("/rest/v1/appointments?select=status,created_at&{}", range);
        let purchases_path = format!(
            "/rest/v1/credit_transactions?select=amount,created_at&type=eq.{}&{}",
            CreditTransactionType::CreditPurchase,
            range
        );

        debug!("Building {}-day dashboard from {} to {}", days, from, to);
        let (patients, doctors, pending_verifications, new_users, appointments, purchases) = futures::try_join!(
            self.supabase.count(&patients_path),
            self.supabase.count(&doctors_path),
            self.supabase.count(&pending_path),
            self.supabase.fetch_all::<UserStatRow>(&new_users_path, PAGE_SIZE),
            self.supabase.fetch_all::<AppointmentStatRow>(&appointments_path, PAGE_SIZE),
            self.supabase.fetch_all::<PurchaseRow>(&purchases_path, PAGE_SIZE),
        )?;

        let head = HeadCounts {
            patients,
            doctors,
            pending_verifications,
        };
        Ok(Dashboard {
            days,
            from,
            to,
            totals: totals(head, &appointments, &purchases),
            series: bucket_by_day(from.date_naive(), days, &new_users, &appointments, &purchases),
        })
    }
}

/// `days` whole UTC days ending with today, as a half-open range.
pub fn window(days: u32, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let today = now.date_naive();
    let to = (today + Duration::days(1)).and_time(chrono::NaiveTime::MIN).and_utc();
    let from = to - Duration::days(i64::from(days));
    (from, to)
}

/// One bucket per day from `first_day`, empty days included. Rows outside
/// the range are dropped.
pub fn bucket_by_day(
    first_day: NaiveDate,
    days: u32,
    users: &[UserStatRow],
    appointments: &[AppointmentStatRow],
    purchases: &[PurchaseRow],
) -> Vec<DayBucket> {
    let mut buckets: BTreeMap<NaiveDate, DayBucket> = (0..i64::from(days))
        .map(|offset| first_day + Duration::days(offset))
        .map(|date| {
            (
                date,
                DayBucket {
                    date,
                    new_users: 0,
                    appointments: 0,
                    credits_purchased: 0,
                },
            )
        })
        .collect();

    for user in users {
        if let Some(bucket) = buckets.get_mut(&user.created_at.date_naive()) {
            bucket.new_users += 1;
        }
    }
    for appointment in appointments {
        if let Some(bucket) = buckets.get_mut(&appointment.created_at.date_naive()) {
            bucket.appointments += 1;
        }
    }
    for purchase in purchases {
        if let Some(bucket) = buckets.get_mut(&purchase.created_at.date_naive()) {
            bucket.credits_purchased += i64::from(purchase.amount);
        }
    }

    buckets.into_values().collect()
}

fn totals(head: HeadCounts, appointments: &[AppointmentStatRow], purchases: &[PurchaseRow]) -> DashboardTotals {
    let count_status = |status| appointments.iter().filter(|a| a.status == status).count() as u64;

    DashboardTotals {
        patients: head.patients,
        doctors: head.doctors,
        pending_verifications: head.pending_verifications,
        appointments_scheduled: count_status(AppointmentStatus::Scheduled),
        appointments_completed: count_status(AppointmentStatus::Completed),
        appointments_cancelled: count_status(AppointmentStatus::Cancelled),
        credits_purchased: purchases.iter().map(|p| i64::from(p.amount)).sum(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 3, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn window_covers_whole_days_ending_today() {
        let (from, to) = window(7, at(10, 15));
        assert_eq!(from, at(4, 0));
        assert_eq!(to, at(11, 0));
    }

    #[test]
    fn buckets_include_empty_days_and_drop_strays() {
        let users = vec![
            UserStatRow { role: UserRole::Patient, created_at: at(4, 9) },
            UserStatRow { role: UserRole::Doctor, created_at: at(4, 23) },
            UserStatRow { role: UserRole::Patient, created_at: at(1, 9) },
        ];
        let appointments = vec![AppointmentStatRow {
            status: AppointmentStatus::Scheduled,
            created_at: at(6, 12),
        }];
        let purchases = vec![
            PurchaseRow { amount: 10, created_at: at(6, 0) },
            PurchaseRow { amount: 2, created_at: at(6, 18) },
        ];

        let series = bucket_by_day(at(4, 0).date_naive(), 3, &users, &appointments, &purchases);

        assert_eq!(series.len(), 3);
        assert_eq!(series[0].new_users, 2);
        assert_eq!(series[1], DayBucket {
            date: at(5, 0).date_naive(),
            new_users: 0,
            appointments: 0,
            credits_purchased: 0,
        });
        assert_eq!(series[2].appointments, 1);
        assert_eq!(series[2].credits_purchased, 12);
    }

    #[test]
    fn totals_take_head_counts_and_split_statuses() {
        let head = HeadCounts {
            patients: 1500,
            doctors: 40,
            pending_verifications: 3,
        };
        let appointments = vec![
            AppointmentStatRow { status: AppointmentStatus::Completed, created_at: at(2, 0) },
            AppointmentStatRow { status: AppointmentStatus::Cancelled, created_at: at(2, 0) },
            AppointmentStatRow { status: AppointmentStatus::Completed, created_at: at(3, 0) },
        ];

        let totals = totals(head, &appointments, &[]);
        assert_eq!(totals.patients, 1500);
        assert_eq!(totals.doctors, 40);
        assert_eq!(totals.pending_verifications, 3);
        assert_eq!(totals.appointments_completed, 2);
        assert_eq!(totals.appointments_cancelled, 1);
        assert_eq!(totals.appointments_scheduled, 0);
        assert_eq!(totals.credits_purchased, 0);
    }
}
