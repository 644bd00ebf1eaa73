//! Storefront-wide counters for the administration dashboard.

use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::Money;

/// Accounts created within this many days count as active.
pub const ACTIVE_WINDOW_DAYS: i64 = 30;

/// Time bounds the signup counters are measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsWindow {
    /// Start of the rolling activity window.
    pub active_since: DateTime<Utc>,
    /// Midnight UTC of the current day.
    pub today_start: DateTime<Utc>,
}

impl StatsWindow {
    /// Window ending at `now`.
    ///
    /// # Examples
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use storefront::domain::StatsWindow;
    ///
    /// let now = Utc.with_ymd_and_hms(2024, 6, 15, 13, 45, 0).unwrap();
    /// let window = StatsWindow::ending_at(now);
    /// assert_eq!(window.today_start, Utc.with_ymd_and_hms(2024, 6, 15, 0, 0, 0).unwrap());
    /// ```
    pub fn ending_at(now: DateTime<Utc>) -> Self {
        let midnight = now.date_naive().and_time(NaiveTime::MIN);
        Self {
            active_since: now - Duration::days(ACTIVE_WINDOW_DAYS),
            today_start: Utc.from_utc_datetime(&midnight),
        }
    }
}

/// Account counts reported by the user repository.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignupCounts {
    /// Every registered account.
    pub total: i64,
    /// Accounts created on or after [`StatsWindow::active_since`].
    pub recent: i64,
    /// Accounts created on or after [`StatsWindow::today_start`].
    pub today: i64,
}

/// Catalogue and order totals reported by the balance ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SalesSummary {
    /// Catalogue size.
    pub products: i64,
    /// Orders in any status.
    pub orders: i64,
    /// Sum of completed order totals.
    pub revenue: Money,
}

impl Default for SalesSummary {
    fn default() -> Self {
        Self {
            products: 0,
            orders: 0,
            revenue: Money::zero(),
        }
    }
}

/// Dashboard counters returned by `GET /api/admin/stats`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    /// Registered accounts.
    pub total_users: i64,
    /// Number of catalogue products.
    pub total_games: i64,
    /// Orders in any status.
    pub total_orders: i64,
    /// Revenue from completed orders.
    #[schema(value_type = f64, example = 1250.5)]
    pub total_revenue: Money,
    /// Accounts created in the last 30 days.
    pub active_users: i64,
    /// Accounts created since midnight UTC.
    pub new_users_today: i64,
}

impl AdminStats {
    /// Merge the two storage reports.
    pub fn from_parts(signups: SignupCounts, sales: SalesSummary) -> Self {
        Self {
            total_users: signups.total,
            total_games: sales.products,
            total_orders: sales.orders,
            total_revenue: sales.revenue,
            active_users: signups.recent,
            new_users_today: signups.today,
        }
    }
}
