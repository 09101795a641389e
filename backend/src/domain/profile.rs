//! Profile aggregate returned by the profile endpoints.

use chrono::{DateTime, Utc};

use crate::domain::{DisplayName, EmailAddress, User, UserRole};

/// Identity block of the profile view.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileData {
    pub id: crate::domain::UserId,
    pub name: Option<DisplayName>,
    pub email: EmailAddress,
    pub role: UserRole,
    pub avatar: Option<String>,
    pub member_since: DateTime<Utc>,
    pub last_login: DateTime<Utc>,
}

/// Aggregate counters shown on the profile page.
///
/// `total_saved` and `price_alerts` remain zero placeholders until those
/// features exist.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ProfileStatistics {
    pub wishlist_items: u64,
    pub total_saved: f64,
    pub games_tracked: u64,
    pub price_alerts: u64,
    pub reviews_written: u64,
}

/// Gaming preferences block.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProfilePreferences {
    pub favourite_genre: Option<String>,
    pub preferred_store: Option<String>,
}

/// Complete profile view.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileView {
    pub profile: ProfileData,
    pub statistics: ProfileStatistics,
    pub preferences: ProfilePreferences,
    /// Activity feed; empty until activity tracking lands.
    pub activities: Vec<ActivityEntry>,
}

/// A single profile activity item.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityEntry {
    pub description: String,
    pub occurred_at: DateTime<Utc>,
}

impl ProfileView {
    /// Assemble the view from a user row and live counters.
    pub fn assemble(user: &User, wishlist_items: u64, reviews_written: u64) -> Self {
        let games_tracked = wishlist_items;

        Self {
            profile: ProfileData {
                id: user.id,
                name: user.display_name.clone(),
                email: user.email.clone(),
                role: user.role,
                avatar: user.avatar_url.clone(),
                member_since: user.created_at,
                last_login: user.last_login_at.unwrap_or(user.created_at),
            },
            statistics: ProfileStatistics {
                wishlist_items,
                total_saved: 0.0,
                games_tracked,
                price_alerts: 0,
                reviews_written,
            },
            preferences: ProfilePreferences {
                favourite_genre: user.favourite_genre.clone(),
                preferred_store: user.preferred_store.clone(),
            },
            activities: Vec::new(),
        }
    }
}

/// Partial profile update; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<DisplayName>,
    pub email: Option<EmailAddress>,
    /// Plain-text replacement password, hashed before storage.
    pub password: Option<String>,
    pub avatar: Option<String>,
}

/// Partial preferences update; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct PreferencesUpdate {
    pub favourite_genre: Option<String>,
    pub preferred_store: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{UserId, UserStatus};

    fn user_with_login(last_login: Option<DateTime<Utc>>) -> User {
        User::builder(
            UserId::random(),
            EmailAddress::new("ada@example.com").expect("email"),
        )
        .status(UserStatus::Active)
        .purchase_count(2)
        .last_login_at_opt(last_login)
        .build()
    }

    trait BuilderExt {
        fn last_login_at_opt(self, ts: Option<DateTime<Utc>>) -> Self;
    }

    impl BuilderExt for crate::domain::UserBuilder {
        fn last_login_at_opt(self, ts: Option<DateTime<Utc>>) -> Self {
            match ts {
                Some(ts) => self.last_login_at(ts),
                None => self,
            }
        }
    }

    #[test]
    fn last_login_falls_back_to_member_since() {
        let user = user_with_login(None);
        let view = ProfileView::assemble(&user, 3, 1);
        assert_eq!(view.profile.last_login, view.profile.member_since);
        assert_eq!(view.statistics.wishlist_items, 3);
        assert!(view.activities.is_empty());
    }

    #[test]
    fn statistics_reflect_live_counters() {
        let now = Utc::now();
        let user = user_with_login(Some(now));
        let view = ProfileView::assemble(&user, 5, 7);
        assert_eq!(view.profile.last_login, now);
        assert_eq!(view.statistics.reviews_written, 7);
        assert_eq!(view.statistics.games_tracked, 5);
        assert!((view.statistics.total_saved - 0.0).abs() < f64::EPSILON);
    }
}
