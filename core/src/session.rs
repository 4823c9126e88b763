//! The logged-in user, persisted as a pointer to their email.

use anyhow::{Result, bail};
use tracing::{info, warn};

use crate::error::TrackerError;
use crate::models::{NewUser, User};
use crate::service::TrackerService;

/// Who is using the tracker right now.
///
/// Passwords are never collected; logging in only needs a registered email.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    user: Option<User>,
}

impl Session {
    /// Load the user the stored pointer refers to.
    ///
    /// Never fails: unreadable storage is logged and treated as logged out.
    pub fn restore(service: &TrackerService) -> Self {
        let user = match Self::load_current(service) {
            Ok(user) => user,
            Err(e) => {
                warn!(error = %format!("{e:#}"), "failed to restore session, continuing logged out");
                None
            }
        };
        Session { user }
    }

    fn load_current(service: &TrackerService) -> Result<Option<User>> {
        let Some(email) = service.current_user_email()? else {
            return Ok(None);
        };
        let user = service.find_user(&email)?;
        if user.is_none() {
            warn!(email = %email, "current user pointer names an unknown user");
        }
        Ok(user)
    }

    #[must_use]
    pub fn current_user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn require_user(&self) -> Result<&User> {
        self.user
            .as_ref()
            .ok_or_else(|| TrackerError::NotLoggedIn.into())
    }

    pub fn signup(&mut self, service: &TrackerService, new_user: NewUser) -> Result<&User> {
        let user = service.register_user(new_user)?;
        service.set_current_user_email(&user.email)?;
        info!(email = %user.email, goal = user.daily_calorie_goal, "signed up");
        Ok(self.user.insert(user))
    }

    pub fn login(&mut self, service: &TrackerService, email: &str) -> Result<&User> {
        let email = email.trim();
        let Some(user) = service.find_user(email)? else {
            return Err(TrackerError::UserNotFound(email.to_string()).into());
        };
        service.set_current_user_email(email)?;
        info!(email = %email, "logged in");
        Ok(self.user.insert(user))
    }

    pub fn logout(&mut self, service: &TrackerService) -> Result<()> {
        if let Some(user) = self.user.take() {
            info!(email = %user.email, "logged out");
        }
        service.clear_current_user()?;
        Ok(())
    }

    /// Save edits to the logged-in user's profile. The email cannot change.
    pub fn update_profile(&mut self, service: &TrackerService, user: &User) -> Result<&User> {
        let current = self.require_user()?;
        if current.email != user.email {
            bail!("Email cannot be changed");
        }
        let saved = service.save_profile(user)?;
        info!(email = %saved.email, goal = saved.daily_calorie_goal, "profile updated");
        Ok(self.user.insert(saved))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::tracker_error;
    use crate::models::{ActivityLevel, Gender};

    fn sample_new_user(email: &str) -> NewUser {
        NewUser {
            name: "Sam".to_string(),
            email: email.to_string(),
            age: 25,
            weight: 70.0,
            height: 175.0,
            gender: Gender::Male,
            activity_level: ActivityLevel::Light,
        }
    }

    #[test]
    fn test_restore_empty_store() {
        let svc = TrackerService::new_in_memory().unwrap();
        let session = Session::restore(&svc);
        assert!(session.current_user().is_none());
        let err = session.require_user().unwrap_err();
        assert_eq!(tracker_error(&err), Some(&TrackerError::NotLoggedIn));
    }

    #[test]
    fn test_signup_logs_in() {
        let svc = TrackerService::new_in_memory().unwrap();
        let mut session = Session::default();
        let user = session
            .signup(&svc, sample_new_user("sam@example.com"))
            .unwrap();
        assert_eq!(user.daily_calorie_goal, 2371);
        assert_eq!(
            svc.current_user_email().unwrap().as_deref(),
            Some("sam@example.com")
        );

        let restored = Session::restore(&svc);
        assert_eq!(restored, session);
    }

    #[test]
    fn test_signup_duplicate_email() {
        let svc = TrackerService::new_in_memory().unwrap();
        let mut session = Session::default();
        session
            .signup(&svc, sample_new_user("sam@example.com"))
            .unwrap();

        let mut other = Session::default();
        let err = other
            .signup(&svc, sample_new_user("sam@example.com"))
            .unwrap_err();
        assert_eq!(err.to_string(), "User already exists");
        assert!(other.current_user().is_none());
    }

    #[test]
    fn test_login_unknown_user() {
        let svc = TrackerService::new_in_memory().unwrap();
        let mut session = Session::default();
        let err = session.login(&svc, "nobody@example.com").unwrap_err();
        assert_eq!(err.to_string(), "User not found");
        assert!(session.current_user().is_none());
        assert!(svc.current_user_email().unwrap().is_none());
    }

    #[test]
    fn test_login_and_logout() {
        let svc = TrackerService::new_in_memory().unwrap();
        svc.register_user(sample_new_user("sam@example.com"))
            .unwrap();

        let mut session = Session::default();
        session.login(&svc, "sam@example.com").unwrap();
        assert_eq!(session.require_user().unwrap().email, "sam@example.com");

        session.logout(&svc).unwrap();
        assert!(session.current_user().is_none());
        assert!(svc.current_user_email().unwrap().is_none());
        assert!(Session::restore(&svc).current_user().is_none());

        // Logging out twice is harmless.
        session.logout(&svc).unwrap();
    }

    #[test]
    fn test_update_profile() {
        let svc = TrackerService::new_in_memory().unwrap();
        let mut session = Session::default();
        let mut edited = session
            .signup(&svc, sample_new_user("sam@example.com"))
            .unwrap()
            .clone();
        edited.weight = 80.0;
        edited.activity_level = ActivityLevel::Moderate;

        let saved = session.update_profile(&svc, &edited).unwrap().clone();
        // 88.362 + 1071.76 + 839.825 - 141.925 = 1858.022; x 1.55
        assert_eq!(saved.daily_calorie_goal, 2880);
        assert_eq!(session.current_user(), Some(&saved));
        assert_eq!(svc.find_user("sam@example.com").unwrap(), Some(saved));
    }

    #[test]
    fn test_update_profile_requires_same_email() {
        let svc = TrackerService::new_in_memory().unwrap();
        let mut session = Session::default();
        let mut edited = session
            .signup(&svc, sample_new_user("sam@example.com"))
            .unwrap()
            .clone();
        edited.email = "new@example.com".to_string();
        assert!(session.update_profile(&svc, &edited).is_err());

        let mut logged_out = Session::default();
        let err = logged_out.update_profile(&svc, &edited).unwrap_err();
        assert_eq!(tracker_error(&err), Some(&TrackerError::NotLoggedIn));
    }

    #[test]
    fn test_restore_dangling_pointer() {
        let svc = TrackerService::new_in_memory().unwrap();
        svc.set_current_user_email("ghost@example.com").unwrap();
        assert!(Session::restore(&svc).current_user().is_none());
    }

    #[test]
    fn test_restore_corrupt_users_blob() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("caltrack.db");

        {
            let db = crate::db::Database::open(&path).unwrap();
            db.set_item(crate::db::USERS_KEY, "{not json").unwrap();
            db.set_current_user_email("sam@example.com").unwrap();
        }

        let svc = TrackerService::new(path.to_str().unwrap()).unwrap();
        assert!(svc.find_user("sam@example.com").is_err());
        let session = Session::restore(&svc);
        assert!(session.current_user().is_none());
        let err = session.require_user().unwrap_err();
        assert_eq!(tracker_error(&err), Some(&TrackerError::NotLoggedIn));
    }

    #[test]
    fn test_session_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("caltrack.db");
        let path = path.to_str().unwrap();

        {
            let svc = TrackerService::new(path).unwrap();
            let mut session = Session::restore(&svc);
            session
                .signup(&svc, sample_new_user("sam@example.com"))
                .unwrap();
        }

        let svc = TrackerService::new(path).unwrap();
        let session = Session::restore(&svc);
        assert_eq!(session.require_user().unwrap().email, "sam@example.com");
    }
}
